//! Generation agent abstraction.
//!
//! The [`GenerationAgent`] trait decouples the pipeline from the transport
//! used to reach the text-generation agent. [`CommandAgent`] runs a local
//! command; tests use scripted agents that return canned text.

use std::process::Command;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::core::response::extract_article;
use crate::io::config::{AgentConfig, PromptMode};
use crate::io::process::run_with_timeout;

/// Abstraction over generation backends.
pub trait GenerationAgent {
    /// Send one prompt as an isolated request and return the article text.
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Failed agent invocation, carrying what the agent wrote to stderr.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent timed out after {}s", .timeout.as_secs())]
    TimedOut { timeout: Duration, stderr: String },
    #[error("agent exited with status {}: {}", exit_label(.code), .stderr.trim())]
    Exited { code: Option<i32>, stderr: String },
    /// Stdout exceeded the capture limit; a partial response is never used.
    #[error("agent output exceeded {limit} bytes ({dropped} bytes dropped)")]
    OutputTruncated { limit: usize, dropped: usize },
}

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

/// Agent reached by spawning a local command per request.
#[derive(Debug, Clone)]
pub struct CommandAgent {
    program: String,
    args: Vec<String>,
    prompt_mode: PromptMode,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl CommandAgent {
    /// Build from validated config (`command` must be non-empty).
    pub fn from_config(config: &AgentConfig) -> Self {
        let (program, args) = match config.command.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };
        Self {
            program,
            args,
            prompt_mode: config.prompt_mode,
            timeout: config.timeout(),
            output_limit_bytes: config.output_limit_bytes,
        }
    }

    fn command(&self, prompt: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if self.prompt_mode == PromptMode::Argument {
            cmd.arg(prompt);
        }
        cmd
    }
}

impl GenerationAgent for CommandAgent {
    #[instrument(skip_all, fields(program = %self.program, prompt_bytes = prompt.len()))]
    fn generate(&self, prompt: &str) -> Result<String> {
        let stdin = match self.prompt_mode {
            PromptMode::Stdin => Some(prompt.as_bytes()),
            PromptMode::Argument => None,
        };
        let output = run_with_timeout(
            self.command(prompt),
            stdin,
            self.timeout,
            self.output_limit_bytes,
        )
        .with_context(|| format!("run agent {}", self.program))?;

        if output.timed_out {
            return Err(AgentError::TimedOut {
                timeout: self.timeout,
                stderr: output.stderr_text(),
            }
            .into());
        }
        if !output.status.success() {
            return Err(AgentError::Exited {
                code: output.status.code(),
                stderr: output.stderr_text(),
            }
            .into());
        }

        if output.stdout_truncated > 0 {
            return Err(AgentError::OutputTruncated {
                limit: self.output_limit_bytes,
                dropped: output.stdout_truncated,
            }
            .into());
        }

        let stdout = output.stdout_text();
        let article = extract_article(&stdout);
        debug!(
            stdout_bytes = stdout.len(),
            article_bytes = article.len(),
            "agent response parsed"
        );
        Ok(article)
    }
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: config.retry_backoff(),
        }
    }

    /// Delay before attempt `attempt + 1` (attempts are 1-indexed).
    fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.backoff.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

/// Call `agent` until it succeeds or `policy.max_attempts` is used up.
///
/// Returns the last error when every attempt fails.
pub fn generate_with_retry<A: GenerationAgent + ?Sized>(
    agent: &A,
    prompt: &str,
    policy: RetryPolicy,
    pass: &str,
) -> Result<String> {
    let mut attempt = 1;
    loop {
        match agent.generate(prompt) {
            Ok(text) => {
                info!(pass, attempt, words = text.split_whitespace().count(), "generation finished");
                return Ok(text);
            }
            Err(err) if attempt < policy.max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(pass, attempt, max_attempts = policy.max_attempts, delay_secs = delay.as_secs(), error = %format!("{err:#}"), "generation failed, retrying");
                thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => {
                return Err(err.context(format!("{pass} pass failed after {attempt} attempt(s)")));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FlakyAgent {
        failures_left: RefCell<u32>,
        calls: RefCell<u32>,
    }

    impl GenerationAgent for FlakyAgent {
        fn generate(&self, _prompt: &str) -> Result<String> {
            *self.calls.borrow_mut() += 1;
            let mut left = self.failures_left.borrow_mut();
            if *left > 0 {
                *left -= 1;
                return Err(AgentError::Exited {
                    code: Some(1),
                    stderr: "rate limited".to_string(),
                }
                .into());
            }
            Ok("article".to_string())
        }
    }

    fn flaky(failures: u32) -> FlakyAgent {
        FlakyAgent {
            failures_left: RefCell::new(failures),
            calls: RefCell::new(0),
        }
    }

    #[test]
    fn single_attempt_policy_does_not_retry() {
        let agent = flaky(1);
        let err = generate_with_retry(&agent, "p", RetryPolicy::default(), "draft").unwrap_err();
        assert_eq!(*agent.calls.borrow(), 1);
        assert!(err.to_string().contains("draft pass failed after 1 attempt(s)"));
        let agent_err = err.downcast_ref::<AgentError>().expect("agent error");
        assert!(matches!(agent_err, AgentError::Exited { code: Some(1), .. }));
    }

    #[test]
    fn retries_until_success_within_budget() {
        let agent = flaky(2);
        let policy = RetryPolicy {
            max_attempts: 3,
            backoff: Duration::ZERO,
        };
        let text = generate_with_retry(&agent, "p", policy, "critique").expect("generate");
        assert_eq!(text, "article");
        assert_eq!(*agent.calls.borrow(), 3);
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            backoff: Duration::from_secs(5),
        };
        assert_eq!(policy.delay_after(1), Duration::from_secs(5));
        assert_eq!(policy.delay_after(2), Duration::from_secs(10));
        assert_eq!(policy.delay_after(3), Duration::from_secs(20));
    }

    #[cfg(unix)]
    fn sh_agent(script: &str, prompt_mode: PromptMode) -> CommandAgent {
        CommandAgent::from_config(&AgentConfig {
            command: vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            prompt_mode,
            timeout_secs: 10,
            ..AgentConfig::default()
        })
    }

    #[cfg(unix)]
    #[test]
    fn command_agent_passes_prompt_as_argument() {
        // `sh -c script arg0`: the appended prompt becomes $0.
        let agent = sh_agent("printf '%s' \"$0\"", PromptMode::Argument);
        assert_eq!(agent.generate("Topic: Schedulers").expect("generate"), "Topic: Schedulers");
    }

    #[cfg(unix)]
    #[test]
    fn command_agent_unwraps_envelope_from_stdin_prompt() {
        let agent = sh_agent(
            "read -r line; printf '{\"response\":\"%s\"}' \"$line\"",
            PromptMode::Stdin,
        );
        assert_eq!(agent.generate("hello\n").expect("generate"), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn command_agent_failure_carries_stderr() {
        let agent = sh_agent("echo 'quota exceeded' >&2; exit 2", PromptMode::Argument);
        let err = agent.generate("p").unwrap_err();
        match err.downcast_ref::<AgentError>() {
            Some(AgentError::Exited { code, stderr }) => {
                assert_eq!(*code, Some(2));
                assert_eq!(stderr.trim(), "quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[cfg(unix)]
    #[test]
    fn oversized_output_is_an_error_not_a_partial_article() {
        let agent = CommandAgent::from_config(&AgentConfig {
            command: vec![
                "sh".to_string(),
                "-c".to_string(),
                "printf '%s' '{\"response\": \"# Memory Models\\n\\nA long generated body.\"}'"
                    .to_string(),
            ],
            timeout_secs: 10,
            output_limit_bytes: 24,
            ..AgentConfig::default()
        });

        let err = agent.generate("p").unwrap_err();
        match err.downcast_ref::<AgentError>() {
            Some(AgentError::OutputTruncated { limit, dropped }) => {
                assert_eq!(*limit, 24);
                assert!(*dropped > 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn stdin_agent_that_never_reads_times_out() {
        let agent = CommandAgent::from_config(&AgentConfig {
            command: vec!["sh".to_string(), "-c".to_string(), "exec sleep 20".to_string()],
            prompt_mode: PromptMode::Stdin,
            timeout_secs: 1,
            ..AgentConfig::default()
        });
        let prompt = "x".repeat(1 << 20);

        let err = agent.generate(&prompt).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AgentError>(),
            Some(AgentError::TimedOut { .. })
        ));
    }
}
