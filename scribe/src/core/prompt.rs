//! Prompt compositor for the draft and critique passes.
//!
//! Pure string composition over embedded templates; callers supply the
//! persona and system fragments already loaded from disk.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::core::navigator::Selection;
use crate::core::validator::Constraints;

const DRAFT_TEMPLATE: &str = include_str!("prompts/draft.md");
const CRITIQUE_TEMPLATE: &str = include_str!("prompts/critique.md");

/// Static prompt fragments (`soul.md`, `system_prompt.txt`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptFragments {
    pub persona: String,
    pub system: String,
}

/// Renders both passes from the same fragments and constraints.
pub struct PromptCompositor<'a> {
    env: Environment<'static>,
    fragments: &'a PromptFragments,
    constraints: &'a Constraints,
}

impl<'a> PromptCompositor<'a> {
    pub fn new(fragments: &'a PromptFragments, constraints: &'a Constraints) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("draft", DRAFT_TEMPLATE)
            .context("load draft template")?;
        env.add_template("critique", CRITIQUE_TEMPLATE)
            .context("load critique template")?;
        Ok(Self {
            env,
            fragments,
            constraints,
        })
    }

    pub fn draft(&self, selection: &Selection<'_>) -> Result<String> {
        let template = self.env.get_template("draft")?;
        let rendered = template
            .render(context! {
                persona => self.fragments.persona.trim(),
                system => self.fragments.system.trim(),
                phase => selection.phase,
                topic => selection.topic,
                min_words => self.constraints.min_words,
                sections => &self.constraints.required_sections,
            })
            .context("render draft prompt")?;
        Ok(rendered)
    }

    /// Embeds `draft` verbatim.
    pub fn critique(&self, selection: &Selection<'_>, draft: &str) -> Result<String> {
        let template = self.env.get_template("critique")?;
        let rendered = template
            .render(context! {
                persona => self.fragments.persona.trim(),
                phase => selection.phase,
                topic => selection.topic,
                min_words => self.constraints.min_words,
                sections => &self.constraints.required_sections,
                draft => draft,
            })
            .context("render critique prompt")?;
        Ok(rendered)
    }
}
