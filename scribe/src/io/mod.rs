//! I/O adapters for the publishing pipeline.

pub mod agent;
pub mod atomic;
pub mod config;
pub mod definitions;
pub mod git;
pub mod init;
pub mod lock;
pub mod process;
pub mod progress_store;
pub mod run_log;
