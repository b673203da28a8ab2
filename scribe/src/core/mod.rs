//! Deterministic, pure logic shared by the publishing pipeline.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod curriculum;
pub mod navigator;
pub mod post;
pub mod progress;
pub mod prompt;
pub mod response;
pub mod validator;
