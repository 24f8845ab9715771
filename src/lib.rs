//! oait: bulk tools for the OpenAI assistants, files and threads APIs
//!
//! Fetches many items concurrently, narrows them with capability filters and
//! deletes what survives.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod openai;
pub mod prompt;
pub mod resource;
pub mod workflow;

pub use error::{OaitError, Result};

/// Version injected at compile time via OAIT_VERSION (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("OAIT_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
