//! CLI support for verdict
//!
//! Provides programmatic access to the `verdict` command so other tools can
//! embed it.

mod check;
mod convert;
mod dump;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::{parse_json_input, render_json};
pub use dump::{DumpOutput, execute_dump};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("no input provided. Use --input or pipe JSON to stdin.")]
    NoInput,
}
