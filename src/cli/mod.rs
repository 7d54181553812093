//! CLI support for storeql
//!
//! The command implementations return strings or results instead of printing,
//! so they can be embedded in other tools and tested without a process.

mod check;
mod docs;
mod inspect;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use inspect::{render_grammar, render_parse, render_tokens};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Lexing, parsing, or execution failed
    #[error(transparent)]
    Query(#[from] crate::Error),

    /// The data set could not be loaded
    #[error("invalid data set: {0}")]
    Store(#[from] crate::StoreError),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No data set provided. Use --input, --data, or pipe JSON to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'storeql docs' to see available categories.")]
    UnknownCategory(String),
}
