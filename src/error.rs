use thiserror::Error;

use crate::{interpreter::ExecutionError, lexer::LexError, parser::ParseError};

/// Failure of one of the query pipeline stages.
///
/// The variants keep the stage error intact so callers can match on the
/// exact cause; `Display` prefixes it with the failing stage.
#[derive(Debug, Error)]
pub enum Error {
    #[error("lexical analysis failed: {0}")]
    Lex(#[from] LexError),

    #[error("parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("execution failed: {0}")]
    Execution(#[from] ExecutionError),
}

pub type Result<T> = std::result::Result<T, Error>;
