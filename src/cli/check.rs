//! Execute storeql queries against a JSON data set

use tracing::debug;

use crate::{InterpreterConfig, MemoryStore, QueryResult};
use super::CliError;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The StoreQL query to execute
    pub query: String,
    /// JSON data set: `{"products": [...], "orders": [...], ...}`
    pub input: Option<String>,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
    pub config: InterpreterConfig,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Query executed successfully
    Success(QueryResult),
}

/// Execute a storeql check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    if options.syntax_only {
        crate::validate(&options.query)?;
        return Ok(CheckResult::SyntaxValid);
    }

    let data = options.input.as_deref().ok_or(CliError::NoInput)?;
    let store = MemoryStore::from_json(data)?;
    debug!(fetch_limit = options.config.fetch_limit, "loaded data set");

    let result = crate::execute_with_config(&options.query, &store, options.config)?;
    Ok(CheckResult::Success(result))
}
