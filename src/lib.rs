//! # StoreQL
//!
//! A small query language over store records, with the pieces it is built
//! from offered as standalone utilities:
//!
//! - [`lexer`] / [`parser`] / [`interpreter`] - the query pipeline
//! - [`grammar`] - the BNF rule table, for introspection
//! - [`store`] - the read-only data-store contract and an in-memory store
//! - [`containers`] - stack, queue, set, and arena tree
//! - [`fsm`] - generic finite-state machine plus the order lifecycle
//! - [`concurrency`] - worker pool, bounded buffer, channel pipelines
//!
//! ## Quick Start
//!
//! ```
//! use storeql::store::MemoryStore;
//!
//! let store = MemoryStore::from_json(r#"{"products": [{"name": "mug"}, {"name": "lamp"}]}"#).unwrap();
//!
//! let result = storeql::execute("SELECT name FROM products", &store).unwrap();
//! assert_eq!(result.count, 2);
//! assert_eq!(result.message, "Selected 2 records FROM products");
//!
//! assert!(storeql::validate("FIND orders ORDER BY created_at DESC").is_ok());
//! assert!(storeql::validate("SELECT FROM").is_err());
//! ```
pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod concurrency;
pub mod containers;
pub mod error;
pub mod fsm;
pub mod grammar;
pub mod interpreter;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod store;
pub mod value;

pub use ast::{Ast, AstNode, NodeKind, Token, TokenKind};
pub use error::{Error, Result};
pub use grammar::{Grammar, GrammarRule, grammar};
pub use interpreter::{ExecutionError, Interpreter, InterpreterConfig, QueryKind, QueryResult};
pub use lexer::{LexError, Lexer, Position};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser};
pub use store::{DataStore, Entity, MemoryStore, Record, StoreError};
pub use value::Value;

use tracing::debug;

/// Tokenize, parse, and execute `query` against `store` with the default
/// [`InterpreterConfig`].
pub fn execute(query: &str, store: &dyn DataStore) -> Result<QueryResult> {
    execute_with_config(query, store, InterpreterConfig::default())
}

pub fn execute_with_config(
    query: &str,
    store: &dyn DataStore,
    config: InterpreterConfig,
) -> Result<QueryResult> {
    let ast = parse(query)?;
    let result = Interpreter::with_config(store, config).execute(&ast)?;
    Ok(result)
}

/// Check that `query` tokenizes and parses. Nothing is executed.
pub fn validate(query: &str) -> Result<()> {
    parse(query)?;
    debug!(query, "query is valid");
    Ok(())
}

/// Tokenize without failing. A lexical problem shows up as a trailing
/// [`TokenKind::Error`] token.
pub fn tokenize(query: &str) -> Vec<Token> {
    Lexer::new(query).tokenize()
}

/// Tokenize and parse, reporting a lexical problem as [`Error::Lex`].
pub fn parse(query: &str) -> Result<Ast> {
    let tokens = Lexer::new(query).tokenize_strict()?;
    Ok(Parser::new(tokens).parse()?)
}
