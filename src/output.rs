//! Output rendering for query results, tokens, and the grammar.
//!
//! JSON goes through `serde_json`, so anything that implements `Serialize`
//! ([`QueryResult`](crate::QueryResult), [`Token`], [`Grammar`](crate::Grammar))
//! can be printed compactly or with 2-space indentation. Tokens also have a
//! plain-text table for terminals.
//!
//! # Examples
//!
//! ```
//! use storeql::output::{to_json, token_table};
//!
//! let tokens = storeql::tokenize("FIND orders");
//! assert_eq!(
//!     to_json(&tokens[0]).unwrap(),
//!     r#"{"type":"KEYWORD","value":"FIND","line":1,"column":1}"#
//! );
//! assert!(token_table(&tokens).contains("IDENTIFIER"));
//! ```

use serde::Serialize;
use serde_json::json;

use crate::ast::Token;
use crate::grammar::Grammar;

/// Compact JSON, no whitespace.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

/// Pretty JSON with 2-space indentation.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Grammar as `{"start_symbol", "rules", "rule_count"}`.
pub fn grammar_json(grammar: &Grammar) -> serde_json::Value {
    json!({
        "start_symbol": grammar.start_symbol(),
        "rules": grammar.rules(),
        "rule_count": grammar.rules().len(),
    })
}

/// One token per line: position, kind, and text.
///
/// ```text
/// 1:1    KEYWORD     FIND
/// 1:6    IDENTIFIER  orders
/// 1:12   EOF
/// ```
pub fn token_table(tokens: &[Token]) -> String {
    let kind_width = tokens
        .iter()
        .map(|t| t.kind.name().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for token in tokens {
        let position = format!("{}:{}", token.line, token.column);
        let line = format!(
            "{:<6} {:<width$}  {}",
            position,
            token.kind.name(),
            token.text,
            width = kind_width
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
