//! Read-only views of a query: tokens, AST, and the grammar

use crate::grammar::grammar;
use crate::output::{grammar_json, to_json_pretty, token_table};
use super::CliError;

/// Tokens as a table, or as a JSON array with `--json`.
///
/// Never fails on lexical problems: the Error token is part of the output.
pub fn render_tokens(query: &str, json: bool) -> Result<String, CliError> {
    let tokens = crate::tokenize(query);
    if json {
        Ok(to_json_pretty(&tokens)?)
    } else {
        Ok(token_table(&tokens))
    }
}

/// Indented AST of a query that lexes and parses.
pub fn render_parse(query: &str) -> Result<String, CliError> {
    let ast = crate::parse(query)?;
    Ok(ast.render())
}

/// The grammar as BNF, or as JSON with `--json`.
pub fn render_grammar(json: bool) -> Result<String, CliError> {
    let grammar = grammar();
    if json {
        Ok(to_json_pretty(&grammar_json(grammar))?)
    } else {
        Ok(grammar.to_bnf())
    }
}
