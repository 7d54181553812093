//! # StoreQL - Abstract Syntax Tree
//!
//! This module defines the tokens and tree nodes shared by the lexer, parser,
//! and interpreter of StoreQL, a small query language over store records
//! (products, orders, stores, customers).
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[node]** - AST node kinds and the node payload stored in the tree
//!
//! The tree itself is a [`Tree<AstNode>`](crate::containers::Tree): nodes live
//! in an arena and refer to their parent and children by handle.
//!
//! ## Quick Start
//!
//! ```text
//! FIND products WHERE price < 100 ORDER BY price DESC
//! ```
//!
//! parses to
//!
//! ```text
//! QUERY ROOT
//!   FIND
//!     FIELD products
//!     WHERE
//!     ORDER_BY [direction="DESC"]
//!       FIELD price
//! ```
//!
//! ## Statements
//!
//! Every query is exactly one statement:
//!
//! - **SELECT** `SELECT <field|*> FROM <entity> [WHERE ...] [ORDER BY ...] [LIMIT n]`
//! - **FIND** `FIND <entity> [WHERE ...] [ORDER BY ...]`
//! - **UPDATE** `UPDATE <entity> SET <field>=<value>[, ...] [WHERE ...] [CONCURRENT [n]]`
//! - **ANALYZE** `ANALYZE <entity> [WHERE ...] [GROUP BY <field>]`
//!
//! ### Child Order
//!
//! Children are attached in the order they appear in the query text: the
//! field list before the source, the source before `WHERE`, `WHERE` before
//! `ORDER BY`, `ORDER BY` before `LIMIT`.
//!
//! ### Where Clauses
//!
//! The `WHERE` node is a placeholder. Its condition text is skipped and the
//! node has no children; nothing downstream reads it.
pub mod node;
pub mod tokens;

pub use node::{Ast, AstNode, NodeKind};
pub use tokens::{Token, TokenKind};
