//! # Generic Containers
//!
//! Small generic collections used by the query toolchain and offered to
//! callers:
//!
//! - **[Stack]** - LIFO over a vector
//! - **[Queue]** - FIFO over linked nodes
//! - **[Set]** - hash set with union, intersection, and difference
//! - **[Tree]** - parent-linked tree stored in an arena, used for the AST
//!
//! `Stack`, `Queue`, and `Set` lock internally (one `parking_lot` lock per
//! instance) and can be shared between threads behind an `Arc`. `Tree` is not
//! synchronized; it is built by a single writer during parsing and only read
//! afterwards.
//!
//! ## Errors
//!
//! Reading from an empty container returns [`ContainerError::Empty`] instead
//! of a sentinel value:
//!
//! ```
//! use storeql::containers::{ContainerError, Stack};
//!
//! let stack: Stack<i32> = Stack::new();
//! assert!(matches!(stack.pop(), Err(ContainerError::Empty { .. })));
//! ```
pub mod queue;
pub mod set;
pub mod stack;
pub mod tree;

pub use queue::Queue;
pub use set::Set;
pub use stack::Stack;
pub use tree::{NodeId, Tree};

use thiserror::Error;

/// Errors raised by the generic containers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// Pop, dequeue, or peek on an empty container
    #[error("{container} is empty")]
    Empty { container: &'static str },

    /// Tree handle that does not belong to the tree
    #[error("unknown tree node {0}")]
    UnknownNode(NodeId),
}
