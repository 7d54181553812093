use std::collections::BTreeMap;
use std::fmt;

use crate::containers::{NodeId, Tree};
use crate::value::Value;

/// Kind of an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Synthetic root (`ROOT`); holds exactly one statement
    Query,
    /// `SELECT` statement
    Select,
    /// `FIND` statement
    Find,
    /// `UPDATE` statement
    Update,
    /// `ANALYZE` statement
    Analyze,
    /// `WHERE` clause (condition is not parsed, the node stays empty)
    Where,
    /// Single comparison inside a condition
    Condition,
    /// Field, entity, or source name
    Field,
    /// Literal value; the parsed literal is in the `value` metadata entry
    Value,
    /// Comparison operator
    Operator,
    /// `ORDER BY` clause; one `Field` child, `direction` metadata
    OrderBy,
    /// `LIMIT` clause; `count` metadata
    Limit,
    /// `GROUP BY` clause; one `Field` child
    GroupBy,
    /// `field = value` inside `SET`
    Assignment,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Query => "QUERY",
            NodeKind::Select => "SELECT",
            NodeKind::Find => "FIND",
            NodeKind::Update => "UPDATE",
            NodeKind::Analyze => "ANALYZE",
            NodeKind::Where => "WHERE",
            NodeKind::Condition => "CONDITION",
            NodeKind::Field => "FIELD",
            NodeKind::Value => "VALUE",
            NodeKind::Operator => "OPERATOR",
            NodeKind::OrderBy => "ORDER_BY",
            NodeKind::Limit => "LIMIT",
            NodeKind::GroupBy => "GROUP_BY",
            NodeKind::Assignment => "ASSIGNMENT",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of the parsed query.
///
/// The owning [`Tree`] keeps the parent/child links; a node only carries its
/// own kind, text, and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub kind: NodeKind,
    pub text: String,
    pub metadata: BTreeMap<String, Value>,
}

impl AstNode {
    pub fn new(kind: NodeKind, text: impl Into<String>) -> Self {
        AstNode {
            kind,
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

/// Parsed query: a tree of [`AstNode`]s rooted at a `Query` node.
pub type Ast = Tree<AstNode>;

impl Tree<AstNode> {
    /// The statement node under the root, if any.
    pub fn statement(&self) -> Option<(NodeId, &AstNode)> {
        self.children(self.root()).next()
    }

    /// Children of `id` with the given kind, in source order.
    pub fn children_of_kind(
        &self,
        id: NodeId,
        kind: NodeKind,
    ) -> impl Iterator<Item = (NodeId, &AstNode)> + '_ {
        self.children(id).filter(move |(_, node)| node.kind == kind)
    }

    /// Indented one-node-per-line rendering, used by `storeql parse`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.traverse_with_depth(|_, node, depth| {
            out.push_str(&"  ".repeat(depth));
            out.push_str(node.kind.name());
            if node.text != node.kind.name() {
                out.push_str(&format!(" {}", node.text));
            }
            for (key, value) in &node.metadata {
                out.push_str(&format!(" [{}={}]", key, value));
            }
            out.push('\n');
        });
        out
    }
}
