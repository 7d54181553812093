use std::fmt;

use super::ContainerError;

/// Handle to a node inside a [`Tree`].
///
/// Handles are plain indexes into the tree's arena. They stay valid for the
/// lifetime of the tree because nodes are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct TreeNode<T> {
    value: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// General tree with parent links.
///
/// Nodes live in a single arena and refer to each other by [`NodeId`], so a
/// parent lookup is O(1) without reference cycles. Every node except the root
/// has exactly one parent, and that parent lists it among its children.
///
/// Not synchronized: one writer builds the tree, then it is only read.
///
/// # Examples
///
/// ```
/// use storeql::containers::Tree;
///
/// let mut tree = Tree::new("root");
/// let root = tree.root();
/// let child = tree.insert(root, "child").unwrap();
/// tree.insert(child, "grandchild").unwrap();
///
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.height(), 2);
/// assert_eq!(tree.parent(child), Some(root));
/// ```
#[derive(Debug, Clone)]
pub struct Tree<T> {
    nodes: Vec<TreeNode<T>>,
}

impl<T> Tree<T> {
    /// Create a tree holding only a root node.
    pub fn new(root: T) -> Self {
        Tree {
            nodes: vec![TreeNode {
                value: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Add `value` as the last child of `parent`.
    pub fn insert(&mut self, parent: NodeId, value: T) -> Result<NodeId, ContainerError> {
        if parent.0 >= self.nodes.len() {
            return Err(ContainerError::UnknownNode(parent));
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            value,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id.0).map(|node| &node.value)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    /// Children of `id` in insertion order. Unknown handles have none.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&child| (child, &self.nodes[child.0].value))
    }

    /// Pre-order depth-first traversal from the root.
    pub fn traverse<F>(&self, mut visitor: F)
    where
        F: FnMut(NodeId, &T),
    {
        self.traverse_with_depth(|id, value, _| visitor(id, value));
    }

    /// Pre-order traversal that also reports each node's depth (root is 0).
    pub fn traverse_with_depth<F>(&self, mut visitor: F)
    where
        F: FnMut(NodeId, &T, usize),
    {
        // Explicit stack keeps deep trees off the call stack.
        let mut pending = vec![(self.root(), 0)];
        while let Some((id, depth)) = pending.pop() {
            let node = &self.nodes[id.0];
            visitor(id, &node.value, depth);
            for &child in node.children.iter().rev() {
                pending.push((child, depth + 1));
            }
        }
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut height = 0;
        self.traverse_with_depth(|_, _, depth| height = height.max(depth));
        height
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root.
    pub fn is_empty(&self) -> bool {
        false
    }
}
