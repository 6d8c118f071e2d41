use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::node::Node;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AstId(u32);

impl AstId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        AstId(raw)
    }

    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for AstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AstId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Identity of a node across every tree alive in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub ast: AstId,
    pub node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeData {
    pub(crate) node: Node,
    pub(crate) parent: Option<NodeId>,
}

/// One compilation unit worth of nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    pub(crate) id: AstId,
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: NodeId,
}

impl Ast {
    #[must_use]
    pub fn id(&self) -> AstId {
        self.id
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.idx()].node
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.idx()].parent
    }

    /// Strict ancestors of `id`, innermost first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Pre-order walk of the subtree rooted at `id` (including `id`).
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            let children = self.node(current).children();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// First node in pre-order that satisfies `pred`.
    pub fn find(&self, mut pred: impl FnMut(&Node) -> bool) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&id| pred(self.node(id)))
    }
}

impl std::ops::Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output {
        self.node(index)
    }
}

/// A node together with the tree that owns it.
///
/// Cloning is cheap; equality and hashing only look at the [`NodeKey`].
#[derive(Clone)]
pub struct SyntaxNode {
    ast: Arc<Ast>,
    id: NodeId,
}

impl SyntaxNode {
    #[must_use]
    pub fn new(ast: Arc<Ast>, id: NodeId) -> Self {
        SyntaxNode { ast, id }
    }

    #[must_use]
    pub fn root(ast: &Arc<Ast>) -> Self {
        SyntaxNode::new(Arc::clone(ast), ast.root())
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn ast(&self) -> &Arc<Ast> {
        &self.ast
    }

    #[must_use]
    pub fn key(&self) -> NodeKey {
        NodeKey {
            ast: self.ast.id(),
            node: self.id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &Node {
        self.ast.node(self.id)
    }

    #[must_use]
    pub fn parent(&self) -> Option<SyntaxNode> {
        self.ast.parent(self.id).map(|id| self.with_id(id))
    }

    /// Another node of the same tree.
    #[must_use]
    pub fn with_id(&self, id: NodeId) -> SyntaxNode {
        SyntaxNode::new(Arc::clone(&self.ast), id)
    }

    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.ast.ancestors(self.id).map(|id| self.with_id(id))
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SyntaxNode {}

impl Hash for SyntaxNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{:?}/{:?}",
            self.kind().kind_name(),
            self.ast.id(),
            self.id
        )
    }
}
