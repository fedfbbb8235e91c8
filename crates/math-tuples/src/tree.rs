//! The symbol tree: typed nodes connected by labeled structural edges.
//!
//! Nodes live in an arena owned by [`SymbolTree`] and are addressed by [`NodeId`]. Each node has
//! at most one child per [`Edge`].
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use static_assertions::assert_eq_size;
use strum::EnumCount;
use strum_macros::{EnumCount, IntoStaticStr};

/// The edge labels of a symbol tree.
///
/// The declaration order is the order in which the feature extractor visits children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, IntoStaticStr)]
#[repr(u8)]
pub enum Edge {
    /// Continuation of the current row.
    #[strum(serialize = "n")]
    Next,
    #[strum(serialize = "a")]
    Above,
    #[strum(serialize = "b")]
    Below,
    #[strum(serialize = "c")]
    PreAbove,
    #[strum(serialize = "o")]
    Over,
    #[strum(serialize = "u")]
    Under,
    #[strum(serialize = "d")]
    PreBelow,
    /// Contents of a fraction line, radical, enclosure or matrix.
    #[strum(serialize = "w")]
    Within,
    /// The next cell of a matrix, in row-major order.
    #[strum(serialize = "e")]
    Element,
    /// The bound variable of an operator tree (integration or summation variable).
    #[strum(serialize = "v")]
    Variable,
}

impl Edge {
    /// All edges in extraction order.
    pub const ALL: [Edge; Edge::COUNT] = [
        Edge::Next,
        Edge::Above,
        Edge::Below,
        Edge::PreAbove,
        Edge::Over,
        Edge::Under,
        Edge::PreBelow,
        Edge::Within,
        Edge::Element,
        Edge::Variable,
    ];

    /// The order in which the symbol-pair walk pushes children onto its stack.
    pub(crate) const PAIR_ORDER: [Edge; Edge::COUNT] = [
        Edge::Next,
        Edge::Above,
        Edge::Below,
        Edge::Over,
        Edge::Under,
        Edge::PreAbove,
        Edge::PreBelow,
        Edge::Within,
        Edge::Element,
        Edge::Variable,
    ];

    /// The order of the labeled children in the tree-string form, after `next`.
    const DISPLAY_ORDER: [Edge; Edge::COUNT - 1] = [
        Edge::Above,
        Edge::Below,
        Edge::Over,
        Edge::Under,
        Edge::PreAbove,
        Edge::PreBelow,
        Edge::Within,
        Edge::Element,
        Edge::Variable,
    ];

    #[inline]
    pub fn letter(self) -> char {
        match self {
            Edge::Next => 'n',
            Edge::Above => 'a',
            Edge::Below => 'b',
            Edge::PreAbove => 'c',
            Edge::Over => 'o',
            Edge::Under => 'u',
            Edge::PreBelow => 'd',
            Edge::Within => 'w',
            Edge::Element => 'e',
            Edge::Variable => 'v',
        }
    }

    pub fn from_letter(letter: char) -> Option<Edge> {
        Edge::ALL.into_iter().find(|edge| edge.letter() == letter)
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Index of a node in a [`SymbolTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(NonZeroU32);

assert_eq_size!(Option<NodeId>, u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(Debug, Clone)]
struct SymbolNode {
    tag: String,
    children: [Option<NodeId>; Edge::COUNT],
}

assert_eq_size!([Option<NodeId>; Edge::COUNT], [u32; 10]);

/// An arena of symbol nodes with an optional root.
///
/// Nodes that are created but never linked from the root stay in the arena; they are invisible
/// to every traversal.
#[derive(Debug, Clone, Default)]
pub struct SymbolTree {
    nodes: Vec<SymbolNode>,
    root: Option<NodeId>,
}

impl SymbolTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached node and returns its id.
    pub fn push(&mut self, tag: impl Into<String>) -> NodeId {
        let id = NodeId(NonZeroU32::MIN.saturating_add(self.nodes.len() as u32));
        self.nodes.push(SymbolNode {
            tag: tag.into(),
            children: [None; Edge::COUNT],
        });
        id
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    #[inline]
    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].tag
    }

    #[inline]
    pub fn set_tag(&mut self, id: NodeId, tag: String) {
        self.nodes[id.index()].tag = tag;
    }

    #[inline]
    pub fn child(&self, id: NodeId, edge: Edge) -> Option<NodeId> {
        self.nodes[id.index()].children[edge as usize]
    }

    #[inline]
    pub fn set_child(&mut self, id: NodeId, edge: Edge, child: Option<NodeId>) {
        self.nodes[id.index()].children[edge as usize] = child;
    }

    /// The present children of a node, in extraction order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (Edge, NodeId)> + '_ {
        let children = &self.nodes[id.index()].children;
        Edge::ALL
            .into_iter()
            .filter_map(move |edge| children[edge as usize].map(|child| (edge, child)))
    }

    /// Whether the node has a child on any of the given edges.
    pub fn has_any(&self, id: NodeId, edges: &[Edge]) -> bool {
        edges.iter().any(|&edge| self.child(id, edge).is_some())
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.index()].children.iter().all(Option::is_none)
    }

    /// Follows `edge` from `id` as far as possible and returns the last node reached.
    pub fn last_along(&self, mut id: NodeId, edge: Edge) -> NodeId {
        while let Some(next) = self.child(id, edge) {
            id = next;
        }
        id
    }

    /// The number of nodes on the longest path from the root to a leaf.
    pub fn height(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut max = 0;
        let mut stack = vec![(root, 1usize)];
        while let Some((id, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(self.children(id).map(|(_, child)| (child, depth + 1)));
        }
        max
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, root: NodeId) -> fmt::Result {
        enum Step {
            Open(NodeId),
            Edge(Edge, NodeId),
            Close,
        }
        let mut stack = vec![Step::Open(root)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Open(id) => {
                    f.write_str("[")?;
                    f.write_str(self.tag(id))?;
                    stack.push(Step::Close);
                    for edge in Edge::DISPLAY_ORDER.iter().rev() {
                        if let Some(child) = self.child(id, *edge) {
                            stack.push(Step::Edge(*edge, child));
                        }
                    }
                    if let Some(next) = self.child(id, Edge::Next) {
                        stack.push(Step::Open(next));
                    }
                }
                Step::Edge(edge, child) => {
                    write!(f, ",{}", edge.letter())?;
                    stack.push(Step::Open(child));
                }
                Step::Close => f.write_str("]")?,
            }
        }
        Ok(())
    }
}

/// The tree-string form, e.g. `[V!x[+[V!y]]]` or `[F!,o[N!1],u[N!2]]`.
impl fmt::Display for SymbolTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(root) => self.write_node(f, root),
            None => Ok(()),
        }
    }
}

/// An error in a tree string, at the given byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeStringError(pub usize);

impl fmt::Display for TreeStringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: invalid tree string", self.0)
    }
}

impl std::error::Error for TreeStringError {}

impl FromStr for SymbolTree {
    type Err = TreeStringError;

    /// Parses the tree-string form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tree = SymbolTree::new();
        if s.is_empty() {
            return Ok(tree);
        }
        let mut reader = TreeStringReader {
            s,
            pos: 0,
            tree: &mut tree,
        };
        let root = reader.node(0)?;
        if reader.pos != s.len() {
            return Err(TreeStringError(reader.pos));
        }
        tree.root = Some(root);
        Ok(tree)
    }
}

struct TreeStringReader<'s, 't> {
    s: &'s str,
    pos: usize,
    tree: &'t mut SymbolTree,
}

impl TreeStringReader<'_, '_> {
    fn peek(&self) -> Option<char> {
        self.s[self.pos..].chars().next()
    }

    fn expect(&mut self, ch: char) -> Result<(), TreeStringError> {
        if self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            Ok(())
        } else {
            Err(TreeStringError(self.pos))
        }
    }

    fn node(&mut self, depth: usize) -> Result<NodeId, TreeStringError> {
        if depth > crate::MAX_PATH_LENGTH {
            return Err(TreeStringError(self.pos));
        }
        self.expect('[')?;
        let start = self.pos;
        for (offset, ch) in self.s[start..].char_indices() {
            if ch == '[' || ch == ']' || (ch == ',' && offset > 0) {
                break;
            }
            self.pos = start + offset + ch.len_utf8();
        }
        let id = self.tree.push(&self.s[start..self.pos]);
        if self.peek() == Some('[') {
            let next = self.node(depth + 1)?;
            self.tree.set_child(id, Edge::Next, Some(next));
        }
        while self.peek() == Some(',') {
            self.pos += 1;
            let edge = self
                .peek()
                .and_then(Edge::from_letter)
                .ok_or(TreeStringError(self.pos))?;
            self.pos += 1;
            let child = self.node(depth + 1)?;
            self.tree.set_child(id, edge, Some(child));
        }
        self.expect(']')?;
        Ok(id)
    }
}
