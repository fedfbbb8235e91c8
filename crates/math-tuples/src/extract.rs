//! Feature extraction from a symbol tree.
//!
//! The tree is walked depth-first with an explicit stack. Each node first contributes its
//! compound tuple, then for each child the symbol pairs it forms with the child's subtree, then
//! whatever the child's own subtree produces. Terminal, edge-pair and repetition tuples are added
//! once all children are done.
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::{TupleConfig, Window};
use crate::error::{ConvertErrKind, ConvertError};
use crate::location;
use crate::tree::{Edge, NodeId, SymbolTree};
use crate::tuple::{REP_MARKER, TERMINAL_MARKER, Tuple};

/// End-of-line tuples are only generated for trees with fewer nodes on their longest path.
pub const MAX_EOL_HEIGHT: usize = 3;

/// A node whose children are being visited.
struct Frame {
    node: NodeId,
    /// Unencoded path from the root or the nearest anchor.
    prefix: String,
    location: String,
    /// Index into [`Edge::ALL`] of the next edge to look at.
    cursor: usize,
    /// Length of the output when the node was entered.
    start: usize,
}

pub(crate) struct Extractor<'a> {
    config: &'a TupleConfig,
    anchors: &'a FxHashSet<String>,
    symbol_pairs: bool,
    compounds: bool,
    terminals: bool,
    edge_pairs: bool,
    repetitions: bool,
    /// Pairs beyond the window are generated in a reduced form.
    unbounded: bool,
    shortened: bool,
}

impl<'a> Extractor<'a> {
    pub(crate) fn new(config: &'a TupleConfig, anchors: &'a FxHashSet<String>) -> Self {
        let thresholds = &config.thresholds;
        Extractor {
            config,
            anchors,
            symbol_pairs: thresholds.symbol_pairs.is_included(),
            compounds: thresholds.compounds.is_included(),
            terminals: thresholds.terminals.is_included(),
            edge_pairs: thresholds.edge_pairs.is_included(),
            repetitions: thresholds.duplicates.is_included(),
            unbounded: config.unbounded(),
            shortened: config.shortened(),
        }
    }

    /// Returns the raw tuples of the tree, each with its location.
    pub(crate) fn extract(&self, tree: &SymbolTree) -> Result<Vec<Tuple>, ConvertError> {
        let Some(root) = tree.root() else {
            return Ok(Vec::new());
        };
        let eol = self.config.thresholds.eol.is_included() && tree.height() < MAX_EOL_HEIGHT;
        let mut out = Vec::new();
        // The most recent path of each symbol seen so far.
        let mut seen: FxHashMap<&str, String> = FxHashMap::default();
        let mut stack = vec![self.enter(tree, root, String::new(), &mut out)];

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let mut next = None;
            while let Some(&edge) = Edge::ALL.get(frame.cursor) {
                frame.cursor += 1;
                if let Some(child) = tree.child(node, edge) {
                    next = Some((edge, child));
                    break;
                }
            }
            if let Some((edge, child)) = next {
                if self.symbol_pairs {
                    self.pairs_below(tree, node, edge, child, &frame.location, &mut out);
                }
                let mut prefix = if self.anchors.contains(tree.tag(node)) {
                    String::new()
                } else {
                    frame.prefix.clone()
                };
                prefix.push(edge.letter());
                if prefix.len() > crate::MAX_PATH_LENGTH {
                    return Err(ConvertError(0..0, ConvertErrKind::PathLimitExceeded));
                }
                let child_frame = self.enter(tree, child, prefix, &mut out);
                stack.push(child_frame);
            } else if let Some(frame) = stack.pop() {
                self.leave(tree, frame, eol, &mut seen, &mut out);
            }
        }
        Ok(out)
    }

    fn enter(&self, tree: &SymbolTree, node: NodeId, prefix: String, out: &mut Vec<Tuple>) -> Frame {
        let location = location::encode(&prefix).into_owned();
        if self.compounds {
            let edges: Vec<&str> = tree.children(node).map(|(edge, _)| edge.as_str()).collect();
            if edges.len() > 1 {
                let signature = format!("[{}]", edges.join(","));
                out.push(Tuple::new(
                    [tree.tag(node), signature.as_str()],
                    Some(location.clone()),
                ));
            }
        }
        Frame {
            node,
            prefix,
            location,
            cursor: 0,
            start: out.len(),
        }
    }

    fn leave<'t>(
        &self,
        tree: &'t SymbolTree,
        frame: Frame,
        eol: bool,
        seen: &mut FxHashMap<&'t str, String>,
        out: &mut Vec<Tuple>,
    ) {
        let tag = tree.tag(frame.node);
        let location = Some(frame.location);

        if out.len() == frame.start {
            if eol {
                out.push(Tuple::new([tag, TERMINAL_MARKER, "n"], location.clone()));
            } else if self.terminals {
                out.push(Tuple::new([tag, TERMINAL_MARKER], location.clone()));
            }
        }

        if self.edge_pairs {
            if let Some(incoming) = frame.prefix.chars().last() {
                let incoming = incoming.to_string();
                for (edge, _) in tree.children(frame.node) {
                    if edge != Edge::Within {
                        out.push(Tuple::new(
                            [incoming.as_str(), edge.as_str(), tag],
                            location.clone(),
                        ));
                    }
                }
            }
        }

        if self.repetitions
            && (self.config.dups | self.config.wild_dups).contains_type_of(tag)
        {
            let prefix = frame.prefix;
            if let Some(prior) = seen.insert(tag, prefix.clone()) {
                let common = common_prefix_len(&prior, &prefix);
                if common == prefix.len() {
                    // The prior occurrence lies below this one.
                    out.push(Tuple::new(
                        [REP_MARKER, tag, &*location::encode(&prior[common..])],
                        location,
                    ));
                } else {
                    out.push(Tuple::new(
                        [
                            REP_MARKER,
                            tag,
                            &*location::encode(&prior[common..]),
                            &*location::encode(&prefix[common..]),
                        ],
                        Some(location::encode(&prefix[..common]).into_owned()),
                    ));
                }
            }
        }
    }

    /// Pairs `node` with `child` and the descendants of `child` within the window.
    fn pairs_below(
        &self,
        tree: &SymbolTree,
        node: NodeId,
        edge: Edge,
        child: NodeId,
        location: &str,
        out: &mut Vec<Tuple>,
    ) {
        let tag = tree.tag(node);
        let mut stack = vec![(child, String::from(edge.letter()))];
        while let Some((desc, path)) = stack.pop() {
            if self.descends(path.len()) {
                for edge in Edge::PAIR_ORDER {
                    if let Some(grandchild) = tree.child(desc, edge) {
                        let mut longer = path.clone();
                        longer.push(edge.letter());
                        stack.push((grandchild, longer));
                    }
                }
            }
            out.push(self.pair(tag, tree.tag(desc), &path, location));
        }
    }

    /// Whether the pair walk continues below a node at a relative path of `len` edges.
    #[inline]
    fn descends(&self, len: usize) -> bool {
        match self.config.window {
            Window::Unbounded => true,
            Window::Bounded(size) => len < usize::from(size) || self.unbounded,
        }
    }

    fn pair(&self, left: &str, right: &str, path: &str, location: &str) -> Tuple {
        let location = Some(location.to_string());
        if self.unbounded && !self.config.window.admits(path.len()) {
            if self.shortened {
                return Tuple::new([left, right], location);
            }
            let mut boundary = String::with_capacity(2);
            boundary.extend(path.chars().next());
            boundary.extend(path.chars().last());
            return Tuple::new([left, right, boundary.as_str()], location);
        }
        Tuple::new([left, right, &*location::encode(path)], location)
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}
