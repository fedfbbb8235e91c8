use mathml_reader::Markup;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::tag::SymbolTypes;
use crate::tuple::NodeKind;

/// Thresholds at or above this value keep the location of every tuple.
pub const INFINITE_DEPTH: i32 = 99;

/// The operators that anchor location paths by default: relations and arrows.
pub const DEFAULT_ANCHORS: [&str; 21] = [
    ":=", "<", "=", ">", "≠", "≤", "≥", "∝", "∼", "≅", "≈", "≡", "→", "↔", "↦", "⇒", "⇔", "⟹", "⊂",
    "⊆", "⊈",
];

/// The maximum path length between the two symbols of a symbol pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "u32", into = "u32"))]
pub enum Window {
    /// Pairs are generated for paths of at most this many edges (at least one).
    Bounded(u16),
    Unbounded,
}

impl Default for Window {
    fn default() -> Self {
        Window::Bounded(1)
    }
}

/// `0` and sizes of at least [`INFINITE_DEPTH`] mean unbounded.
impl From<u32> for Window {
    fn from(size: u32) -> Self {
        match u16::try_from(size) {
            Ok(size) if size != 0 && i32::from(size) < INFINITE_DEPTH => Window::Bounded(size),
            _ => Window::Unbounded,
        }
    }
}

impl From<Window> for u32 {
    fn from(window: Window) -> Self {
        match window {
            Window::Bounded(size) => u32::from(size),
            Window::Unbounded => 0,
        }
    }
}

impl Window {
    /// Whether a relative path of `len` edges lies within the window.
    #[inline]
    pub(crate) fn admits(self, len: usize) -> bool {
        match self {
            Window::Bounded(size) => len <= usize::from(size),
            Window::Unbounded => true,
        }
    }
}

/// Whether tuples of a kind are generated and, if so, which of them also keep their location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "i32", into = "i32"))]
pub enum Inclusion {
    /// No tuples of this kind.
    #[default]
    Excluded,
    /// Tuples of this kind; those whose path has fewer than this many nodes also keep their
    /// location.
    Limit(u8),
    /// Tuples of this kind, all of them also with their location.
    Unlimited,
}

/// Non-positive values exclude a kind; values of at least [`INFINITE_DEPTH`] are unlimited.
impl From<i32> for Inclusion {
    fn from(value: i32) -> Self {
        if value <= 0 {
            Inclusion::Excluded
        } else if value >= INFINITE_DEPTH {
            Inclusion::Unlimited
        } else {
            Inclusion::Limit(u8::try_from(value).unwrap_or(u8::MAX))
        }
    }
}

impl From<Inclusion> for i32 {
    fn from(inclusion: Inclusion) -> Self {
        match inclusion {
            Inclusion::Excluded => 0,
            Inclusion::Limit(limit) => i32::from(limit),
            Inclusion::Unlimited => INFINITE_DEPTH,
        }
    }
}

impl Inclusion {
    #[inline]
    pub fn is_included(self) -> bool {
        !matches!(self, Inclusion::Excluded)
    }

    /// Whether a tuple whose path has `path_nodes` nodes is also emitted with its location.
    pub fn keeps_location(self, path_nodes: usize) -> bool {
        match self {
            Inclusion::Excluded => false,
            Inclusion::Limit(limit) => path_nodes < usize::from(limit),
            Inclusion::Unlimited => true,
        }
    }
}

/// The inclusion of each tuple kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct Thresholds {
    pub symbol_pairs: Inclusion,
    pub edge_pairs: Inclusion,
    pub terminals: Inclusion,
    pub eol: Inclusion,
    pub compounds: Inclusion,
    /// Symbol pairs beyond the window, reduced to their location.
    pub long_pairs: Inclusion,
    /// Switches pairs beyond the window from the boundary-path form to the location-only form.
    pub abbreviated: Inclusion,
    pub duplicates: Inclusion,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            symbol_pairs: Inclusion::Limit(8),
            edge_pairs: Inclusion::Excluded,
            terminals: Inclusion::Limit(8),
            eol: Inclusion::Excluded,
            compounds: Inclusion::Limit(8),
            long_pairs: Inclusion::Excluded,
            abbreviated: Inclusion::Excluded,
            duplicates: Inclusion::Limit(8),
        }
    }
}

impl Thresholds {
    /// Thresholds with every kind excluded.
    pub fn none() -> Self {
        Thresholds {
            symbol_pairs: Inclusion::Excluded,
            edge_pairs: Inclusion::Excluded,
            terminals: Inclusion::Excluded,
            eol: Inclusion::Excluded,
            compounds: Inclusion::Excluded,
            long_pairs: Inclusion::Excluded,
            abbreviated: Inclusion::Excluded,
            duplicates: Inclusion::Excluded,
        }
    }

    fn slot_mut(&mut self, kind: NodeKind) -> &mut Inclusion {
        match kind {
            NodeKind::SymbolPair => &mut self.symbol_pairs,
            NodeKind::EdgePair => &mut self.edge_pairs,
            NodeKind::Terminal => &mut self.terminals,
            NodeKind::EndOfLine => &mut self.eol,
            NodeKind::Compound => &mut self.compounds,
            NodeKind::Long => &mut self.long_pairs,
            NodeKind::Abbreviated => &mut self.abbreviated,
            NodeKind::Duplicate => &mut self.duplicates,
        }
    }

    pub fn get(&self, kind: NodeKind) -> Inclusion {
        match kind {
            NodeKind::SymbolPair => self.symbol_pairs,
            NodeKind::EdgePair => self.edge_pairs,
            NodeKind::Terminal => self.terminals,
            NodeKind::EndOfLine => self.eol,
            NodeKind::Compound => self.compounds,
            NodeKind::Long => self.long_pairs,
            NodeKind::Abbreviated => self.abbreviated,
            NodeKind::Duplicate => self.duplicates,
        }
    }

    pub fn set(&mut self, kind: NodeKind, inclusion: Inclusion) {
        *self.slot_mut(kind) = inclusion;
    }

    /// Builder-style variant of [`Thresholds::set`].
    pub fn with(mut self, kind: NodeKind, inclusion: impl Into<Inclusion>) -> Self {
        self.set(kind, inclusion.into());
        self
    }
}

/// Configuration object for the conversion of formulas into tuples.
///
/// # Example usage
///
/// ```rust
/// use math_tuples::{NodeKind, Thresholds, TupleConfig, Window};
///
/// // Default values
/// let config = TupleConfig::default();
///
/// // Symbol pairs up to two edges apart, plus terminal symbols, never with locations
/// let config = TupleConfig {
///     window: Window::Bounded(2),
///     thresholds: Thresholds::none()
///         .with(NodeKind::SymbolPair, 1)
///         .with(NodeKind::Terminal, 1),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct TupleConfig {
    /// The maximum path length for symbol pairs. See [`Window`].
    pub window: Window,
    /// Which tuple kinds are generated and with which locations. See [`Inclusion`].
    pub thresholds: Thresholds,
    /// Operator tags that reset location paths for everything beneath them.
    pub anchors: Vec<String>,
    /// Symbol types whose repetitions are recorded as they are.
    pub dups: SymbolTypes,
    /// Symbol types whose repetitions are recorded with the symbol replaced by its type wildcard.
    pub wild_dups: SymbolTypes,
    /// If `true`, tuples are augmented with type-wildcard variants (for indexing, not queries).
    pub synonyms: bool,
    /// Which part of a parallel MathML formula to convert.
    pub markup: Markup,
}

impl Default for TupleConfig {
    fn default() -> Self {
        TupleConfig {
            window: Window::default(),
            thresholds: Thresholds::default(),
            anchors: DEFAULT_ANCHORS.iter().map(|anchor| anchor.to_string()).collect(),
            dups: SymbolTypes::all(),
            wild_dups: SymbolTypes::all(),
            synonyms: false,
            markup: Markup::Presentation,
        }
    }
}

impl TupleConfig {
    /// Symbol pairs beyond the window are generated (in a reduced form).
    #[inline]
    pub fn unbounded(&self) -> bool {
        self.thresholds.long_pairs.is_included()
    }

    /// Symbol pairs beyond the window keep only their location.
    #[inline]
    pub fn shortened(&self) -> bool {
        self.thresholds.abbreviated.is_included()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusion_from_integers() {
        let problems = [
            (-3, Inclusion::Excluded),
            (0, Inclusion::Excluded),
            (1, Inclusion::Limit(1)),
            (8, Inclusion::Limit(8)),
            (98, Inclusion::Limit(98)),
            (99, Inclusion::Unlimited),
            (1000, Inclusion::Unlimited),
        ];
        for (value, expected) in problems {
            assert_eq!(Inclusion::from(value), expected, "{value}");
        }
    }

    #[test]
    fn keeps_location() {
        assert!(Inclusion::Limit(3).keeps_location(2));
        assert!(!Inclusion::Limit(3).keeps_location(3));
        assert!(Inclusion::Unlimited.keeps_location(500));
        assert!(!Inclusion::Excluded.keeps_location(0));
    }

    #[test]
    fn window_from_size() {
        assert_eq!(Window::from(0), Window::Unbounded);
        assert_eq!(Window::from(1), Window::Bounded(1));
        assert_eq!(Window::from(98), Window::Bounded(98));
        assert_eq!(Window::from(99), Window::Unbounded);
        assert_eq!(Window::from(70000), Window::Unbounded);
        assert!(Window::Bounded(2).admits(2));
        assert!(!Window::Bounded(2).admits(3));
    }

    #[test]
    fn default_thresholds() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.get(NodeKind::SymbolPair), Inclusion::Limit(8));
        assert_eq!(thresholds.get(NodeKind::EdgePair), Inclusion::Excluded);
        assert_eq!(thresholds.get(NodeKind::Duplicate), Inclusion::Limit(8));
        let config = TupleConfig::default();
        assert!(!config.unbounded());
        assert!(!config.shortened());
        assert_eq!(config.anchors.len(), 21);
    }
}
