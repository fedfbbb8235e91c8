//! Feature tuples and their classification into node kinds.
use std::fmt;

use strum::EnumCount;
use strum_macros::{EnumCount, IntoStaticStr};

use crate::tree::Edge;

/// The first field of a repetition tuple.
pub const REP_MARKER: &str = "!REP!";

/// The second field of terminal and end-of-line tuples.
pub(crate) const TERMINAL_MARKER: &str = "!0";

/// The kinds of feature tuples, named after their command-line letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, IntoStaticStr)]
pub enum NodeKind {
    /// `S`: two symbols and the path between them.
    #[strum(serialize = "S")]
    SymbolPair,
    /// `R`: the edge into a node, an edge out of it, and the node's symbol.
    #[strum(serialize = "R")]
    EdgePair,
    /// `T`: a leaf symbol.
    #[strum(serialize = "T")]
    Terminal,
    /// `E`: a leaf symbol of a short formula.
    #[strum(serialize = "E")]
    EndOfLine,
    /// `C`: a symbol with the letters of its outgoing edges.
    #[strum(serialize = "C")]
    Compound,
    /// `L`: two symbols beyond the window, without a path.
    #[strum(serialize = "L")]
    Long,
    /// `A`: two symbols beyond the window with a boundary path.
    #[strum(serialize = "A")]
    Abbreviated,
    /// `D`: two occurrences of the same symbol.
    #[strum(serialize = "D")]
    Duplicate,
}

impl NodeKind {
    pub const ALL: [NodeKind; NodeKind::COUNT] = [
        NodeKind::SymbolPair,
        NodeKind::EdgePair,
        NodeKind::Terminal,
        NodeKind::EndOfLine,
        NodeKind::Compound,
        NodeKind::Long,
        NodeKind::Abbreviated,
        NodeKind::Duplicate,
    ];

    #[inline]
    pub fn letter(self) -> &'static str {
        self.into()
    }

    pub fn from_letter(letter: char) -> Option<NodeKind> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.letter().starts_with(letter))
    }
}

/// A feature tuple: a few string fields and an optional encoded location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tuple {
    pub fields: Vec<String>,
    pub location: Option<String>,
}

impl Tuple {
    pub fn new<I, S>(fields: I, location: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Tuple {
            fields: fields.into_iter().map(Into::into).collect(),
            location,
        }
    }

    /// The same tuple without its location.
    pub fn stripped(&self) -> Tuple {
        Tuple {
            fields: self.fields.clone(),
            location: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        classify(&self.fields)
    }

    /// The fields followed by the location, if any.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(String::as_str)
            .chain(self.location.as_deref())
    }
}

/// Debug form, e.g. `('V!x', '+', 'n', '-')`.
impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, part) in self.parts().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{part}'")?;
        }
        f.write_str(")")
    }
}

#[inline]
fn is_edge_letter(field: &str) -> bool {
    let mut chars = field.chars();
    matches!((chars.next(), chars.next()), (Some(ch), None) if Edge::from_letter(ch).is_some())
}

/// Classifies tuple fields (without the location) by their shape.
pub fn classify(fields: &[String]) -> NodeKind {
    let first = fields.first().map(String::as_str).unwrap_or_default();
    let second = fields.get(1).map(String::as_str).unwrap_or_default();
    if second == TERMINAL_MARKER {
        if fields.len() == 3 {
            NodeKind::EndOfLine
        } else {
            NodeKind::Terminal
        }
    } else if second.len() > 1 && second.starts_with('[') && second.ends_with(']') {
        NodeKind::Compound
    } else if fields.len() == 3 && is_edge_letter(first) && is_edge_letter(second) {
        NodeKind::EdgePair
    } else if first == REP_MARKER {
        NodeKind::Duplicate
    } else if fields.len() == 2 {
        NodeKind::Long
    } else {
        NodeKind::SymbolPair
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_shapes() {
        let problems = [
            ("pair", vec!["V!x", "+", "n"], NodeKind::SymbolPair),
            ("boundary_pair", vec!["V!x", "V!y", "nw"], NodeKind::SymbolPair),
            ("long", vec!["V!x", "V!y"], NodeKind::Long),
            ("terminal", vec!["V!y", "!0"], NodeKind::Terminal),
            ("eol", vec!["V!y", "!0", "n"], NodeKind::EndOfLine),
            ("compound", vec!["F!", "[o,u]"], NodeKind::Compound),
            ("edge", vec!["n", "a", "V!x"], NodeKind::EdgePair),
            ("edge_variable", vec!["w", "v", "∫"], NodeKind::EdgePair),
            ("repetition", vec!["!REP!", "V!a", "nn"], NodeKind::Duplicate),
            ("cross_repetition", vec!["!REP!", "V!a", "a", "b"], NodeKind::Duplicate),
            ("bracket_symbol", vec!["&lsqb;", "V!x", "n"], NodeKind::SymbolPair),
            ("operator_named_like_edge", vec!["n", "V!x", "n"], NodeKind::SymbolPair),
            ("long_pair_of_letters", vec!["d", "n"], NodeKind::Long),
        ];
        for (name, fields, expected) in problems {
            let fields: Vec<String> = fields.into_iter().map(String::from).collect();
            assert_eq!(classify(&fields), expected, "{name}");
        }
    }

    #[test]
    fn kind_letters() {
        for kind in NodeKind::ALL {
            let letter = kind.letter().chars().next().unwrap();
            assert_eq!(NodeKind::from_letter(letter), Some(kind));
        }
        assert_eq!(NodeKind::from_letter('X'), None);
    }

    #[test]
    fn display_tuple() {
        let tuple = Tuple::new(["V!x", "+", "n"], Some("-".to_string()));
        assert_eq!(tuple.to_string(), "('V!x', '+', 'n', '-')");
        assert_eq!(tuple.stripped().to_string(), "('V!x', '+', 'n')");
    }
}
