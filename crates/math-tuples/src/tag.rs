//! Symbol tags, their type markers and the wildcards derived from them.
//!
//! A tag starts with a two-character type marker (`V!x`, `N!2`, `M!()1x2`, ...), or is a query
//! wildcard (`?a`), or is the literal text of an operator (`+`, `∑`).
use std::fmt;

use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub(crate) const VARIABLE: &str = "V!";
pub(crate) const NUMBER: &str = "N!";
pub(crate) const FRACTION: &str = "F!";
pub(crate) const RADICAL: &str = "R!";
pub(crate) const TEXT: &str = "T!";
pub(crate) const MATRIX: &str = "M!";
pub(crate) const ERROR: &str = "E!";
pub(crate) const WHITESPACE: &str = "W!";

/// The generic wildcard that matches any symbol.
pub(crate) const WILDCARD_MOCK: &str = "??W";
pub(crate) const OPERATOR_WILDCARD: &str = "??O";

bitflags! {
    /// A set of symbol types, written as a subset of the letters `VNOMFRTW`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
    pub struct SymbolTypes: u8 {
        /// `V`: identifiers.
        const VARIABLE = 1 << 0;
        /// `N`: numbers.
        const NUMBER = 1 << 1;
        /// `O`: operators.
        const OPERATOR = 1 << 2;
        /// `M`: matrices and parenthesized groups.
        const MATRIX = 1 << 3;
        /// `F`: fractions.
        const FRACTION = 1 << 4;
        /// `R`: radicals.
        const RADICAL = 1 << 5;
        /// `T`: text.
        const TEXT = 1 << 6;
        /// `W`: wildcards and symbols of unknown type.
        const WILDCARD = 1 << 7;
    }
}

impl SymbolTypes {
    const LETTERS: [(char, SymbolTypes); 8] = [
        ('V', SymbolTypes::VARIABLE),
        ('N', SymbolTypes::NUMBER),
        ('O', SymbolTypes::OPERATOR),
        ('M', SymbolTypes::MATRIX),
        ('F', SymbolTypes::FRACTION),
        ('R', SymbolTypes::RADICAL),
        ('T', SymbolTypes::TEXT),
        ('W', SymbolTypes::WILDCARD),
    ];

    pub fn from_letter(letter: char) -> Option<SymbolTypes> {
        Self::LETTERS
            .iter()
            .find(|(l, _)| *l == letter)
            .map(|(_, types)| *types)
    }

    /// Parses a string of type letters such as `"VNO"`.
    pub fn from_letters(letters: &str) -> Result<SymbolTypes, InvalidTypeLetter> {
        letters.chars().try_fold(SymbolTypes::empty(), |acc, letter| {
            Self::from_letter(letter)
                .map(|types| acc | types)
                .ok_or(InvalidTypeLetter(letter))
        })
    }

    pub fn letters(self) -> String {
        Self::LETTERS
            .iter()
            .filter(|(_, types)| self.contains(*types))
            .map(|(letter, _)| *letter)
            .collect()
    }

    /// Whether the type of `tag` (see [`type_wildcard`]) is in this set.
    pub fn contains_type_of(self, tag: &str) -> bool {
        Self::from_letter(type_letter(tag)).is_some_and(|types| self.contains(types))
    }
}

/// A character that does not name a symbol type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTypeLetter(pub char);

impl fmt::Display for InvalidTypeLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not one of the symbol types VNOMFRTW", self.0)
    }
}

impl std::error::Error for InvalidTypeLetter {}

impl TryFrom<String> for SymbolTypes {
    type Error = InvalidTypeLetter;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SymbolTypes::from_letters(&value)
    }
}

impl From<SymbolTypes> for String {
    fn from(types: SymbolTypes) -> Self {
        types.letters()
    }
}

/// Whether `tag` is a query wildcard such as `?a`.
#[inline]
pub(crate) fn is_wildcard(tag: &str) -> bool {
    tag.starts_with('?')
}

/// Whether `tag` denotes an operand (wildcard or marked type) rather than an operator.
pub(crate) fn is_non_operator(tag: &str) -> bool {
    is_wildcard(tag) || tag.chars().nth(1) == Some('!')
}

/// The type wildcard of a tag: `??V` for `V!x`, `??O` for an operator, `??W` for a query
/// wildcard.
///
/// Markers other than `VNOMFRT` (such as `E!` and `W!`) are treated as operators.
pub(crate) fn type_wildcard(tag: &str) -> &'static str {
    match tag.find('!') {
        None | Some(0) => {
            if is_wildcard(tag) {
                WILDCARD_MOCK
            } else {
                OPERATOR_WILDCARD
            }
        }
        Some(sep) => match &tag[..sep] {
            "V" => "??V",
            "N" => "??N",
            "O" => "??O",
            "M" => "??M",
            "F" => "??F",
            "R" => "??R",
            "T" => "??T",
            _ => OPERATOR_WILDCARD,
        },
    }
}

/// The type letter of a tag, one of `VNOMFRTW`.
#[inline]
pub(crate) fn type_letter(tag: &str) -> char {
    type_wildcard(tag).chars().nth(2).unwrap_or('O')
}

/// Strips token text and escapes the characters that are significant in tuples.
///
/// A token that consists of a single invisible operator (function application, invisible times,
/// invisible separator or invisible plus) becomes empty.
pub(crate) fn clean(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        match ch {
            '\t' => cleaned.push_str(r"\t"),
            '\n' => cleaned.push_str(r"\n"),
            '\r' => cleaned.push_str(r"\r"),
            ' ' => cleaned.push('␣'),
            '"' => cleaned.push_str("&quot;"),
            '\'' => cleaned.push_str("&apos;"),
            '?' => cleaned.push_str("&quest;"),
            ',' => cleaned.push_str("&comma;"),
            '[' => cleaned.push_str("&lsqb;"),
            ']' => cleaned.push_str("&rsqb;"),
            _ => cleaned.push(ch),
        }
    }
    if matches!(cleaned.as_str(), "\u{2061}" | "\u{2062}" | "\u{2063}" | "\u{2064}") {
        cleaned.clear();
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_escapes() {
        let problems = [
            ("plain", " x ", "x"),
            ("space", "a b", "a␣b"),
            ("comma", ",", "&comma;"),
            ("brackets", "[]", "&lsqb;&rsqb;"),
            ("quotes", "'\"", "&apos;&quot;"),
            ("question", "?", "&quest;"),
            ("invisible_times", "\u{2062}", ""),
            ("function_application", "\u{2061}", ""),
            ("tab_inside", "a\tb", r"a\tb"),
        ];
        for (name, input, expected) in problems {
            assert_eq!(clean(input), expected, "{name}");
        }
    }

    #[test]
    fn type_wildcards() {
        let problems = [
            ("V!x", "??V"),
            ("N!-1", "??N"),
            ("M!()1x2", "??M"),
            ("F!", "??F"),
            ("R!", "??R"),
            ("T!text", "??T"),
            ("+", "??O"),
            ("!", "??O"),
            ("?a", "??W"),
            ("E!oops", "??O"),
            ("W!", "??O"),
        ];
        for (tag, expected) in problems {
            assert_eq!(type_wildcard(tag), expected, "{tag}");
        }
    }

    #[test]
    fn operand_detection() {
        assert!(is_non_operator("V!x"));
        assert!(is_non_operator("?x"));
        assert!(is_non_operator("W!"));
        assert!(!is_non_operator("+"));
        assert!(!is_non_operator("∑"));
        assert!(!is_non_operator("!"));
    }

    #[test]
    fn symbol_type_letters() {
        let types = SymbolTypes::from_letters("VNW").unwrap();
        assert_eq!(types, SymbolTypes::VARIABLE | SymbolTypes::NUMBER | SymbolTypes::WILDCARD);
        assert_eq!(types.letters(), "VNW");
        assert_eq!(SymbolTypes::all().letters(), "VNOMFRTW");
        assert_eq!(SymbolTypes::from_letters("VX"), Err(InvalidTypeLetter('X')));
        assert!(types.contains_type_of("V!x"));
        assert!(types.contains_type_of("?q"));
        assert!(!types.contains_type_of("+"));
    }
}
