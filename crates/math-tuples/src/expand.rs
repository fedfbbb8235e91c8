//! Rewriting of raw tuples: wildcard normalization, synonym variants and location thresholds.
use crate::config::{Thresholds, TupleConfig};
use crate::location;
use crate::tag::{WILDCARD_MOCK, is_wildcard, type_wildcard};
use crate::tuple::{NodeKind, Tuple};

/// Replaces query wildcards by the generic wildcard and, with synonyms, adds variants in which
/// one symbol is generalized to its type wildcard.
///
/// Repetition tuples are kept as they are for the symbol types in `dups` and with the symbol
/// replaced by its type wildcard for the types in `wild_dups`.
pub fn expand_wildcards(tuple: Tuple, config: &TupleConfig, out: &mut Vec<Tuple>) {
    let synonyms = config.synonyms;
    match tuple.kind() {
        NodeKind::Duplicate => {
            let Some(symbol) = tuple.fields.get(1) else {
                return;
            };
            let wildcard = type_wildcard(symbol);
            let mock = wildcard == WILDCARD_MOCK;
            let keep = !mock && config.dups.contains_type_of(symbol);
            let generalize = mock || synonyms || config.wild_dups.contains_type_of(symbol);
            if generalize {
                let mut variant = tuple.clone();
                variant.fields[1] = wildcard.to_string();
                if keep {
                    out.push(tuple);
                }
                out.push(variant);
            } else if keep {
                out.push(tuple);
            }
        }
        NodeKind::SymbolPair | NodeKind::Abbreviated => {
            let left = is_wildcard(&tuple.fields[0]);
            let right = is_wildcard(&tuple.fields[1]);
            match (left, right) {
                (true, false) => out.push(with_field(&tuple, 0, WILDCARD_MOCK)),
                (false, true) => out.push(with_field(&tuple, 1, WILDCARD_MOCK)),
                (true, true) => out.push(tuple),
                (false, false) => {
                    if synonyms {
                        let left = with_field(&tuple, 0, type_wildcard(&tuple.fields[0]));
                        let right = with_field(&tuple, 1, type_wildcard(&tuple.fields[1]));
                        out.extend([tuple, left, right]);
                    } else {
                        out.push(tuple);
                    }
                }
            }
        }
        NodeKind::Compound => generalize_one(tuple, 0, synonyms, out),
        NodeKind::EdgePair => generalize_one(tuple, 2, synonyms, out),
        NodeKind::Terminal | NodeKind::EndOfLine => {
            if !is_wildcard(&tuple.fields[0]) {
                out.push(tuple);
            }
        }
        NodeKind::Long => {
            if !is_wildcard(&tuple.fields[0]) && !is_wildcard(&tuple.fields[1]) {
                out.push(tuple);
            }
        }
    }
}

fn with_field(tuple: &Tuple, index: usize, value: &str) -> Tuple {
    let mut tuple = tuple.clone();
    tuple.fields[index] = value.to_string();
    tuple
}

/// Wildcard treatment of the single symbol at `index`.
fn generalize_one(tuple: Tuple, index: usize, synonyms: bool, out: &mut Vec<Tuple>) {
    let symbol = &tuple.fields[index];
    if is_wildcard(symbol) {
        out.push(with_field(&tuple, index, WILDCARD_MOCK));
    } else if synonyms {
        let variant = with_field(&tuple, index, type_wildcard(symbol));
        out.extend([tuple, variant]);
    } else {
        out.push(tuple);
    }
}

/// Emits the tuple without its location and, if the path to it is short enough for the
/// threshold of its kind, also with its location.
pub fn expand_locations(tuple: Tuple, thresholds: &Thresholds, out: &mut Vec<Tuple>) {
    let inclusion = thresholds.get(tuple.kind());
    let keep = tuple
        .location
        .as_deref()
        .is_some_and(|loc| inclusion.keeps_location(location::path_nodes(loc)));
    if keep {
        out.push(tuple.stripped());
        out.push(tuple);
    } else {
        out.push(Tuple {
            location: None,
            ..tuple
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Inclusion;
    use crate::tag::SymbolTypes;

    fn tuple(parts: &[&str]) -> Tuple {
        let (location, fields) = parts.split_last().unwrap();
        Tuple::new(fields.iter().copied(), Some(location.to_string()))
    }

    fn wildcards(parts: &[&str], config: &TupleConfig) -> Vec<String> {
        let mut out = Vec::new();
        expand_wildcards(tuple(parts), config, &mut out);
        out.iter().map(Tuple::to_string).collect()
    }

    #[test]
    fn pair_wildcards() {
        let config = TupleConfig::default();
        let problems: [(&str, &[&str], Vec<&str>); 8] = [
            ("plain", &["V!x", "+", "n", "-"], vec!["('V!x', '+', 'n', '-')"]),
            ("left", &["?a", "+", "n", "-"], vec!["('??W', '+', 'n', '-')"]),
            ("right", &["+", "?b", "n", "n"], vec!["('+', '??W', 'n', 'n')"]),
            ("both", &["?a", "?b", "n", "-"], vec!["('?a', '?b', 'n', '-')"]),
            ("terminal", &["?a", "!0", "-"], vec![]),
            ("long", &["?a", "V!y", "-"], vec![]),
            ("compound", &["?f", "[n,a]", "-"], vec!["('??W', '[n,a]', '-')"]),
            ("edge", &["n", "a", "?x", "n"], vec!["('n', 'a', '??W', 'n')"]),
        ];
        for (name, parts, expected) in problems {
            assert_eq!(wildcards(parts, &config), expected, "{name}");
        }
    }

    #[test]
    fn pair_synonyms() {
        let config = TupleConfig {
            synonyms: true,
            ..Default::default()
        };
        assert_eq!(
            wildcards(&["V!x", "+", "n", "-"], &config),
            [
                "('V!x', '+', 'n', '-')",
                "('??V', '+', 'n', '-')",
                "('V!x', '??O', 'n', '-')",
            ]
        );
        assert_eq!(
            wildcards(&["?a", "?b", "n", "-"], &config),
            ["('?a', '?b', 'n', '-')"]
        );
        assert_eq!(
            wildcards(&["F!", "[o,u]", "-"], &config),
            ["('F!', '[o,u]', '-')", "('??F', '[o,u]', '-')"]
        );
    }

    #[test]
    fn repetition_wildcards() {
        let mut config = TupleConfig {
            dups: SymbolTypes::VARIABLE,
            wild_dups: SymbolTypes::NUMBER,
            ..Default::default()
        };
        assert_eq!(
            wildcards(&["!REP!", "V!a", "nn", "-"], &config),
            ["('!REP!', 'V!a', 'nn', '-')"]
        );
        assert_eq!(
            wildcards(&["!REP!", "N!2", "o", "u", "-"], &config),
            ["('!REP!', '??N', 'o', 'u', '-')"]
        );
        assert_eq!(wildcards(&["!REP!", "+", "nn", "-"], &config), Vec::<String>::new());
        assert_eq!(
            wildcards(&["!REP!", "?x", "nn", "-"], &config),
            ["('!REP!', '??W', 'nn', '-')"]
        );
        config.wild_dups = SymbolTypes::VARIABLE;
        assert_eq!(
            wildcards(&["!REP!", "V!a", "nn", "-"], &config),
            ["('!REP!', 'V!a', 'nn', '-')", "('!REP!', '??V', 'nn', '-')"]
        );
    }

    #[test]
    fn location_thresholds() {
        let thresholds = Thresholds::none()
            .with(NodeKind::SymbolPair, 3)
            .with(NodeKind::Terminal, Inclusion::Unlimited)
            .with(NodeKind::Compound, 1);
        let problems: [(&str, &[&str], usize); 5] = [
            ("root_pair", &["V!x", "+", "n", "-"], 2),
            ("deep_pair", &["+", "V!y", "n", "nn"], 1),
            ("short_pair", &["+", "V!y", "n", "n"], 2),
            ("unlimited", &["V!y", "!0", "12n"], 2),
            ("stripped_only", &["F!", "[o,u]", "-"], 1),
        ];
        for (name, parts, expected) in problems {
            let mut out = Vec::new();
            expand_locations(tuple(parts), &thresholds, &mut out);
            assert_eq!(out.len(), expected, "{name}");
            assert_eq!(out[0].location, None, "{name}");
            if expected == 2 {
                assert_eq!(out[1], tuple(parts), "{name}");
            }
        }
    }
}
