//! Serialization of tuples into index tokens.
use crate::tag::WILDCARD_MOCK;
use crate::tuple::{NodeKind, Tuple};

pub const START_TAG: &str = "#(start)#";
pub const END_TAG: &str = "#(end)#";
/// Printed in place of the tokens of a formula that could not be converted.
pub const ERROR_TAG: &str = "#(error)#";

/// The wildcard of the query language.
const WILDCARD: &str = "*";
/// Stands for a literal `*` until the final substitutions.
const PROTECTED_WILDCARD: &str = "--*--";

/// Applied in order to the lower-cased token.
const SUBSTITUTIONS: [(&str, &str); 14] = [
    (" ", ""),
    ("'", ""),
    ("\"", ""),
    ("&comma;", "comma"),
    ("&quot;", "quot"),
    ("&apos;", "apos"),
    ("&lsqb;", "lsqb"),
    ("&rsqb;", "rsqb"),
    ("&quest;", "quest"),
    ("&amp;", "amp"),
    ("&", "amp"),
    (">", "gt"),
    ("<", "lt"),
    (PROTECTED_WILDCARD, "ast"),
];

/// Formats a tuple as `#(a,b,...)#`, or as `#{...}#` without the marker for repetition tuples.
///
/// Literal asterisks become `ast`, the generic wildcard becomes `*` and type wildcards such as
/// `??V` become `?v`.
pub fn format_tuple(tuple: &Tuple) -> String {
    let repetition = tuple.kind() == NodeKind::Duplicate;
    let mut token = String::from(if repetition { "{" } else { "(" });
    let parts = tuple.parts().skip(usize::from(repetition));
    for (i, part) in parts.enumerate() {
        if i > 0 {
            token.push(',');
        }
        let part = part.replace(WILDCARD, PROTECTED_WILDCARD);
        if part == WILDCARD_MOCK {
            token.push_str(WILDCARD);
        } else if let Some(rest) = part.strip_prefix('?').filter(|rest| rest.starts_with('?')) {
            token.push_str(rest);
        } else {
            token.push_str(&part.replace('\\', r"\\"));
        }
    }
    token.push(if repetition { '}' } else { ')' });

    let mut token = token.to_lowercase();
    for (from, to) in SUBSTITUTIONS {
        if token.contains(from) {
            token = token.replace(from, to);
        }
    }
    format!("#{token}#")
}

/// Formats the tokens of one formula between the start and end tags, separated by spaces.
pub fn format_line<'t>(tuples: impl IntoIterator<Item = &'t Tuple>) -> String {
    let mut line = String::from(START_TAG);
    for tuple in tuples {
        line.push(' ');
        line.push_str(&format_tuple(tuple));
    }
    line.push(' ');
    line.push_str(END_TAG);
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(fields: &[&str], location: Option<&str>) -> String {
        format_tuple(&Tuple::new(fields.iter().copied(), location.map(String::from)))
    }

    #[test]
    fn format_tokens() {
        let problems: [(&str, &[&str], Option<&str>, &str); 12] = [
            ("pair", &["V!x", "+", "n"], None, "#(v!x,+,n)#"),
            ("located", &["V!x", "+", "n"], Some("-"), "#(v!x,+,n,-)#"),
            ("terminal", &["V!y", "!0"], None, "#(v!y,!0)#"),
            ("compound", &["F!", "[o,u]"], Some("nn"), "#(f!,[o,u],nn)#"),
            ("mock", &["??W", "+", "n"], None, "#(*,+,n)#"),
            ("type_wildcard", &["??V", "??O", "n"], None, "#(?v,?o,n)#"),
            ("asterisk", &["V!x", "*", "n"], None, "#(v!x,ast,n)#"),
            ("comma", &["&comma;", "V!y", "n"], None, "#(comma,v!y,n)#"),
            ("less_than", &["<", "N!1", "n"], None, "#(lt,n!1,n)#"),
            ("ampersand", &["&", "V!y", "n"], None, "#(amp,v!y,n)#"),
            ("repetition", &["!REP!", "V!a", "nn"], Some("-"), "#{v!a,nn,-}#"),
            ("cross", &["!REP!", "??V", "o", "u"], None, "#{?v,o,u}#"),
        ];
        for (name, fields, location, expected) in problems {
            assert_eq!(token(fields, location), expected, "{name}");
        }
    }

    #[test]
    fn format_whole_line() {
        let tuples = [
            Tuple::new(["V!x", "+", "n"], None),
            Tuple::new(["+", "V!y", "n"], None),
            Tuple::new(["V!y", "!0"], None),
        ];
        assert_eq!(
            format_line(&tuples),
            "#(start)# #(v!x,+,n)# #(+,v!y,n)# #(v!y,!0)# #(end)#"
        );
        assert_eq!(format_line(std::iter::empty()), "#(start)# #(end)#");
    }
}
