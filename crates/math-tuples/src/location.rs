//! Encoding of node locations.
//!
//! A location is the string of edge letters on the path from the root (or from the nearest
//! anchor) to a node. Short paths are kept verbatim; longer paths are run-length encoded.
use std::borrow::Cow;
use std::fmt::Write;

/// The location of the root.
pub const ROOT: &str = "-";

/// Paths up to this many edges are not run-length encoded.
const VERBATIM_LIMIT: usize = 5;

/// Encodes a path: `""` becomes `"-"`, short paths stay as they are and longer paths become
/// `<count><letter>` runs, e.g. `"nnnwnn"` becomes `"3n1w2n"`.
pub fn encode(path: &str) -> Cow<'_, str> {
    if path.is_empty() {
        return Cow::Borrowed(ROOT);
    }
    if path.len() <= VERBATIM_LIMIT {
        return Cow::Borrowed(path);
    }
    let mut encoded = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();
    while let Some(ch) = chars.next() {
        let mut count = 1usize;
        while chars.next_if_eq(&ch).is_some() {
            count += 1;
        }
        let _ = write!(encoded, "{count}{ch}");
    }
    Cow::Owned(encoded)
}

/// Inverts [`encode`].
pub fn decode(location: &str) -> String {
    if location == ROOT {
        return String::new();
    }
    let mut decoded = String::with_capacity(location.len());
    let mut count = 0usize;
    for ch in location.chars() {
        if let Some(digit) = ch.to_digit(10) {
            count = count.saturating_mul(10).saturating_add(digit as usize);
        } else {
            for _ in 0..count.max(1) {
                decoded.push(ch);
            }
            count = 0;
        }
    }
    decoded
}

/// The number of edges on an encoded path, without decoding it.
pub fn decoded_len(location: &str) -> usize {
    if location == ROOT {
        return 0;
    }
    let mut len = 0usize;
    let mut count = 0usize;
    for ch in location.chars() {
        if let Some(digit) = ch.to_digit(10) {
            count = count.saturating_mul(10).saturating_add(digit as usize);
        } else {
            len = len.saturating_add(count.max(1));
            count = 0;
        }
    }
    len
}

/// The number of nodes on an encoded path (the root alone counts as one).
#[inline]
pub fn path_nodes(location: &str) -> usize {
    decoded_len(location) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_paths() {
        let problems = [
            ("empty", "", "-"),
            ("short", "n", "n"),
            ("five", "nnnnn", "nnnnn"),
            ("six", "nnnwnn", "3n1w2n"),
            ("mixed", "abcdef", "1a1b1c1d1e1f"),
            ("long_run", "nnnnnnnnnnnn", "12n"),
        ];
        for (name, path, expected) in problems {
            assert_eq!(encode(path), expected, "{name}");
        }
    }

    #[test]
    fn decode_inverts_encode() {
        let paths = [
            "",
            "n",
            "wwe",
            "nnnnn",
            "nnnwnn",
            "abobuw",
            "nnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnn",
            "wewewewewe",
        ];
        for path in paths {
            let encoded = encode(path);
            assert_eq!(decode(&encoded), path, "{encoded}");
            assert_eq!(decoded_len(&encoded), path.len(), "{encoded}");
        }
    }

    #[test]
    fn path_node_counts() {
        assert_eq!(path_nodes("-"), 1);
        assert_eq!(path_nodes("n"), 2);
        assert_eq!(path_nodes("3n1w2n"), 7);
    }
}
