use std::ops::Range;
use std::sync::LazyLock;

use memchr::memmem;
use regex::Regex;

/// Opening `<math>` tag with an optional namespace prefix. Group 1 is the qualified name.
static MATH_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<((?:[^>=\s:/]*:)?[Mm]ath)(?:\s[^>]*)?>").expect("valid regex")
});

static MATH_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</(?:[^>=\s:]*:)?[Mm]ath>").expect("valid regex"));

static MATH_OPEN_LOOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:[^>=\s:]*:)?[Mm]ath[\s>]").expect("valid regex"));

static ID_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sid\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

/// A `<math>...</math>` fragment found in document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSpan<'source> {
    /// Byte range of the whole fragment, including its opening and closing tags.
    pub range: Range<usize>,
    /// The value of the `id` attribute of the opening tag, if present.
    pub id: Option<&'source str>,
    markup: &'source str,
}

impl<'source> MathSpan<'source> {
    #[inline]
    pub fn markup(&self) -> &'source str {
        self.markup
    }
}

/// Iterator over the math fragments of a text. See [`math_spans`].
pub struct MathSpans<'source> {
    text: &'source str,
    pos: usize,
}

/// Finds all `<math>...</math>` fragments in `text`.
///
/// The closing tag must use the same qualified name as the opening tag, so `<m:math>` is closed
/// by `</m:math>`. A fragment whose closing tag is missing ends the search.
pub fn math_spans(text: &str) -> MathSpans<'_> {
    MathSpans { text, pos: 0 }
}

impl<'source> Iterator for MathSpans<'source> {
    type Item = MathSpan<'source>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        let caps = MATH_OPEN.captures_at(text, self.pos)?;
        let open = caps.get(0)?;
        let qname = caps.get(1)?.as_str();
        let closing = format!("</{qname}>");
        let Some(offset) = memmem::find(&text.as_bytes()[open.end()..], closing.as_bytes()) else {
            self.pos = text.len();
            return None;
        };
        let end = open.end() + offset + closing.len();
        self.pos = end;
        let id = ID_ATTR
            .captures(open.as_str())
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str());
        Some(MathSpan {
            range: open.start()..end,
            id,
            markup: &text[open.start()..end],
        })
    }
}

/// A piece of a document: either surrounding text or a math fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'source> {
    Text(&'source str),
    Math(MathSpan<'source>),
}

/// Splits `text` into alternating text and math pieces.
///
/// The result always starts and ends with a (possibly empty) text piece.
pub fn split_with_context(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for span in math_spans(text) {
        pieces.push(Piece::Text(&text[last..span.range.start]));
        last = span.range.end;
        pieces.push(Piece::Math(span));
    }
    pieces.push(Piece::Text(&text[last..]));
    pieces
}

/// Whether `line` contains a closing `</math>` tag.
pub fn closes_math(line: &str) -> bool {
    MATH_CLOSE.is_match(line)
}

/// Whether a `<math>` tag is opened after the last closing `</math>` tag of `line`.
///
/// Such a line leaves a formula open that continues on the following lines.
pub fn opens_math_after_close(line: &str) -> bool {
    let tail = match MATH_CLOSE.find_iter(line).last() {
        Some(close) => &line[close.end()..],
        None => line,
    };
    MATH_OPEN_LOOSE.is_match(tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_with_ids() {
        let text = r#"a <math id="m1"><mi>x</mi></math> b <m:math xml:id="no" id='m2'><m:mi>y</m:mi></m:math> c"#;
        let spans: Vec<MathSpan> = math_spans(text).collect();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].id, Some("m1"));
        assert_eq!(spans[0].markup(), r#"<math id="m1"><mi>x</mi></math>"#);
        assert_eq!(spans[1].id, Some("m2"));
        assert!(spans[1].markup().ends_with("</m:math>"));
    }

    #[test]
    fn spans_without_close() {
        let text = "<math><mi>x</mi>";
        assert_eq!(math_spans(text).count(), 0);
    }

    #[test]
    fn context_pieces() {
        let text = "before <math><mi>x</mi></math> after";
        let pieces = split_with_context(text);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0], Piece::Text("before "));
        assert!(matches!(pieces[1], Piece::Math(_)));
        assert_eq!(pieces[2], Piece::Text(" after"));
    }

    #[test]
    fn line_boundaries() {
        assert!(opens_math_after_close("text <math display=\"block\">"));
        assert!(!opens_math_after_close("<math><mi>x</mi></math> done"));
        assert!(opens_math_after_close("<mi>x</mi></math> then <m:math>"));
        assert!(closes_math("<mi>x</mi></m:math>"));
        assert!(!closes_math("<mathematics>"));
        assert!(!opens_math_after_close("<mathematics>"));
    }
}
