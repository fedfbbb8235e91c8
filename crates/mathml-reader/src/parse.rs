use std::ops::Range;

use quick_xml::Reader;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};

use crate::element::Element;
use crate::error::{ParseErrKind, ParseError};

/// The maximum nesting depth of elements accepted by [`parse`].
pub const MAX_DEPTH: usize = 256;

/// Parses one MathML fragment into an [`Element`] tree.
///
/// The element stack is kept explicitly, so deeply nested input fails with
/// [`ParseErrKind::DepthLimitExceeded`] instead of exhausting the call stack.
pub fn parse(source: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let start = position(reader.buffer_position());
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                let at = position(reader.error_position());
                return Err(ParseError(
                    at..at,
                    ParseErrKind::Malformed(e.to_string().into()),
                ));
            }
        };
        let end = position(reader.buffer_position());
        match event {
            Event::Start(e) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(ParseError(start..end, ParseErrKind::DepthLimitExceeded));
                }
                stack.push(open_element(&e, start..end)?);
            }
            Event::Empty(e) => {
                let elem = open_element(&e, start..end)?;
                attach(&mut stack, &mut root, elem)?;
            }
            Event::End(e) => {
                let qname = e.local_name();
                let got = local_name(qname.as_ref(), start..end)?;
                let Some(mut elem) = stack.pop() else {
                    return Err(ParseError(start..end, ParseErrKind::UnmatchedClose(got.into())));
                };
                if *elem.name != *got {
                    return Err(ParseError(
                        start..end,
                        ParseErrKind::MismatchedClose {
                            expected: elem.name,
                            got: got.into(),
                        },
                    ));
                }
                elem.span.end = end;
                attach(&mut stack, &mut root, elem)?;
            }
            Event::Text(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(utf8(&e, start..end)?);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(utf8(&e, start..end)?);
                }
            }
            Event::GeneralRef(e) => {
                let name = utf8(&e, start..end)?;
                let Some(top) = stack.last_mut() else {
                    continue;
                };
                if let Some(num) = name.strip_prefix('#') {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    };
                    match code.and_then(char::from_u32) {
                        Some(ch) => top.text.push(ch),
                        None => {
                            return Err(ParseError(
                                start..end,
                                ParseErrKind::UnknownEntity(name.into()),
                            ));
                        }
                    }
                } else if let Some(resolved) = resolve_html5_entity(name) {
                    top.text.push_str(resolved);
                } else {
                    return Err(ParseError(
                        start..end,
                        ParseErrKind::UnknownEntity(name.into()),
                    ));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError(
            open.span.start..source.len(),
            ParseErrKind::UnclosedElement(open.name.clone()),
        ));
    }
    root.ok_or(ParseError(0..source.len(), ParseErrKind::NoRoot))
}

fn open_element(e: &BytesStart<'_>, span: Range<usize>) -> Result<Element, ParseError> {
    let qname = e.local_name();
    let mut elem = Element::new(local_name(qname.as_ref(), span.clone())?);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| {
            ParseError(span.clone(), ParseErrKind::Malformed(err.to_string().into()))
        })?;
        let key_name = attr.key.local_name();
        let key = local_name(key_name.as_ref(), span.clone())?;
        let raw = utf8(&attr.value, span.clone())?;
        let value = unescape_with(raw, resolve_html5_entity).map_err(|err| {
            ParseError(span.clone(), ParseErrKind::Malformed(err.to_string().into()))
        })?;
        elem.attributes.push((key.into(), value.as_ref().into()));
    }
    elem.span = span;
    Ok(elem)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    elem: Element,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(elem);
    } else if root.is_none() {
        *root = Some(elem);
    } else {
        return Err(ParseError(elem.span, ParseErrKind::MultipleRoots));
    }
    Ok(())
}

/// Decodes a local name. `Math` is accepted as an alias of `math`.
fn local_name(bytes: &[u8], span: Range<usize>) -> Result<&str, ParseError> {
    let name = utf8(bytes, span)?;
    Ok(if name == "Math" { "math" } else { name })
}

fn utf8(bytes: &[u8], span: Range<usize>) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes)
        .map_err(|err| ParseError(span, ParseErrKind::Malformed(err.to_string().into())))
}

#[inline]
fn position(pos: impl TryInto<usize>) -> usize {
    pos.try_into().unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic() {
        let root = parse(r#"<math display="block"><mi>x</mi><mo>+</mo><mn>2</mn></math>"#).unwrap();
        assert_eq!(root.name(), "math");
        assert_eq!(root.attribute("display"), Some("block"));
        let texts: Vec<&str> = root.children().iter().map(Element::text).collect();
        assert_eq!(texts, ["x", "+", "2"]);
    }

    #[test]
    fn parse_namespaces_are_dropped() {
        let root = parse(r#"<m:math xmlns:m="http://www.w3.org/1998/Math/MathML"><m:mi>x</m:mi><mws:qvar name="a"/></m:math>"#)
            .unwrap();
        assert_eq!(root.name(), "math");
        assert_eq!(root.children()[0].name(), "mi");
        assert_eq!(root.children()[1].name(), "qvar");
        assert_eq!(root.children()[1].attribute("name"), Some("a"));
    }

    #[test]
    fn parse_entities() {
        let root = parse("<math><mo>&InvisibleTimes;</mo><mo>&lt;</mo><mi>&#x3B1;</mi><mi>&#946;</mi></math>")
            .unwrap();
        let texts: Vec<&str> = root.children().iter().map(Element::text).collect();
        assert_eq!(texts, ["\u{2062}", "<", "α", "β"]);
    }

    #[test]
    fn parse_span() {
        let source = "<math><mi>x</mi></math>";
        let root = parse(source).unwrap();
        assert_eq!(root.span(), 0..source.len());
        assert_eq!(&source[root.children()[0].span()], "<mi>x</mi>");
    }

    #[test]
    fn parse_errors() {
        let problems = [
            ("unclosed", "<math><mi>x</mi>"),
            ("mismatched", "<math><mi>x</mo></math>"),
            ("no_root", "   "),
            ("two_roots", "<mi>x</mi><mi>y</mi>"),
            ("unknown_entity", "<math><mi>&notanentity;</mi></math>"),
        ];
        for (name, problem) in problems {
            assert!(parse(problem).is_err(), "{name} should fail");
        }
    }

    #[test]
    fn parse_depth_limit() {
        let source = "<mrow>".repeat(MAX_DEPTH + 1) + &"</mrow>".repeat(MAX_DEPTH + 1);
        let err = parse(&source).unwrap_err();
        assert_eq!(err.1, ParseErrKind::DepthLimitExceeded);
    }
}
