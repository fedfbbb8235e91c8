use std::ops::Range;

/// An element of a parsed MathML fragment.
///
/// Names are local names (any namespace prefix is dropped), attribute values are unescaped and
/// `text` is the concatenation of all text directly inside the element, with entities resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub(crate) name: Box<str>,
    pub(crate) attributes: Vec<(Box<str>, Box<str>)>,
    pub(crate) text: String,
    pub(crate) children: Vec<Element>,
    pub(crate) span: Range<usize>,
}

impl Element {
    /// Creates an element without attributes, text or children.
    pub fn new(name: &str) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text.push_str(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up an attribute by its local name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// The byte range of this element in the parsed source.
    ///
    /// Elements built by hand have an empty span.
    #[inline]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub(crate) fn rename(&mut self, name: &str) {
        self.name = name.into();
    }

    /// Removes the first descendant (in document order) that satisfies `pred` and returns it.
    pub(crate) fn take_descendant(&mut self, pred: &impl Fn(&Element) -> bool) -> Option<Element> {
        for idx in 0..self.children.len() {
            if pred(&self.children[idx]) {
                return Some(self.children.remove(idx));
            }
            if let Some(found) = self.children[idx].take_descendant(pred) {
                return Some(found);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_descendant_in_document_order() {
        let mut root = Element::new("math")
            .with_child(
                Element::new("semantics")
                    .with_child(Element::new("mi").with_text("x"))
                    .with_child(Element::new("annotation").with_text("first")),
            )
            .with_child(Element::new("annotation").with_text("second"));
        let found = root.take_descendant(&|e| e.name() == "annotation");
        assert_eq!(found.map(|e| e.text), Some("first".to_string()));
        assert_eq!(root.children()[0].children().len(), 1);
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn attribute_lookup() {
        let elem = Element::new("mfenced")
            .with_attribute("open", "[")
            .with_attribute("close", "]");
        assert_eq!(elem.attribute("open"), Some("["));
        assert_eq!(elem.attribute("separators"), None);
    }
}
