#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;

use crate::element::Element;

/// The two flavours of MathML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Markup {
    /// Layout-oriented markup (`mrow`, `mi`, `msup`, ...).
    #[default]
    #[strum(serialize = "MathML-Presentation")]
    Presentation,
    /// Semantics-oriented markup (`apply`, `ci`, `plus`, ...).
    #[strum(serialize = "MathML-Content")]
    Content,
}

impl Markup {
    /// The value of the `encoding` attribute that marks an annotation of this markup.
    #[inline]
    pub fn encoding(self) -> &'static str {
        self.into()
    }

    #[inline]
    fn other(self) -> Markup {
        match self {
            Markup::Presentation => Markup::Content,
            Markup::Content => Markup::Presentation,
        }
    }
}

fn is_annotation_xml(elem: &Element, markup: Markup) -> bool {
    elem.name() == "annotation-xml" && elem.attribute("encoding") == Some(markup.encoding())
}

/// Extracts the wanted markup from a (possibly parallel) MathML tree.
///
/// Any TeX annotation is removed. An `annotation-xml` of the wanted encoding is returned renamed
/// to `math`; otherwise the annotation of the other encoding is removed and the remaining tree is
/// returned. A tree without annotations is returned only if it is of the wanted markup, judged by
/// the `encoding` attribute of its root.
pub fn isolate(mut root: Element, wanted: Markup) -> Option<Element> {
    root.take_descendant(&|e| {
        e.name() == "annotation" && e.attribute("encoding") == Some("application/x-tex")
    });

    if let Some(mut markup) = root.take_descendant(&|e| is_annotation_xml(e, wanted)) {
        markup.rename("math");
        return Some(markup);
    }
    let other = wanted.other();
    if root.take_descendant(&|e| is_annotation_xml(e, other)).is_none() {
        let root_is_content = root.attribute("encoding") == Some(Markup::Content.encoding());
        if root_is_content != (wanted == Markup::Content) {
            return None;
        }
    }
    Some(root)
}
