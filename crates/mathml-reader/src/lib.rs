//! Internal library for the `math-tuples` crate for reading MathML markup.
//!
//! This library finds `<math>` fragments in document text, parses a fragment into a small owned
//! element tree, and isolates the Presentation or Content part of a combined (parallel) markup.
//!
//! # Example
//!
//! ```rust
//! use math_tuples_reader_internal::{Markup, isolate, math_spans, parse};
//!
//! let text = r#"<p>Let <math id="m1"><mi>x</mi><mo>+</mo><mi>y</mi></math> be given.</p>"#;
//! let span = math_spans(text).next().unwrap();
//! assert_eq!(span.id, Some("m1"));
//!
//! let root = parse(span.markup()).unwrap();
//! let root = isolate(root, Markup::Presentation).unwrap();
//! assert_eq!(root.name(), "math");
//! assert_eq!(root.children().len(), 3);
//! assert_eq!(root.children()[1].text(), "+");
//! ```
mod element;
mod error;
mod extract;
mod isolate;
mod parse;

pub use element::Element;
pub use error::{ParseErrKind, ParseError};
pub use extract::{MathSpan, MathSpans, Piece, closes_math, math_spans, opens_math_after_close, split_with_context};
pub use isolate::{Markup, isolate};
pub use parse::{MAX_DEPTH, parse};
