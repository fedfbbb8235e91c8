use std::fmt;
use std::ops::Range;

/// Represents an error that occurred while parsing MathML markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub Range<usize>, pub ParseErrKind);

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrKind {
    /// The XML reader rejected the input.
    Malformed(Box<str>),
    UnknownEntity(Box<str>),
    UnmatchedClose(Box<str>),
    MismatchedClose { expected: Box<str>, got: Box<str> },
    UnclosedElement(Box<str>),
    MultipleRoots,
    NoRoot,
    DepthLimitExceeded,
}

impl ParseErrKind {
    /// Returns the error message as a string.
    pub fn string(&self) -> String {
        match self {
            ParseErrKind::Malformed(msg) => "Malformed markup: ".to_string() + msg,
            ParseErrKind::UnknownEntity(name) => "Unknown entity \"&".to_string() + name + ";\".",
            ParseErrKind::UnmatchedClose(name) => {
                "Unmatched closing tag \"</".to_string() + name + ">\"."
            }
            ParseErrKind::MismatchedClose { expected, got } => {
                "Expected \"</".to_string() + expected + ">\", but got \"</" + got + ">\"."
            }
            ParseErrKind::UnclosedElement(name) => {
                "Element \"<".to_string() + name + ">\" is never closed."
            }
            ParseErrKind::MultipleRoots => "More than one root element.".to_string(),
            ParseErrKind::NoRoot => "No root element found.".to_string(),
            ParseErrKind::DepthLimitExceeded => {
                "Element nesting is too deep. Please simplify the markup.".to_string()
            }
        }
    }
}

#[cfg(feature = "ariadne")]
impl ParseError {
    /// Convert this error into an [`ariadne::Report`] for pretty-printing.
    pub fn to_report<'name>(
        &self,
        source_name: &'name str,
        with_color: bool,
    ) -> ariadne::Report<'static, (&'name str, Range<usize>)> {
        use ariadne::{Label, Report, ReportKind};

        let label_msg = match &self.1 {
            ParseErrKind::Malformed(_) => "malformed here".to_string(),
            ParseErrKind::UnknownEntity(_) => "unknown entity".to_string(),
            ParseErrKind::UnmatchedClose(_) => "nothing to close".to_string(),
            ParseErrKind::MismatchedClose { expected, .. } => format!("expected \"</{expected}>\""),
            ParseErrKind::UnclosedElement(_) => "opened here".to_string(),
            ParseErrKind::MultipleRoots => "second root element".to_string(),
            ParseErrKind::NoRoot => "no element".to_string(),
            ParseErrKind::DepthLimitExceeded => "limit exceeded".to_string(),
        };

        let mut config = ariadne::Config::default().with_index_type(ariadne::IndexType::Byte);
        if !with_color {
            config = config.with_color(false);
        }
        Report::build(ReportKind::Error, (source_name, self.0.start..self.0.start))
            .with_config(config)
            .with_message(self.1.string())
            .with_label(Label::new((source_name, self.0.clone())).with_message(label_msg))
            .finish()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.0.start, self.1.string())
    }
}

impl std::error::Error for ParseError {}
