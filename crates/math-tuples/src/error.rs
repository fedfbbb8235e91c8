use std::fmt;
use std::ops::Range;

use mathml_reader::{ParseErrKind, ParseError};

/// Represents an error that occurred while converting a formula into tuples.
///
/// The range points into the MathML source of the formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError(pub Range<usize>, pub ConvertErrKind);

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConvertErrKind {
    /// The markup could not be read.
    Markup(ParseErrKind),
    /// An element that is neither Presentation nor Content MathML.
    UnknownTag(Box<str>),
    DepthLimitExceeded,
    PathLimitExceeded,
}

impl ConvertErrKind {
    /// Returns the error message as a string.
    pub fn string(&self) -> String {
        match self {
            ConvertErrKind::Markup(kind) => kind.string(),
            ConvertErrKind::UnknownTag(name) => "Unknown MathML tag \"".to_string() + name + "\".",
            ConvertErrKind::DepthLimitExceeded => {
                "Formula is nested too deeply. Please simplify the markup.".to_string()
            }
            ConvertErrKind::PathLimitExceeded => {
                "Location path exceeds the maximum length.".to_string()
            }
        }
    }
}

impl ConvertError {
    /// The name of the unknown element that caused this error, if that was the cause.
    pub fn unknown_tag(&self) -> Option<&str> {
        match &self.1 {
            ConvertErrKind::UnknownTag(name) => Some(&**name),
            _ => None,
        }
    }

    pub fn error_message(&self) -> String {
        self.1.string()
    }
}

impl From<ParseError> for ConvertError {
    fn from(err: ParseError) -> Self {
        ConvertError(err.0, ConvertErrKind::Markup(err.1))
    }
}

#[cfg(feature = "ariadne")]
impl ConvertError {
    /// Convert this error into an [`ariadne::Report`] for pretty-printing.
    pub fn to_report<'name>(
        &self,
        source_name: &'name str,
        with_color: bool,
    ) -> ariadne::Report<'static, (&'name str, Range<usize>)> {
        use ariadne::{Label, Report, ReportKind};

        if let ConvertErrKind::Markup(kind) = &self.1 {
            return ParseError(self.0.clone(), kind.clone()).to_report(source_name, with_color);
        }
        let label_msg = match &self.1 {
            ConvertErrKind::UnknownTag(_) => "unknown element",
            ConvertErrKind::DepthLimitExceeded | ConvertErrKind::PathLimitExceeded => {
                "limit exceeded"
            }
            ConvertErrKind::Markup(_) => "malformed here",
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

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.0.start, self.1.string())
    }
}

impl std::error::Error for ConvertError {}
