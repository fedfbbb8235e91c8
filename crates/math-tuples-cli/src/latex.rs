//! Conversion of LaTeX queries to MathML with `latexmlmath`.
use std::fmt;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Query variables such as `?x` in LaTeX input.
static QUERY_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?([A-Za-z][A-Za-z0-9]*)").expect("valid regex"));

/// The identifiers `latexmlmath` produces for protected query variables.
static PROTECTED_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<mi[^>]*>qvar_([^<]*)</mi>").expect("valid regex"));

#[derive(Debug)]
pub enum LatexError {
    /// `latexmlmath` could not be started or fed.
    Spawn(io::Error),
    /// `latexmlmath` produced no output.
    Failed(String),
}

impl fmt::Display for LatexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatexError::Spawn(err) => write!(f, "could not run latexmlmath: {}", err),
            LatexError::Failed(msg) => write!(f, "latexmlmath failed: {}", msg.trim()),
        }
    }
}

impl std::error::Error for LatexError {}

impl From<io::Error> for LatexError {
    fn from(err: io::Error) -> Self {
        LatexError::Spawn(err)
    }
}

/// Converts one LaTeX formula to Presentation MathML.
pub fn to_mathml(latex: &str) -> Result<String, LatexError> {
    let prepared = protect(latex);
    debug!(latex = %prepared, "running latexmlmath");
    let mut child = Command::new("latexmlmath")
        .args([
            "--pmml=-",
            "--preload=amsmath",
            "--preload=amsfonts",
            "-",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(prepared.as_bytes())?;
    }
    let output = child.wait_with_output()?;
    if output.stdout.is_empty() {
        return Err(LatexError::Failed(
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }
    Ok(restore(&String::from_utf8_lossy(&output.stdout)))
}

/// Drops unescaped `%` and turns query variables into identifiers that survive the conversion.
fn protect(latex: &str) -> String {
    let bytes = latex.as_bytes();
    let mut cleaned = String::with_capacity(latex.len());
    let mut last = 0;
    for pos in memchr::memchr_iter(b'%', bytes) {
        if pos > 0 && bytes[pos - 1] == b'\\' {
            continue;
        }
        cleaned.push_str(&latex[last..pos]);
        last = pos + 1;
    }
    cleaned.push_str(&latex[last..]);
    QUERY_VARIABLE
        .replace_all(&cleaned, r"\mathit{qvar\_$1}")
        .into_owned()
}

/// Turns protected identifiers back into query variables.
fn restore(mathml: &str) -> String {
    PROTECTED_VARIABLE
        .replace_all(mathml, r#"<mws:qvar name="$1"/>"#)
        .into_owned()
}
