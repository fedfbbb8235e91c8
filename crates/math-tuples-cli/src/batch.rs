//! The line-oriented driver: finds the formulas in the input and prints their tokens.
use std::collections::BTreeMap;
use std::io::{self, BufRead, IsTerminal, Write};

use ariadne::Source;
use regex::Regex;
use tracing::{debug, warn};

use math_tuples::{ConvertError, ERROR_TAG, MathTuples};
use mathml_reader::{Piece, closes_math, math_spans, opens_math_after_close, split_with_context};

use crate::latex;

pub struct Batch<'c> {
    converter: &'c MathTuples,
    /// Captures the document identifier in group 1.
    docid: Option<Regex>,
    context: bool,
    latex: bool,
    formula_id: String,
    /// Lines read since the last document identifier.
    line_num: usize,
    /// The lines of a formula that is not closed yet.
    pending: String,
    in_math: bool,
    unknown_tags: BTreeMap<String, usize>,
    with_color: bool,
}

impl<'c> Batch<'c> {
    pub fn new(converter: &'c MathTuples, docid: Option<Regex>, context: bool, latex: bool) -> Self {
        Batch {
            converter,
            docid,
            context,
            latex,
            formula_id: String::new(),
            line_num: 0,
            pending: String::new(),
            in_math: false,
            unknown_tags: BTreeMap::new(),
            with_color: io::stderr().is_terminal(),
        }
    }

    /// Processes the input line by line.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> io::Result<()> {
        let mut line = String::new();
        while input.read_line(&mut line)? != 0 {
            if self.latex {
                self.process_latex_line(&line, out)?;
            } else {
                self.process_line(&line, out)?;
            }
            line.clear();
        }
        if self.in_math {
            warn!(id = %self.formula_id, "input ends inside a formula");
        }
        out.flush()
    }

    /// The number of formulas rejected for each unknown tag, sorted by tag.
    pub fn unknown_tags(&self) -> &BTreeMap<String, usize> {
        &self.unknown_tags
    }

    /// Returns whether the line carries a document identifier.
    fn track_id(&mut self, line: &str) -> bool {
        self.line_num += 1;
        let line = line.trim_end_matches(['\n', '\r']);
        if let Some(id) = self
            .docid
            .as_ref()
            .and_then(|re| re.captures(line))
            .and_then(|caps| caps.get(1))
        {
            self.formula_id = id.as_str().to_string();
            self.line_num = 0;
            return true;
        }
        false
    }

    fn process_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<()> {
        self.track_id(line);
        let opens = opens_math_after_close(line);
        if self.in_math || opens {
            self.pending.push_str(line);
            self.in_math = true;
        }
        if closes_math(line) && !opens {
            if self.in_math {
                self.in_math = false;
                let text = std::mem::take(&mut self.pending);
                self.convert_text(&text, out)
            } else {
                self.convert_text(line, out)
            }
        } else if self.context && !self.in_math {
            out.write_all(line.as_bytes())
        } else {
            Ok(())
        }
    }

    fn convert_text<W: Write>(&mut self, text: &str, out: &mut W) -> io::Result<()> {
        if self.context {
            for piece in split_with_context(text) {
                match piece {
                    Piece::Text(text) => out.write_all(text.as_bytes())?,
                    Piece::Math(span) => self.convert_formula(span.markup(), out)?,
                }
            }
        } else {
            for span in math_spans(text) {
                self.convert_formula(span.markup(), out)?;
            }
        }
        Ok(())
    }

    fn convert_formula<W: Write>(&mut self, markup: &str, out: &mut W) -> io::Result<()> {
        match self.converter.convert_mathml(markup) {
            Ok(Some(tokens)) => out.write_all(tokens.as_bytes())?,
            Ok(None) => {
                debug!(id = %self.formula_id, line = self.line_num, "formula has no content");
                out.write_all(markup.as_bytes())?;
            }
            Err(err) => {
                self.report(&err, markup);
                write!(out, "{} ", ERROR_TAG)?;
            }
        }
        if !self.context {
            writeln!(out)?;
        }
        Ok(())
    }

    fn process_latex_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<()> {
        let latex = line.trim();
        if self.track_id(line) || latex.is_empty() {
            return Ok(());
        }
        let mathml = match latex::to_mathml(latex) {
            Ok(mathml) => mathml,
            Err(err) => {
                eprintln!("Error in converting LaTeX to MathML: {}: {}", latex, err);
                return writeln!(out, "{} ", ERROR_TAG);
            }
        };
        match math_spans(&mathml).next() {
            Some(span) => self.convert_formula(span.markup(), out),
            None => {
                warn!(latex, "latexmlmath returned no formula");
                writeln!(out, "{} ", ERROR_TAG)
            }
        }
    }

    fn report(&mut self, err: &ConvertError, markup: &str) {
        if let Some(tag) = err.unknown_tag() {
            warn!(id = %self.formula_id, line = self.line_num, tag, "unknown MathML tag");
            *self.unknown_tags.entry(tag.to_string()).or_default() += 1;
        }
        eprintln!(
            "Error in data file or query {}, line {}",
            self.formula_id, self.line_num
        );
        let name = format!("{}:{}", self.formula_id, self.line_num);
        let report = err.to_report(&name, self.with_color);
        if report
            .eprint((name.as_str(), Source::from(markup)))
            .is_err()
        {
            eprintln!("    {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use math_tuples::{NodeKind, Thresholds, TupleConfig};

    use super::*;

    fn pairs_only() -> MathTuples {
        MathTuples::new(TupleConfig {
            thresholds: Thresholds::none().with(NodeKind::SymbolPair, 1),
            ..Default::default()
        })
    }

    fn docno() -> Option<Regex> {
        Some(Regex::new("<DOCNO>([^ <>]*)").unwrap())
    }

    fn run(batch: &mut Batch<'_>, input: &str) -> String {
        let mut out = Vec::new();
        batch.run(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn formulas_on_their_own_lines() {
        let converter = pairs_only();
        let mut batch = Batch::new(&converter, docno(), false, false);
        let input = "<DOCNO>q1\nsome text\n<math><mi>x</mi><mo>+</mo><mi>y</mi></math>\n";
        assert_eq!(
            run(&mut batch, input),
            "#(start)# #(v!x,+,n)# #(+,v!y,n)# #(end)#\n"
        );
        assert_eq!(batch.formula_id, "q1");
        assert_eq!(batch.line_num, 2);
    }

    #[test]
    fn formula_spanning_lines() {
        let converter = pairs_only();
        let mut batch = Batch::new(&converter, docno(), false, false);
        let input = "<p><math>\n<mi>x</mi><mo>+</mo>\n<mi>y</mi></math></p>\n";
        assert_eq!(
            run(&mut batch, input),
            "#(start)# #(v!x,+,n)# #(+,v!y,n)# #(end)#\n"
        );
        assert!(!batch.in_math);
    }

    #[test]
    fn formulas_in_context() {
        let converter = pairs_only();
        let mut batch = Batch::new(&converter, None, true, false);
        let input = "<DOCNO>d7\nLet <m:math><m:mi>a</m:mi><m:mo>=</m:mo><m:mi>b</m:mi></m:math> hold.\nEnd.\n";
        assert_eq!(
            run(&mut batch, input),
            "<DOCNO>d7\nLet #(start)# #(v!a,=,n)# #(=,v!b,n)# #(end)# hold.\nEnd.\n"
        );
        assert_eq!(batch.formula_id, "");
    }

    #[test]
    fn errors_and_empty_formulas() {
        let converter = pairs_only();
        let mut batch = Batch::new(&converter, docno(), false, false);
        let input = "<math><blink/></math>\n<math></math>\n<math><blink>x</blink></math>\n";
        assert_eq!(
            run(&mut batch, input),
            "#(error)# \n<math></math>\n#(error)# \n"
        );
        assert_eq!(batch.unknown_tags().get("blink"), Some(&2));
    }
}
