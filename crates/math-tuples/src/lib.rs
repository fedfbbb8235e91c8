//! Convert MathML formulas into tuple features for math-aware search.
//!
//! A formula is first normalized into a [`SymbolTree`]: a tree of typed symbols connected by
//! labeled layout edges (Presentation MathML) or operator edges (Content MathML). The tree is then
//! walked once to produce feature tuples (pairs of symbols with the path between them, compound
//! nodes, terminal symbols, repeated symbols, ...), which are finally written as index tokens.
//!
//! # Usage
//!
//! The main struct of this library is [`MathTuples`]. Create an instance with a [`TupleConfig`]
//! and call one of the convert functions.
//!
//! ```rust
//! use math_tuples::{MathTuples, NodeKind, Thresholds, TupleConfig};
//!
//! let config = TupleConfig {
//!     thresholds: Thresholds::none()
//!         .with(NodeKind::SymbolPair, 1)
//!         .with(NodeKind::Terminal, 1),
//!     ..Default::default()
//! };
//! let converter = MathTuples::new(config);
//! let tokens = converter
//!     .convert_mathml("<math><mi>x</mi><mo>+</mo><mi>y</mi></math>")
//!     .unwrap();
//! assert_eq!(
//!     tokens.as_deref(),
//!     Some("#(start)# #(v!x,+,n)# #(+,v!y,n)# #(v!y,!0)# #(end)#")
//! );
//! ```
//!
//! # Features
//!
//! - `serde`: With this feature, `TupleConfig` implements serde's `Deserialize` and `Serialize`.
//! - `ariadne`: With this feature, errors can be rendered as [`ariadne`] reports.
//!
mod config;
mod content;
mod error;
mod expand;
mod extract;
mod format;
pub mod location;
mod normalize;
mod operators;
mod tag;
mod tree;
mod tuple;

use rustc_hash::FxHashSet;
use tracing::debug;

use mathml_reader::{Element, isolate, parse};

pub use mathml_reader::Markup;

pub use self::config::{DEFAULT_ANCHORS, INFINITE_DEPTH, Inclusion, Thresholds, TupleConfig, Window};
pub use self::error::{ConvertErrKind, ConvertError};
pub use self::expand::{expand_locations, expand_wildcards};
pub use self::extract::MAX_EOL_HEIGHT;
pub use self::format::{END_TAG, ERROR_TAG, START_TAG, format_line, format_tuple};
pub use self::tag::{InvalidTypeLetter, SymbolTypes};
pub use self::tree::{Edge, NodeId, SymbolTree, TreeStringError};
pub use self::tuple::{NodeKind, REP_MARKER, Tuple, classify};

use self::extract::Extractor;

/// The maximum nesting depth of elements the normalizer descends into.
pub const MAX_DEPTH: usize = 256;

/// The maximum number of edges on the path of a location.
pub const MAX_PATH_LENGTH: usize = 1024;

/// A converter from MathML formulas to tuple tokens.
#[derive(Debug, Clone)]
pub struct MathTuples {
    config: TupleConfig,
    anchors: FxHashSet<String>,
}

impl MathTuples {
    /// Create a new converter with the given configuration.
    pub fn new(config: TupleConfig) -> Self {
        let anchors = config.anchors.iter().cloned().collect();
        MathTuples { config, anchors }
    }

    #[inline]
    pub fn config(&self) -> &TupleConfig {
        &self.config
    }

    /// Normalize a `math` element of either markup into a symbol tree.
    ///
    /// Elements that belong to neither Presentation nor Content MathML are an error.
    pub fn symbol_tree(&self, math: &Element) -> Result<SymbolTree, ConvertError> {
        normalize::symbol_tree(math)
    }

    /// Generate the tuples of a symbol tree, with wildcards and locations expanded.
    pub fn tuples(&self, tree: &SymbolTree) -> Result<Vec<Tuple>, ConvertError> {
        let raw = Extractor::new(&self.config, &self.anchors).extract(tree)?;
        let mut expanded = Vec::with_capacity(raw.len());
        for tuple in raw {
            expand_wildcards(tuple, &self.config, &mut expanded);
        }
        let mut tuples = Vec::with_capacity(expanded.len() * 2);
        for tuple in expanded {
            expand_locations(tuple, &self.config.thresholds, &mut tuples);
        }
        Ok(tuples)
    }

    /// Convert a parsed MathML formula into a line of tokens.
    ///
    /// Returns `None` if the formula has no part in the configured markup, or if that part
    /// contains no symbols.
    pub fn convert_element(&self, root: Element) -> Result<Option<String>, Box<ConvertError>> {
        let Some(math) = isolate(root, self.config.markup) else {
            debug!(markup = ?self.config.markup, "formula has no part in the wanted markup");
            return Ok(None);
        };
        let tree = self.symbol_tree(&math)?;
        if tree.root().is_none() {
            return Ok(None);
        }
        debug!(tree = %tree, height = tree.height(), "normalized formula");
        let tuples = self.tuples(&tree)?;
        debug!(count = tuples.len(), "generated tuples");
        Ok(Some(format_line(&tuples)))
    }

    /// Convert MathML source text into a line of tokens.
    ///
    /// ```rust
    /// use math_tuples::{Markup, MathTuples, TupleConfig};
    ///
    /// let converter = MathTuples::new(TupleConfig {
    ///     markup: Markup::Content,
    ///     ..Default::default()
    /// });
    /// let mathml = r#"<math><semantics>
    ///   <mrow><mi>a</mi><mo>+</mo><mi>b</mi></mrow>
    ///   <annotation-xml encoding="MathML-Content">
    ///     <apply><plus/><ci>a</ci><ci>b</ci></apply>
    ///   </annotation-xml>
    /// </semantics></math>"#;
    /// let tokens = converter.convert_mathml(mathml).unwrap().unwrap();
    /// assert!(tokens.contains("#(+,v!a,w)#"));
    /// ```
    pub fn convert_mathml(&self, source: &str) -> Result<Option<String>, Box<ConvertError>> {
        let root = parse(source).map_err(ConvertError::from)?;
        self.convert_element(root)
    }
}
