use std::{
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use clap::{Parser, ValueEnum};
use regex::Regex;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use math_tuples::{
    DEFAULT_ANCHORS, Inclusion, Markup, MathTuples, NodeKind, SymbolTypes, TupleConfig, Window,
};

mod batch;
mod config_file;
mod latex;

use batch::Batch;
use config_file::{Config, ConfigError, load_config_file};

const AFTER_HELP: &str = "\
Tuple inclusion (-S -R -T -E -C -L -A -D):
  i <= 0       no tuples of this kind
  0 < i < 99   tuples of this kind, also with their location when the path has fewer than i nodes
  i >= 99      tuples of this kind, all also with their location

Symbol types (--dups, --wild-dups): a subset of VNOMFRTW, for V(ariables), N(umbers),
O(perators), M(atrices and parenthesized groups), F(ractions), R(adicals), T(ext) and
W(ildcards or symbols of unknown type).

Defaults: W=1, S=8, R=0, T=8, E=0, C=8, L=0, A=0, D=8, anchors enabled, all symbol types
for --dups and --wild-dups.";

/// Converts MathML formulas to math tuples
#[derive(Parser, Debug)]
#[command(version, about = "Converts MathML formulas to math tuples", long_about = None, after_help = AFTER_HELP)]
struct Args {
    /// The size of the window for symbol pairs (0 or at least 99 is unbounded)
    #[arg(short = 'W', long, value_name = "SIZE")]
    window: Option<u32>,

    /// Include Symbol pairs and/or their locations
    #[arg(short = 'S', long, value_name = "N", allow_negative_numbers = true)]
    symbol_pairs: Option<i32>,

    /// Include Relationship (edge) pairs and/or their locations
    #[arg(short = 'R', long, value_name = "N", allow_negative_numbers = true)]
    edge_pairs: Option<i32>,

    /// Include Terminal symbols and/or their locations
    #[arg(short = 'T', long, value_name = "N", allow_negative_numbers = true)]
    terminals: Option<i32>,

    /// Include End-of-line symbols and/or their locations
    #[arg(short = 'E', long, value_name = "N", allow_negative_numbers = true)]
    eol: Option<i32>,

    /// Include Compound symbols and/or their locations
    #[arg(short = 'C', long, value_name = "N", allow_negative_numbers = true)]
    compounds: Option<i32>,

    /// Include Long pairs beyond the window and/or their locations
    #[arg(short = 'L', long, value_name = "N", allow_negative_numbers = true)]
    long_pairs: Option<i32>,

    /// Shorten long pairs to their locations (Abbreviated)
    #[arg(short = 'A', long, value_name = "N", allow_negative_numbers = true)]
    abbreviated: Option<i32>,

    /// Include Duplicate symbols and/or their locations
    #[arg(short = 'D', long, value_name = "N", allow_negative_numbers = true)]
    duplicates: Option<i32>,

    /// The string preceding each document identifier; "" disables identifier tracking
    #[arg(long, value_name = "PATTERN")]
    docid: Option<String>,

    /// Enable or disable relational operators as location anchors
    #[arg(short, long, value_name = "MODE")]
    anchors: Option<AnchorMode>,

    /// Copy the text around each formula to the output
    #[arg(short, long)]
    context: bool,

    /// Symbol types whose repetitions are recorded as they are
    #[arg(short, long, value_name = "TYPES", value_parser = SymbolTypes::from_letters)]
    dups: Option<SymbolTypes>,

    /// Symbol types whose repetitions are recorded as type wildcards
    #[arg(short, long, value_name = "TYPES", value_parser = SymbolTypes::from_letters)]
    wild_dups: Option<SymbolTypes>,

    /// Add type-wildcard synonyms to the tuples (for indexing only)
    #[arg(short, long)]
    synonyms: bool,

    /// Convert the Content MathML part of each formula
    #[arg(long)]
    content: bool,

    /// Treat each input line as a LaTeX formula and convert it with latexmlmath
    #[arg(long, conflicts_with = "context")]
    latex: bool,

    /// Read settings from a TOML file; flags override them
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log each formula's symbol tree and tuple count
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AnchorMode {
    #[value(name = "e", alias = "enable")]
    Enable,
    #[value(name = "d", alias = "disable")]
    Disable,
}

impl Args {
    /// Overrides the settings of `config` with the flags that were given.
    fn apply(&self, config: &mut Config) {
        let tuples = &mut config.tuples;
        if let Some(size) = self.window {
            tuples.window = Window::from(size);
        }
        let inclusions = [
            (NodeKind::SymbolPair, self.symbol_pairs),
            (NodeKind::EdgePair, self.edge_pairs),
            (NodeKind::Terminal, self.terminals),
            (NodeKind::EndOfLine, self.eol),
            (NodeKind::Compound, self.compounds),
            (NodeKind::Long, self.long_pairs),
            (NodeKind::Abbreviated, self.abbreviated),
            (NodeKind::Duplicate, self.duplicates),
        ];
        for (kind, value) in inclusions {
            if let Some(value) = value {
                tuples.thresholds.set(kind, Inclusion::from(value));
            }
        }
        match self.anchors {
            Some(AnchorMode::Enable) => {
                tuples.anchors = DEFAULT_ANCHORS.iter().map(ToString::to_string).collect();
            }
            Some(AnchorMode::Disable) => tuples.anchors.clear(),
            None => {}
        }
        if let Some(dups) = self.dups {
            tuples.dups = dups;
        }
        if let Some(wild_dups) = self.wild_dups {
            tuples.wild_dups = wild_dups;
        }
        if self.synonyms {
            tuples.synonyms = true;
        }
        if self.content {
            tuples.markup = Markup::Content;
        }
        if let Some(ref docid) = self.docid {
            config.docid.clone_from(docid);
        }
        if self.context {
            config.context = true;
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match args.config {
        Some(ref path) => load_config_file(path).unwrap_or_else(|e| exit_config_error(e, path)),
        None => Config::default(),
    };
    args.apply(&mut config);
    rationalize_duplicates(&mut config.tuples);

    let docid = if config.docid.is_empty() {
        None
    } else {
        match Regex::new(&format!("{}([^ <>]*)", config.docid)) {
            Ok(re) => Some(re),
            Err(e) => {
                eprintln!("Invalid document identifier pattern: {}", e);
                std::process::exit(2);
            }
        }
    };

    let converter = MathTuples::new(config.tuples);
    let mut batch = Batch::new(&converter, docid, config.context, args.latex);
    let mut out = BufWriter::new(io::stdout().lock());
    if let Err(e) = batch.run(io::stdin().lock(), &mut out) {
        exit_io_error(e);
    }

    let unknown_tags = batch.unknown_tags();
    if !unknown_tags.is_empty() {
        eprintln!("Formulas rejected for unknown MathML tags:");
        for (tag, count) in unknown_tags {
            eprintln!("    {:>6}  <{}>", count, tag);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Repetition tuples without any symbol types to record fall back to wildcards for all types.
fn rationalize_duplicates(config: &mut TupleConfig) {
    if config.thresholds.duplicates.is_included()
        && config.dups.is_empty()
        && config.wild_dups.is_empty()
    {
        warn!("duplicates requested, but no symbol types given; using wildcards for all types");
        config.wild_dups = SymbolTypes::all();
    }
}

fn exit_config_error(e: ConfigError, path: &Path) -> ! {
    eprintln!("Error in configuration file '{}': {}", path.display(), e);
    std::process::exit(2);
}

fn exit_io_error(e: io::Error) -> ! {
    eprintln!("IO Error: {}", e);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "mathtuples", "-W", "99", "-S", "2", "-T", "-1", "-a", "d", "-d", "VN", "--content",
            "--docid", "<DOC>",
        ]);
        let mut config = Config::default();
        args.apply(&mut config);
        let tuples = &config.tuples;
        assert_eq!(tuples.window, Window::Unbounded);
        assert_eq!(tuples.thresholds.symbol_pairs, Inclusion::Limit(2));
        assert_eq!(tuples.thresholds.terminals, Inclusion::Excluded);
        assert_eq!(tuples.thresholds.compounds, Inclusion::Limit(8));
        assert!(tuples.anchors.is_empty());
        assert_eq!(tuples.dups, SymbolTypes::VARIABLE | SymbolTypes::NUMBER);
        assert_eq!(tuples.wild_dups, SymbolTypes::all());
        assert_eq!(tuples.markup, Markup::Content);
        assert_eq!(config.docid, "<DOC>");
    }

    #[test]
    fn invalid_symbol_types() {
        assert!(Args::try_parse_from(["mathtuples", "--dups", "VQ"]).is_err());
    }

    #[test]
    fn duplicates_without_types() {
        let args = Args::parse_from(["mathtuples", "-d", "", "-w", ""]);
        let mut config = Config::default();
        args.apply(&mut config);
        rationalize_duplicates(&mut config.tuples);
        assert!(config.tuples.dups.is_empty());
        assert_eq!(config.tuples.wild_dups, SymbolTypes::all());

        config.tuples.wild_dups = SymbolTypes::empty();
        config.tuples.thresholds.duplicates = Inclusion::Excluded;
        rationalize_duplicates(&mut config.tuples);
        assert!(config.tuples.wild_dups.is_empty());
    }
}
