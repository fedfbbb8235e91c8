use insta::assert_snapshot;
use std::collections::BTreeSet;

use math_tuples::{
    Inclusion, Markup, MathTuples, NodeKind, SymbolTree, SymbolTypes, Thresholds, TupleConfig,
    Window,
};
use mathml_reader::parse;

fn convert(config: TupleConfig, mathml: &str) -> String {
    MathTuples::new(config)
        .convert_mathml(mathml)
        .unwrap()
        .unwrap_or_default()
}

fn pairs_only(inclusion: impl Into<Inclusion>) -> TupleConfig {
    TupleConfig {
        thresholds: Thresholds::none().with(NodeKind::SymbolPair, inclusion),
        ..Default::default()
    }
}

#[test]
fn sum_of_two_variables() {
    let config = TupleConfig {
        thresholds: Thresholds::none()
            .with(NodeKind::SymbolPair, 1)
            .with(NodeKind::Terminal, 1),
        ..Default::default()
    };
    assert_snapshot!(
        convert(config, "<math><mi>x</mi><mo>+</mo><mi>y</mi></math>"),
        @"#(start)# #(v!x,+,n)# #(+,v!y,n)# #(v!y,!0)# #(end)#"
    );
}

#[test]
fn repeated_symbol_in_fraction() {
    let config = TupleConfig {
        thresholds: Thresholds::none().with(NodeKind::Duplicate, 1),
        wild_dups: SymbolTypes::empty(),
        ..Default::default()
    };
    let tokens = convert(
        config,
        "<math><mfrac><mi>a</mi><mi>a</mi></mfrac></math>",
    );
    assert_eq!(tokens, "#(start)# #{v!a,o,u}# #(end)#");
    assert_eq!(tokens.matches("#{").count(), 1);
}

#[test]
fn bracketed_lists_become_matrices() {
    let converter = MathTuples::new(TupleConfig::default());
    let sources = [
        (
            "mfenced",
            "<math><mfenced><mi>a</mi><mi>b</mi><mi>c</mi></mfenced></math>",
        ),
        (
            "mrow",
            "<math><mrow><mo>(</mo><mi>a</mi><mo>,</mo><mi>b</mi><mo>,</mo><mi>c</mi><mo>)</mo></mrow></math>",
        ),
    ];
    for (name, source) in sources {
        let math = parse(source).unwrap();
        let tree = converter.symbol_tree(&math).unwrap();
        assert_eq!(
            tree.to_string(),
            "[M!()1x3,w[V!a,e[V!b,e[V!c]]]]",
            "{name}"
        );
    }
}

#[test]
fn anchors_reset_locations() {
    let source =
        "<math><mi>x</mi><mo>=</mo><mi>y</mi><mo>+</mo><mn>1</mn></math>";
    assert_snapshot!(
        convert(pairs_only(Inclusion::Unlimited), source),
        @"#(start)# #(v!x,=,n)# #(v!x,=,n,-)# #(=,v!y,n)# #(=,v!y,n,n)# #(v!y,+,n)# #(v!y,+,n,n)# #(+,n!1,n)# #(+,n!1,n,nn)# #(end)#"
    );
    let config = TupleConfig {
        anchors: Vec::new(),
        ..pairs_only(Inclusion::Unlimited)
    };
    assert_snapshot!(
        convert(config, source),
        @"#(start)# #(v!x,=,n)# #(v!x,=,n,-)# #(=,v!y,n)# #(=,v!y,n,n)# #(v!y,+,n)# #(v!y,+,n,nn)# #(+,n!1,n)# #(+,n!1,n,nnn)# #(end)#"
    );
}

#[test]
fn pairs_beyond_the_window() {
    let source = "<math><mi>x</mi><mo>+</mo><mi>y</mi></math>";
    let boundary = TupleConfig {
        window: Window::Bounded(1),
        thresholds: Thresholds::none()
            .with(NodeKind::SymbolPair, 1)
            .with(NodeKind::Long, 1),
        ..Default::default()
    };
    assert_snapshot!(
        convert(boundary.clone(), source),
        @"#(start)# #(v!x,+,n)# #(v!x,v!y,nn)# #(+,v!y,n)# #(end)#"
    );
    let shortened = TupleConfig {
        thresholds: boundary.thresholds.with(NodeKind::Abbreviated, 1),
        ..boundary
    };
    assert_snapshot!(
        convert(shortened, source),
        @"#(start)# #(v!x,+,n)# #(v!x,v!y)# #(+,v!y,n)# #(end)#"
    );
}

#[test]
fn content_markup() {
    let source = r#"<math><semantics>
  <mrow><mi>a</mi><mo>+</mo><mi>b</mi></mrow>
  <annotation-xml encoding="MathML-Content">
    <apply><plus/><ci>a</ci><ci>b</ci></apply>
  </annotation-xml>
</semantics></math>"#;
    let content = TupleConfig {
        markup: Markup::Content,
        ..pairs_only(1)
    };
    assert_snapshot!(
        convert(content, source),
        @"#(start)# #(+,v!a,w)# #(v!a,v!b,e)# #(end)#"
    );
    assert_snapshot!(
        convert(pairs_only(1), source),
        @"#(start)# #(v!a,+,n)# #(+,v!b,n)# #(end)#"
    );
}

#[test]
fn missing_markup_yields_nothing() {
    let converter = MathTuples::new(TupleConfig {
        markup: Markup::Content,
        ..Default::default()
    });
    let tokens = converter
        .convert_mathml("<math><mi>x</mi></math>")
        .unwrap();
    assert_eq!(tokens, None);
    let converter = MathTuples::new(TupleConfig::default());
    assert_eq!(converter.convert_mathml("<math></math>").unwrap(), None);
}

#[test]
fn query_wildcards() {
    let config = TupleConfig {
        thresholds: Thresholds::none()
            .with(NodeKind::SymbolPair, 1)
            .with(NodeKind::Terminal, 1),
        ..Default::default()
    };
    assert_snapshot!(
        convert(config, "<math><mi>x</mi><mo>+</mo><mqvar>A</mqvar></math>"),
        @"#(start)# #(v!x,+,n)# #(+,*,n)# #(end)#"
    );
}

/// Every tuple generated for a set of enabled kinds classifies as one of the expected kinds,
/// and each expected kind turns up somewhere in the corpus.
#[test]
fn tuples_classify_as_their_kind() {
    let corpus = [
        "[V!x]",
        "[V!x,a[N!2]]",
        "[V!x[+[V!y]]]",
        "[F!,o[N!1[+[V!x]]],u[N!2]]",
        "[V!x,a[N!2],b[V!i[=[N!1]]]]",
        "[M!()1x2,w[V!a,e[V!a]]]",
        "[V!a[=[V!a[+[V!b[×[V!a]]]]]]]",
        "[∫,a[N!1],b[N!0],w[V!f[M!()1x1,w[V!x]]],v[V!x]]",
        "[V!x[+[?a]]]",
    ];
    use NodeKind::*;
    let problems: [(&str, &[NodeKind], u32, &[NodeKind]); 8] = [
        ("symbol_pairs", &[SymbolPair], 2, &[SymbolPair]),
        ("edge_pairs", &[EdgePair], 1, &[EdgePair]),
        ("terminals", &[Terminal], 1, &[Terminal]),
        ("eol", &[EndOfLine], 1, &[EndOfLine]),
        ("compounds", &[Compound], 1, &[Compound]),
        ("duplicates", &[Duplicate], 1, &[Duplicate]),
        ("long_pairs", &[SymbolPair, Long], 1, &[SymbolPair]),
        ("abbreviated", &[SymbolPair, Long, Abbreviated], 1, &[SymbolPair, Long]),
    ];
    for (name, enabled, window, expected) in problems {
        let mut thresholds = Thresholds::none();
        for &kind in enabled {
            thresholds.set(kind, Inclusion::Unlimited);
        }
        let converter = MathTuples::new(TupleConfig {
            thresholds,
            window: Window::from(window),
            synonyms: true,
            ..Default::default()
        });
        let mut seen = BTreeSet::new();
        for tree in corpus {
            let tree: SymbolTree = tree.parse().unwrap();
            for tuple in converter.tuples(&tree).unwrap() {
                let kind = tuple.kind();
                assert!(expected.contains(&kind), "{name}: {tuple} is {kind:?}");
                seen.insert(kind.letter());
            }
        }
        let expected: BTreeSet<&str> = expected.iter().map(|kind| kind.letter()).collect();
        assert_eq!(seen, expected, "{name}");
    }
}
