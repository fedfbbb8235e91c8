use insta::assert_snapshot;
use math_tuples::{ConvertErrKind, MathTuples, TupleConfig};
use mathml_reader::ParseErrKind;

#[test]
fn main() {
    let deep = "<math>".to_string() + &"<mrow>".repeat(300) + &"</mrow>".repeat(300) + "</math>";
    let problems = [
        ("unclosed_math", "<math><mi>x</mi>"),
        ("mismatched_close", "<math><mi>x</mo></math>"),
        ("unknown_entity", "<math><mi>&notanentity;</mi></math>"),
        ("two_roots", "<math><mi>x</mi></math><math/>"),
        ("unknown_presentation_tag", "<math><mi>x</mi><blink/></math>"),
        (
            "unknown_content_tag",
            "<math><apply><plus/><ci>x</ci><widget/></apply></math>",
        ),
        ("too_deep", deep.as_str()),
    ];

    let converter = MathTuples::new(TupleConfig::default());
    for (name, problem) in problems.into_iter() {
        let Err(error) = converter.convert_mathml(problem).map_err(|e| *e) else {
            panic!("problem `{}` did not return an error", name);
        };
        let report = error.to_report("<input>", false);
        let mut buf = Vec::new();
        report
            .write(("<input>", ariadne::Source::from(problem)), &mut buf)
            .expect("failed to write report");
        let output = String::from_utf8(buf).expect("report should be valid UTF-8");
        assert!(output.contains(&error.error_message()), "{name}: {output}");
    }
}

#[test]
fn error_kinds() {
    let converter = MathTuples::new(TupleConfig::default());

    let err = converter.convert_mathml("<math><mi>x</mi>").unwrap_err();
    assert_eq!(
        err.1,
        ConvertErrKind::Markup(ParseErrKind::UnclosedElement("math".into()))
    );
    assert_snapshot!(err.to_string(), @r#"0: Element "<math>" is never closed."#);

    let err = converter
        .convert_mathml("<math><mi>x</mi><blink/></math>")
        .unwrap_err();
    assert_eq!(err.unknown_tag(), Some("blink"));
    assert_snapshot!(err.to_string(), @r#"16: Unknown MathML tag "blink"."#);

    let source = "<mrow>".repeat(300) + &"</mrow>".repeat(300);
    let err = converter.convert_mathml(&source).unwrap_err();
    assert_eq!(
        err.1,
        ConvertErrKind::Markup(ParseErrKind::DepthLimitExceeded)
    );
}

#[test]
fn errors_do_not_poison_the_converter() {
    let converter = MathTuples::new(TupleConfig::default());
    assert!(converter.convert_mathml("<math><foo/></math>").is_err());
    assert!(
        converter
            .convert_mathml("<math><mi>x</mi></math>")
            .unwrap()
            .is_some()
    );
}
