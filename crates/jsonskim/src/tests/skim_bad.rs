use alloc::string::ToString;

use rstest::rstest;

use crate::{
    ContainerKind, ErrorSource, Flow, JsonMatcher, MatcherError, ParseError, SkimHandler,
    SkimOptions, Skimmer, SyntaxError, Token,
};

struct Ignore;

impl SkimHandler for Ignore {
    fn enter(&mut self, _: Option<&Token<'_>>, _: ContainerKind) -> Result<Flow, ErrorSource> {
        Ok(Flow::Continue)
    }
    fn value(&mut self, _: Option<&Token<'_>>, _: &Token<'_>) -> Result<Flow, ErrorSource> {
        Ok(Flow::Continue)
    }
    fn exit(&mut self, _: ContainerKind) -> Result<Flow, ErrorSource> {
        Ok(Flow::Continue)
    }
}

fn skim(input: &str, options: SkimOptions) -> ParseError {
    Skimmer::new(options).skim(input, &mut Ignore).unwrap_err()
}

fn syntax(err: &ParseError) -> SyntaxError {
    match err.kind() {
        ErrorSource::Syntax(e) => e.clone(),
        ErrorSource::Processor(e) => panic!("unexpected processor error: {e}"),
    }
}

fn parse_error(err: MatcherError) -> ParseError {
    match err {
        MatcherError::Parse(err) => err,
        other => panic!("expected a parse error, got {other:?}"),
    }
}

const STRICT: SkimOptions = SkimOptions {
    strict: true,
    max_depth: None,
};

#[rstest]
#[case::empty("", SyntaxError::UnexpectedEndOfInput, 0)]
#[case::whitespace_only("  \n ", SyntaxError::UnexpectedEndOfInput, 4)]
#[case::unclosed_array("[1, 2", SyntaxError::UnexpectedEndOfInput, 5)]
#[case::unclosed_string(r#"{"a": "abc"#, SyntaxError::UnexpectedEndOfInput, 10)]
#[case::missing_colon(r#"{"a" 1}"#, SyntaxError::UnexpectedCharacter('1'), 5)]
#[case::mismatched_close("[}", SyntaxError::UnexpectedCharacter('}'), 1)]
#[case::leading_comma("{,}", SyntaxError::UnexpectedCharacter(','), 1)]
#[case::colon_as_value(r#"{"a"::1}"#, SyntaxError::UnexpectedCharacter(':'), 5)]
#[case::second_root("{} {}", SyntaxError::TrailingData, 3)]
fn relaxed_errors(#[case] input: &str, #[case] expected: SyntaxError, #[case] offset: usize) {
    let err = skim(input, SkimOptions::default());
    assert_eq!(syntax(&err), expected);
    assert_eq!(err.offset(), offset);
}

#[rstest]
#[case::unquoted_name("{a: 1}", SyntaxError::UnexpectedCharacter('a'))]
#[case::unquoted_value("[nope]", SyntaxError::UnquotedText)]
#[case::trailing_comma_array("[1,]", SyntaxError::UnexpectedCharacter(']'))]
#[case::trailing_comma_object(r#"{"a":1,}"#, SyntaxError::UnexpectedCharacter('}'))]
#[case::missing_comma("[1\n2]", SyntaxError::UnexpectedCharacter('2'))]
#[case::line_comment("// note\n1", SyntaxError::Comment)]
#[case::block_comment("[1, /* note */ 2]", SyntaxError::Comment)]
fn strict_errors(#[case] input: &str, #[case] expected: SyntaxError) {
    assert_eq!(syntax(&skim(input, STRICT)), expected);
    Skimmer::default().skim(input, &mut Ignore).unwrap();
}

#[test]
fn depth_limit() {
    let options = SkimOptions {
        max_depth: Some(2),
        ..SkimOptions::default()
    };
    let err = skim("[[[1]]]", options);
    assert_eq!(syntax(&err), SyntaxError::DepthLimitExceeded(2));
    assert_eq!(err.offset(), 2);
}

#[test]
fn errors_report_line_and_context() {
    let err = skim("{\n  a: 1,\n  b: [1, 2}\n}", SkimOptions::default());
    assert_eq!(err.line(), 3);
    assert_eq!(err.context(), "{\n  a: 1,\n  b: [1, 2*ERROR*}\n}");
    assert_eq!(
        err.to_string(),
        "syntax error: unexpected character '}' on line 3 near: {\n  a: 1,\n  b: [1, 2*ERROR*}\n}"
    );
}

#[test]
fn captured_values_are_unescaped_on_demand() {
    let mut matcher = JsonMatcher::new();
    matcher.add_pattern("(a)").unwrap();
    let err = parse_error(matcher.parse_value(r#"{"b": "\q", "a": "\x"}"#).unwrap_err());
    assert_eq!(syntax(&err), SyntaxError::IllegalEscape('x'));
    assert_eq!(err.offset(), 17);
}

#[test]
fn processor_errors_are_located() {
    let mut matcher = JsonMatcher::new();
    matcher
        .add_pattern_with("items/*@/(id)", |capture, _| {
            if capture.value().as_i64() == Some(2) {
                return Err("id 2 is reserved".into());
            }
            Ok(())
        })
        .unwrap();
    let err = parse_error(
        matcher
            .parse(r#"{"items": [{"id": 1}, {"id": 2}]}"#)
            .unwrap_err(),
    );
    assert!(matches!(err.kind(), ErrorSource::Processor(_)));
    assert_eq!(err.offset(), 30);
    assert_eq!(
        err.kind().to_string(),
        "processor error: id 2 is reserved"
    );
}
