use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};

use crate::{ContainerKind, ErrorSource, Flow, SkimHandler, SkimOptions, Skimmer, Token};

/// Records events as short strings, optionally stopping after `stop_after`
/// values.
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    values: usize,
    stop_after: Option<usize>,
}

fn describe(name: Option<&Token<'_>>) -> String {
    name.map_or_else(|| "-".to_string(), |n| n.text().unwrap().into_owned())
}

impl SkimHandler for Recorder {
    fn enter(&mut self, name: Option<&Token<'_>>, kind: ContainerKind) -> Result<Flow, ErrorSource> {
        let bracket = match kind {
            ContainerKind::Object => '{',
            ContainerKind::Array => '[',
        };
        self.events.push(format!("{} {bracket}", describe(name)));
        Ok(Flow::Continue)
    }

    fn value(&mut self, name: Option<&Token<'_>>, value: &Token<'_>) -> Result<Flow, ErrorSource> {
        self.events
            .push(format!("{}={}", describe(name), value.to_value()?));
        self.values += 1;
        Ok(match self.stop_after {
            Some(n) if self.values >= n => Flow::Stop,
            _ => Flow::Continue,
        })
    }

    fn exit(&mut self, kind: ContainerKind) -> Result<Flow, ErrorSource> {
        self.events.push(
            match kind {
                ContainerKind::Object => "}",
                ContainerKind::Array => "]",
            }
            .to_string(),
        );
        Ok(Flow::Continue)
    }
}

fn events(input: &str, options: SkimOptions) -> Vec<String> {
    let mut recorder = Recorder::default();
    Skimmer::new(options).skim(input, &mut recorder).unwrap();
    recorder.events
}

#[test]
fn standard_document() {
    let input = r#"{"a": 1, "b": [true, null, "x"], "c": {}}"#;
    let expected = [
        "- {", "a=1", "b [", "-=true", "-=null", r#"-="x""#, "]", "c {", "}", "}",
    ];
    assert_eq!(events(input, SkimOptions::default()), expected);
    assert_eq!(
        events(
            input,
            SkimOptions {
                strict: true,
                ..SkimOptions::default()
            }
        ),
        expected
    );
}

#[test]
fn relaxed_document() {
    let input = "
        // inventory
        {
            type: ENCHARGE /* block */,
            serial: \"32131444\"
            ratio: 31.4
            tags: [a, b,],
        }";
    assert_eq!(
        events(input, SkimOptions::default()),
        [
            "- {",
            r#"type="ENCHARGE""#,
            r#"serial="32131444""#,
            "ratio=31.4",
            "tags [",
            r#"-="a""#,
            r#"-="b""#,
            "]",
            "}",
        ]
    );
}

#[test]
fn unquoted_values_keep_inner_spaces() {
    assert_eq!(
        events("{a: hello world\n b: 2}", SkimOptions::default()),
        ["- {", r#"a="hello world""#, "b=2", "}"]
    );
}

#[test]
fn unquoted_text_that_is_not_a_number() {
    assert_eq!(
        events("[2.1.38, 830-00703-r84, -7]", SkimOptions::default()),
        ["- [", r#"-="2.1.38""#, r#"-="830-00703-r84""#, "-=-7", "]"]
    );
}

#[test]
fn root_scalars() {
    assert_eq!(events("  42 ", SkimOptions::default()), ["-=42"]);
    assert_eq!(events(r#""hi""#, SkimOptions::default()), [r#"-="hi""#]);
    assert_eq!(events("true // done", SkimOptions::default()), ["-=true"]);
}

#[test]
fn escaped_names_are_decoded() {
    assert_eq!(
        events(r#"{"a\u0062": "\t"}"#, SkimOptions::default()),
        ["- {", r#"ab="\t""#, "}"]
    );
}

#[test]
fn stop_skips_the_rest_of_the_input() {
    let mut recorder = Recorder {
        stop_after: Some(2),
        ..Recorder::default()
    };
    Skimmer::new(SkimOptions::default())
        .skim("[1, 2, this is never { read", &mut recorder)
        .unwrap();
    assert_eq!(recorder.events, ["- [", "-=1", "-=2"]);
}

#[test]
fn tokens_keep_their_source() {
    struct Tokens(Vec<(String, bool, bool)>);

    impl SkimHandler for Tokens {
        fn enter(&mut self, _: Option<&Token<'_>>, _: ContainerKind) -> Result<Flow, ErrorSource> {
            Ok(Flow::Continue)
        }
        fn value(&mut self, _: Option<&Token<'_>>, v: &Token<'_>) -> Result<Flow, ErrorSource> {
            self.0.push((v.raw().to_string(), v.is_quoted(), v.is_escaped()));
            Ok(Flow::Continue)
        }
        fn exit(&mut self, _: ContainerKind) -> Result<Flow, ErrorSource> {
            Ok(Flow::Continue)
        }
    }

    let mut tokens = Tokens(Vec::new());
    Skimmer::default()
        .skim(r#"["a\nb", plain, "c"]"#, &mut tokens)
        .unwrap();
    assert_eq!(
        tokens.0,
        [
            (r"a\nb".to_string(), true, true),
            ("plain".to_string(), false, false),
            ("c".to_string(), true, false),
        ]
    );
}

#[test]
fn malformed_escapes_in_ignored_values_are_not_checked() {
    struct Count(usize);

    impl SkimHandler for Count {
        fn enter(&mut self, _: Option<&Token<'_>>, _: ContainerKind) -> Result<Flow, ErrorSource> {
            Ok(Flow::Continue)
        }
        fn value(&mut self, _: Option<&Token<'_>>, _: &Token<'_>) -> Result<Flow, ErrorSource> {
            self.0 += 1;
            Ok(Flow::Continue)
        }
        fn exit(&mut self, _: ContainerKind) -> Result<Flow, ErrorSource> {
            Ok(Flow::Continue)
        }
    }

    let mut count = Count(0);
    Skimmer::default()
        .skim(r#"{"a": "\q", "b": "\uZZZZ"}"#, &mut count)
        .unwrap();
    assert_eq!(count.0, 2);
}

#[test]
fn depth_limit_allows_the_limit_itself() {
    let options = SkimOptions {
        max_depth: Some(2),
        ..SkimOptions::default()
    };
    assert_eq!(events("[[1]]", options), ["- [", "- [", "-=1", "]", "]"]);
}
