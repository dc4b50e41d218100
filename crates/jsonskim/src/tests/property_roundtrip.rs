use alloc::{
    boxed::Box,
    format,
    string::{String, ToString},
    vec::Vec,
};

use quickcheck::{Arbitrary, Gen, QuickCheck};

use crate::{
    JsonMatcher, Pattern, SkimOptions, Value,
    pattern::{Selector, Step},
};

/// A JSON document with integer numbers, so that rendering is exact.
#[derive(Clone, Debug)]
struct Doc(Value);

fn arbitrary_value(g: &mut Gen, depth: usize) -> Value {
    let scalar_only = depth == 0;
    match u8::arbitrary(g) % if scalar_only { 4 } else { 6 } {
        0 => Value::Null,
        1 => Value::Boolean(bool::arbitrary(g)),
        2 => Value::from(i64::arbitrary(g)),
        3 => Value::String(String::arbitrary(g)),
        4 => {
            let len = usize::arbitrary(g) % 4;
            Value::Array((0..len).map(|_| arbitrary_value(g, depth - 1)).collect())
        }
        _ => {
            let len = usize::arbitrary(g) % 4;
            Value::Object(
                (0..len)
                    .map(|_| (String::arbitrary(g), arbitrary_value(g, depth - 1)))
                    .collect(),
            )
        }
    }
}

impl Arbitrary for Doc {
    fn arbitrary(g: &mut Gen) -> Self {
        Doc(arbitrary_value(g, 3))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match &self.0 {
            Value::Array(items) => Box::new(
                items
                    .clone()
                    .into_iter()
                    .map(Doc)
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
            Value::Object(map) => Box::new(
                map.clone()
                    .into_iter()
                    .map(|(_, v)| Doc(v))
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
            _ => quickcheck::empty_shrinker(),
        }
    }
}

fn tests() -> u64 {
    if cfg!(feature = "test-fast") {
        50
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}

fn quote(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Property: capturing the whole rendered document gives back the document,
/// in relaxed and strict mode alike.
#[test]
fn whole_document_roundtrip() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(doc: Doc) -> bool {
        let src = doc.0.to_string();
        [false, true].into_iter().all(|strict| {
            let mut matcher = JsonMatcher::with_options(SkimOptions {
                strict,
                ..SkimOptions::default()
            });
            matcher.parse_value(&src).ok().flatten().as_ref() == Some(&doc.0)
        })
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Doc) -> bool);
}

/// Property: any pair of names, once quoted, compiles to steps matching those
/// exact names and extracts the nested value.
#[test]
fn quoted_names_roundtrip() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(outer: String, inner: String, n: i64) -> bool {
        let source = format!("{}/({})", quote(&outer), quote(&inner));
        let Ok(pattern) = Pattern::compile(&source) else {
            return false;
        };
        let names_match = matches!(
            pattern.steps.as_slice(),
            [Step::Matches(a), Step::Matches(b)]
                if a[0].selector == Selector::Name(outer.clone())
                    && b[0].selector == Selector::Name(inner.clone())
        );

        let doc = Value::Object(
            [(
                outer.as_str(),
                Value::Object([(inner.as_str(), Value::from(n))].into_iter().collect()),
            )]
            .into_iter()
            .collect(),
        );
        let mut matcher = JsonMatcher::new();
        if matcher.add_pattern(&source).is_err() {
            return false;
        }
        let found = matcher.parse_value(&doc.to_string()).ok().flatten();

        names_match && found == Some(Value::from(n)) && pattern.to_string() == source
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(String, String, i64) -> bool);
}

/// Property: compiling is deterministic and the source text is kept.
#[test]
fn compile_is_stable() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(source: String) -> bool {
        match (Pattern::compile(&source), Pattern::compile(&source)) {
            (Ok(a), Ok(b)) => a == b && a.as_str() == source,
            (Err(a), Err(b)) => a == b && a.offset() <= source.chars().count(),
            _ => false,
        }
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(String) -> bool);
}

#[test]
fn roundtrip_sample() {
    let doc = Value::Object(
        [
            ("", Value::Array(Vec::new())),
            ("k\u{1}\"", Value::from(-3)),
            ("k\u{1}\"", "\u{2028}".into()),
        ]
        .into_iter()
        .collect(),
    );
    let src = doc.to_string();
    assert_eq!(src, r#"{"":[],"k\u0001\"":-3,"k\u0001\"":"\u2028"}"#);
    assert_eq!(JsonMatcher::new().parse_value(&src).unwrap(), Some(doc));
}
