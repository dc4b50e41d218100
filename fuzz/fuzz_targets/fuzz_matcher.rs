#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use jsonskim::{JsonMatcher, SkimOptions};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};

const HEADER: usize = 2; // flags + pattern selector

/// Patterns exercising each step kind; the header picks a subset.
const PATTERNS: &[&str] = &[
    "",
    "(a)",
    "*/(b[])",
    "**/(c)",
    "**@/(d,e)",
    "*@/()[]",
    "a/*/(*)",
    "'x''y'/(z@)",
];

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[b" ", b"\t", b"\n", b"\r", b"// note\n", b"/* note */"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[..HEADER].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes())[..HEADER]);

        let mut prefix = HEADER;
        while prefix < size {
            let limit = max_size - prefix;

            prefix += append_whitespace(&mut data[prefix..], limit);
            prefix += append_value(&mut data[prefix..], size, limit);
            prefix += append_whitespace(&mut data[prefix..], limit);
        }

        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Appends up to eight whitespace runs or comments, never more than `limit`
/// bytes. Returns the number of bytes written.
fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }

        let mut written = 0;
        for _ in 0..rng.random_range(1..=limit.min(8)) {
            let w = WS_TABLE[rng.random_range(0..WS_TABLE.len())];
            if written + w.len() > limit {
                break;
            }
            buf[written..written + w.len()].copy_from_slice(w);
            written += w.len();
        }
        written
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2 + 1).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };

    let serialized = serde_json::to_vec(&value.0).expect("Failed to serialize arbitrary value");

    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);

    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(21)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            _ => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
        };
        Ok(ArbitraryValue(value))
    }
}

fn matcher(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let selected = data[1];
    let input = String::from_utf8_lossy(&data[HEADER..]).into_owned();
    let strict = flags & 1 != 0;

    let mut matcher = JsonMatcher::with_options(SkimOptions {
        strict,
        max_depth: (flags & 2 != 0).then_some(64),
    });
    for (i, pattern) in PATTERNS.iter().enumerate() {
        if selected & (1 << i) != 0 {
            matcher.add_pattern(pattern).expect("fixed patterns compile");
        }
    }

    let mut delivered = 0usize;
    matcher.set_processor(|_, control| {
        delivered += 1;
        // Exercise control calls along the way.
        match (flags >> 2) & 3 {
            1 if delivered % 3 == 0 => control.reject(),
            2 if delivered > 16 => control.end(),
            3 if delivered > 16 => control.stop(),
            _ => {}
        }
        Ok(())
    });
    let parsed = matcher.parse(&input);

    // Strict mode must accept everything serde_json accepts, barring the
    // depth limit.
    if strict && flags & 2 == 0 && serde_json::from_str::<Value>(&input).is_ok() {
        assert!(parsed.is_ok(), "{parsed:?}");
    }
}

fuzz_target!(|data: &[u8]| matcher(data));
