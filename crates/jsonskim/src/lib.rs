//! Single-pass JSON scanning with path-pattern extraction.
//!
//! `jsonskim` pulls selected values out of a JSON document without building
//! the whole tree. A [`JsonMatcher`] runs any number of path patterns against
//! one scan of the input; only the values they capture are materialized, and
//! the scan ends early once every pattern has what it needs.
//!
//! The scanner accepts relaxed JSON by default (comments, unquoted names and
//! values, trailing commas), or strict RFC 8259 JSON with
//! [`SkimOptions::strict`].
//!
//! ```
//! use jsonskim::JsonMatcher;
//!
//! let json = r#"[
//!     { type: ENCHARGE, devices: [ { serial_num: "32131444", percentFull: 100 } ] },
//!     { type: ENPOWER,  devices: [ { serial_num: "9834711" } ] },
//! ]"#;
//!
//! let mut serials = Vec::new();
//! {
//!     let mut matcher = JsonMatcher::new();
//!     matcher.add_pattern_with("*/devices/*/(serial_num[])", |capture, _| {
//!         serials.push(capture.to_string());
//!         Ok(())
//!     })?;
//!     matcher.parse(json)?;
//! }
//! assert_eq!(serials, [r#"["32131444","9834711"]"#]);
//! # Ok::<(), jsonskim::MatcherError>(())
//! ```
//!
//! # Patterns
//!
//! A pattern is a `/`-separated list of steps from the root, ending in a
//! parenthesized list of captures:
//!
//! | Syntax      | Meaning                                                  |
//! |-------------|----------------------------------------------------------|
//! | `name`      | member `name` of an object                               |
//! | `*`         | any one member or array element                          |
//! | `**`        | any number of levels, including none                     |
//! | `a,b`       | member `a` or member `b`                                 |
//! | `(name)`    | capture member `name`                                    |
//! | `(*)`       | capture every member                                     |
//! | `()`        | capture member names                                     |
//! | `(name[])`  | capture every match into an array                        |
//! | `x@`        | deliver captures as soon as `x` matches                  |
//!
//! See [`Pattern`] for the details and [`Control`] for steering a scan from
//! a processor.
//!
//! # Features
//!
//! - `std` (default): [`JsonMatcher::parse_reader`] and
//!   [`JsonMatcher::parse_file`]. Without it the crate is `no_std` and only
//!   needs `alloc`.
//! - `serde`: `Serialize` and `Deserialize` for [`Value`].

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod capture;
mod error;
mod escape_buffer;
mod lexer;
mod matcher;
mod options;
mod pattern;
mod value;

#[cfg(test)]
mod tests;

pub use capture::Capture;
pub use error::{
    ErrorSource, MatcherError, ParseError, PatternError, PatternErrorKind, ProcessError,
    SyntaxError,
};
pub use lexer::{ContainerKind, Flow, SkimHandler, Skimmer, Token};
pub use matcher::{Control, JsonMatcher, Processor, Segment};
pub use options::SkimOptions;
pub use pattern::Pattern;
pub use value::{Array, Map, Number, Value};
