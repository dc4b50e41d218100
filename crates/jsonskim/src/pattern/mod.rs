//! Compiled path queries.
//!
//! A pattern is a `/`-separated list of steps, each matching one level of
//! the document below the root container:
//!
//! | Syntax      | Meaning                                                        |
//! |-------------|----------------------------------------------------------------|
//! | `name`      | the member called `name`                                       |
//! | `a,b`       | either alternative                                             |
//! | `*`         | any member or element                                          |
//! | `**`        | zero or more levels                                            |
//! | `(a,b)`     | capture the value of `a` or `b`                                |
//! | `()`        | capture the member name instead of its value                   |
//! | `(a[])`     | accumulate every match of `a` into an array                    |
//! | `name@`     | deliver pending captures when entering and leaving `name`     |
//! | `(a@)`      | deliver the capture of `a` as soon as it completes             |
//! | `'a/b'`     | the literal name `a/b`; `''` inside quotes is a single quote   |
//!
//! The empty pattern captures the whole document.
//!
//! ```
//! use jsonskim::Pattern;
//!
//! let pattern = Pattern::compile("services/*/(status[])").unwrap();
//! assert_eq!(pattern.capture_count(), 1);
//! assert!(!pattern.is_stoppable());
//!
//! let err = Pattern::compile("services/status").unwrap_err();
//! assert_eq!(err.to_string(), "pattern captures nothing at 0 in pattern: services/status");
//! ```

mod compile;

use alloc::{string::String, vec::Vec};
use core::fmt;

use crate::error::PatternError;

/// What a [`Match`] accepts as the name of a member or element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Selector {
    /// A member with exactly this name.
    Name(String),
    /// Anything, named or not.
    Any,
    /// Any named member; the name itself is what gets captured.
    Keys,
}

impl Selector {
    pub(crate) fn accepts(&self, name: Option<&str>) -> bool {
        match self {
            Self::Name(expected) => name == Some(expected.as_str()),
            Self::Any => true,
            Self::Keys => name.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MatchFlags {
    pub capture: bool,
    pub array: bool,
    pub keys: bool,
    pub process: bool,
}

/// One alternative of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Match {
    pub selector: Selector,
    pub flags: MatchFlags,
    /// Index into [`Pattern::captures`] for capturing alternatives.
    pub slot: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// Alternatives tried in order; the first that accepts a name wins.
    Matches(Vec<Match>),
    /// `**`, optionally with `@`.
    Recursive { process: bool },
}

/// How the value of one capture is stored and delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CaptureSpec {
    /// Key for array accumulation: the literal name, `""` for keys, `*` for
    /// wildcards.
    pub key: String,
    pub array: bool,
    pub keys: bool,
    pub process: bool,
    /// Delivered bare rather than inside an object.
    pub single: bool,
}

/// A compiled pattern.
///
/// Steps are stored in order and addressed by index, so matching state can
/// refer to a step with a plain `usize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    pub(crate) steps: Vec<Step>,
    pub(crate) captures: Vec<CaptureSpec>,
    pub(crate) root_capture: bool,
    stoppable: bool,
    has_process: bool,
}

impl Pattern {
    /// Compiles `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] locating the first malformed construct.
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        let pattern = compile::compile(source)?;
        tracing::debug!(
            pattern = source,
            stoppable = pattern.stoppable,
            captures = pattern.captures.len(),
            "compiled pattern"
        );
        Ok(pattern)
    }

    /// The text the pattern was compiled from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether matching can finish before the end of input: the pattern has
    /// no array capture, no step-level `@`, and no `@` on a wildcard or key
    /// capture.
    #[must_use]
    pub fn is_stoppable(&self) -> bool {
        self.stoppable
    }

    /// Number of capture slots.
    #[must_use]
    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    /// Whether any step or capture carries `@`.
    #[must_use]
    pub fn has_process_trigger(&self) -> bool {
        self.has_process
    }

    /// The catch-all pattern, equivalent to compiling `""`.
    pub(crate) fn root() -> Self {
        Self {
            source: String::new(),
            steps: Vec::new(),
            captures: alloc::vec![CaptureSpec {
                key: String::new(),
                array: false,
                keys: false,
                process: false,
                single: true,
            }],
            root_capture: true,
            stoppable: true,
            has_process: false,
        }
    }

    fn from_steps(source: &str, steps: Vec<Step>) -> Self {
        let mut captures = Vec::new();
        let mut groups = alloc::vec![Group::default()];
        let mut group_of = Vec::new();
        let mut current_group = 0;
        let mut stoppable = true;
        let mut has_process = false;

        for step in &steps {
            let opens_group = match step {
                Step::Recursive { process } => *process,
                Step::Matches(matches) => {
                    for m in matches {
                        has_process |= m.flags.process;
                        if !m.flags.capture {
                            continue;
                        }
                        // `(*@)` and `()@` deliver once per member, so there is
                        // no last capture to stop after.
                        let per_member =
                            m.flags.process && !matches!(m.selector, Selector::Name(_));
                        stoppable &= !(m.flags.array || per_member);
                        let group = if m.flags.process {
                            groups.push(Group::default());
                            groups.len() - 1
                        } else {
                            current_group
                        };
                        let key = match &m.selector {
                            Selector::Name(name) => name.clone(),
                            Selector::Any => "*".into(),
                            Selector::Keys => String::new(),
                        };
                        groups[group].add(&key, m.flags.array);
                        group_of.push(group);
                        captures.push(CaptureSpec {
                            key,
                            array: m.flags.array,
                            keys: m.flags.keys,
                            process: m.flags.process,
                            single: false,
                        });
                    }
                    matches.iter().any(|m| m.flags.process && !m.flags.capture)
                }
            };
            if opens_group {
                has_process = true;
                stoppable = false;
                groups.push(Group::default());
                current_group = groups.len() - 1;
            }
        }

        for (spec, group) in captures.iter_mut().zip(group_of) {
            spec.single = groups[group].is_single(has_process);
        }

        Self {
            source: source.into(),
            steps,
            captures,
            root_capture: false,
            stoppable,
            has_process,
        }
    }
}

/// Captures delivered together.
#[derive(Default)]
struct Group {
    slots: usize,
    /// Distinct keys of the non-array captures.
    keys: Vec<String>,
    arrays: usize,
}

impl Group {
    fn add(&mut self, key: &str, array: bool) {
        self.slots += 1;
        if array {
            self.arrays += 1;
        } else if !self.keys.iter().any(|k| k == key) {
            self.keys.push(key.into());
        }
    }

    /// Whether a delivery holds one value, so it goes out bare.
    ///
    /// With a trigger, captures of the same name at different steps replace
    /// each other between deliveries. Without one, everything is delivered at
    /// the end of the scan and only a lone capture is bare.
    fn is_single(&self, triggered: bool) -> bool {
        if triggered {
            self.keys.len() + self.arrays == 1
        } else {
            self.slots == 1
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
