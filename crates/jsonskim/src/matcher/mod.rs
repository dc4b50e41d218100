//! Running patterns against a scan.
//!
//! [`JsonMatcher`] registers patterns, feeds the events of one
//! [`Skimmer`](crate::Skimmer) pass to all of them at once, and hands captured
//! values to processors. Only matched data is ever materialized.
//!
//! Captures are delivered:
//!
//! - as soon as they are stored, for captures marked `(name@)`;
//! - when entering or leaving a container reached through a step marked
//!   `name@`, `*@` or `**@`;
//! - at the end of the scan, for whatever is still pending.
//!
//! When every pattern is stoppable and every capture has been filled, the
//! scan ends without reading the rest of the input.
//!
//! ```
//! use jsonskim::JsonMatcher;
//!
//! let mut names = Vec::new();
//! {
//!     let mut matcher = JsonMatcher::new();
//!     matcher.add_pattern_with("users@/(name)", |capture, _| {
//!         names.push(capture.to_string());
//!         Ok(())
//!     })?;
//!     matcher.parse(r#"{"users":[{"name":"nate"},{"name":"iva"}]}"#)?;
//! }
//! assert_eq!(names, [r#""nate""#, r#""iva""#]);
//! # Ok::<(), jsonskim::MatcherError>(())
//! ```

mod control;
mod path;
mod state;

use alloc::{borrow::Cow, boxed::Box, vec::Vec};

pub use control::Control;
pub use path::Segment;
use state::PatternState;

use crate::{
    Capture, Pattern, SkimOptions,
    error::{ErrorSource, MatcherError, ParseError, ProcessError},
    lexer::{ContainerKind, Flow, SkimHandler, Skimmer, Token},
    value::Value,
};

/// A callback receiving delivered captures.
pub type Processor<'a> =
    Box<dyn FnMut(&Capture, &mut Control<'_>) -> Result<(), ProcessError> + 'a>;

/// Why the scan is winding down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Halt {
    Running,
    /// Stop scanning and deliver pending captures.
    End,
    /// Stop scanning and drop pending captures.
    Stop,
}

/// Extracts values from JSON text with path patterns.
///
/// See the [module documentation](self) for when captures are delivered, and
/// [`Pattern`] for the pattern syntax.
pub struct JsonMatcher<'a> {
    options: SkimOptions,
    states: Vec<PatternState>,
    processors: Vec<Option<Processor<'a>>>,
    global: Option<Processor<'a>>,
}

impl Default for JsonMatcher<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> JsonMatcher<'a> {
    /// Creates a matcher accepting relaxed JSON.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(SkimOptions::default())
    }

    /// Creates a matcher with the given scanner options.
    #[must_use]
    pub fn with_options(options: SkimOptions) -> Self {
        Self {
            options,
            states: Vec::new(),
            processors: Vec::new(),
            global: None,
        }
    }

    /// Registers a pattern and returns its index.
    ///
    /// # Errors
    ///
    /// [`MatcherError::Pattern`] if the pattern does not compile.
    pub fn add_pattern(&mut self, pattern: &str) -> Result<usize, MatcherError> {
        self.register(pattern, None)
    }

    /// Registers a pattern with a processor of its own, called before the
    /// catch-all processor for every capture of this pattern.
    ///
    /// # Errors
    ///
    /// [`MatcherError::Pattern`] if the pattern does not compile.
    pub fn add_pattern_with<F>(&mut self, pattern: &str, processor: F) -> Result<usize, MatcherError>
    where
        F: FnMut(&Capture, &mut Control<'_>) -> Result<(), ProcessError> + 'a,
    {
        self.register(pattern, Some(Box::new(processor)))
    }

    fn register(
        &mut self,
        pattern: &str,
        processor: Option<Processor<'a>>,
    ) -> Result<usize, MatcherError> {
        let pattern = Pattern::compile(pattern)?;
        self.states.push(PatternState::new(pattern));
        self.processors.push(processor);
        Ok(self.states.len() - 1)
    }

    /// Sets the catch-all processor, called for the captures of every
    /// pattern.
    pub fn set_processor<F>(&mut self, processor: F)
    where
        F: FnMut(&Capture, &mut Control<'_>) -> Result<(), ProcessError> + 'a,
    {
        self.global = Some(Box::new(processor));
    }

    /// Number of registered patterns.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.states.len()
    }

    /// The pattern registered at `index`.
    #[must_use]
    pub fn pattern(&self, index: usize) -> Option<&Pattern> {
        self.states.get(index).map(|s| &s.pattern)
    }

    /// Scans `input`, delivering captures to the processors.
    ///
    /// With no registered pattern, the whole document is captured as if by
    /// the empty pattern.
    ///
    /// # Errors
    ///
    /// [`MatcherError::Parse`] for malformed input or a failing processor.
    pub fn parse(&mut self, input: &str) -> Result<(), MatcherError> {
        self.run(input, None)
    }

    /// Reads `reader` to the end, then scans it like [`parse`](Self::parse).
    ///
    /// # Errors
    ///
    /// [`MatcherError::Io`] if reading fails, otherwise as for
    /// [`parse`](Self::parse).
    #[cfg(feature = "std")]
    pub fn parse_reader<R: std::io::Read>(&mut self, mut reader: R) -> Result<(), MatcherError> {
        let mut input = alloc::string::String::new();
        reader.read_to_string(&mut input)?;
        self.parse(&input)
    }

    /// Reads the file at `path`, then scans it like [`parse`](Self::parse).
    ///
    /// # Errors
    ///
    /// [`MatcherError::Io`] if reading fails, otherwise as for
    /// [`parse`](Self::parse).
    #[cfg(feature = "std")]
    pub fn parse_file<P: AsRef<std::path::Path>>(&mut self, path: P) -> Result<(), MatcherError> {
        let input = std::fs::read_to_string(path)?;
        self.parse(&input)
    }

    /// Scans `input` and returns what was captured instead of calling
    /// processors.
    ///
    /// With zero or one pattern the result is that pattern's capture. With
    /// several, it is an array indexed like the patterns, holding `null` for
    /// a pattern that captured nothing, or `None` if none of them did.
    ///
    /// ```
    /// use jsonskim::JsonMatcher;
    ///
    /// let mut matcher = JsonMatcher::new();
    /// matcher.add_pattern("**/config/(port)")?;
    /// let port = matcher.parse_value(r#"{"config":{"port":8081}}"#)?;
    /// assert_eq!(port.and_then(|v| v.as_i64()), Some(8081));
    /// # Ok::<(), jsonskim::MatcherError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// [`MatcherError::ProcessTrigger`] if a pattern uses `@`, since its
    /// captures would be delivered mid-scan; otherwise as for
    /// [`parse`](Self::parse).
    pub fn parse_value(&mut self, input: &str) -> Result<Option<Value>, MatcherError> {
        if let Some(index) = self
            .states
            .iter()
            .position(|s| s.pattern.has_process_trigger())
        {
            return Err(MatcherError::ProcessTrigger(index));
        }

        let mut sink = Vec::new();
        self.run(input, Some(&mut sink))?;

        if sink.len() <= 1 {
            return Ok(sink.pop().flatten());
        }
        if sink.iter().all(Option::is_none) {
            return Ok(None);
        }
        let values = sink.into_iter().map(|v| v.unwrap_or(Value::Null)).collect();
        Ok(Some(Value::Array(values)))
    }

    fn run(&mut self, input: &str, sink: Option<&mut Vec<Option<Value>>>) -> Result<(), MatcherError> {
        let implicit = self.states.is_empty();
        if implicit {
            self.states.push(PatternState::new(Pattern::root()));
            self.processors.push(None);
        }

        let result = self.scan(input, sink);

        if implicit {
            self.states.clear();
            self.processors.clear();
        } else {
            for state in &mut self.states {
                state.reset();
            }
        }
        result
    }

    fn scan(&mut self, input: &str, sink: Option<&mut Vec<Option<Value>>>) -> Result<(), MatcherError> {
        let patterns = self.states.len();
        let sink = sink.map(|sink| {
            sink.clear();
            sink.resize(patterns, None);
            sink
        });

        let mut engine = Engine {
            all_stoppable: self.states.iter().all(|s| s.pattern.is_stoppable()),
            states: &mut self.states,
            processors: &mut self.processors,
            global: &mut self.global,
            sink,
            path: Vec::new(),
            halt: Halt::Running,
        };

        Skimmer::new(self.options).skim(input, &mut engine)?;

        if engine.halt != Halt::Running {
            tracing::debug!(halt = ?engine.halt, depth = engine.path.len(), "scan ended early");
        }
        engine.path.clear();
        engine
            .flush()
            .map_err(|e| ParseError::at(input, input.len(), ErrorSource::Processor(e)))?;
        Ok(())
    }
}

/// Per-scan view over the matcher, receiving scanner events.
struct Engine<'m, 'a> {
    states: &'m mut [PatternState],
    processors: &'m mut [Option<Processor<'a>>],
    global: &'m mut Option<Processor<'a>>,
    /// Collects end-of-scan captures instead of calling processors.
    sink: Option<&'m mut Vec<Option<Value>>>,
    path: Vec<Segment>,
    halt: Halt,
    all_stoppable: bool,
}

impl Engine<'_, '_> {
    fn deliver(&mut self, index: usize) -> Result<(), ProcessError> {
        if self.states[index].is_dead() {
            return Ok(());
        }
        let Some(capture) = self.states[index].take_delivery() else {
            return Ok(());
        };
        tracing::trace!(
            pattern = index,
            depth = self.path.len(),
            named = capture.name().is_some(),
            "delivering capture"
        );

        if let Some(sink) = &mut self.sink {
            sink[index] = Some(capture.into_value());
            return Ok(());
        }

        let mut control = Control {
            states: &mut *self.states,
            path: &self.path,
            current: index,
            halt: &mut self.halt,
            rejected: false,
        };
        if let Some(processor) = &mut self.processors[index] {
            processor(&capture, &mut control)?;
        }
        if control.rejected {
            return Ok(());
        }
        if let Some(processor) = self.global.as_mut() {
            processor(&capture, &mut control)?;
        }
        Ok(())
    }

    /// Stores a capture, delivering it right away if it is marked `@`.
    fn store(
        &mut self,
        index: usize,
        slot: usize,
        name: Option<&str>,
        value: Value,
    ) -> Result<(), ProcessError> {
        if self.states[index].store(slot, name, value) {
            self.deliver(index)?;
        }
        if self.all_stoppable
            && self.halt == Halt::Running
            && self.states.iter().all(PatternState::is_satisfied)
        {
            tracing::debug!("all patterns satisfied");
            self.halt = Halt::End;
        }
        Ok(())
    }

    /// Delivers what is still pending, pattern by pattern.
    fn flush(&mut self) -> Result<(), ProcessError> {
        for index in 0..self.states.len() {
            if self.halt == Halt::Stop {
                break;
            }
            self.deliver(index)?;
        }
        Ok(())
    }

    fn flow(&self) -> Flow {
        match self.halt {
            Halt::Running => Flow::Continue,
            Halt::End | Halt::Stop => Flow::Stop,
        }
    }
}

fn text<'t>(token: Option<&Token<'t>>) -> Result<Option<Cow<'t, str>>, ErrorSource> {
    token.map(Token::text).transpose().map_err(ErrorSource::from)
}

/// Decodes `token` the first time a pattern needs it.
fn decoded(cache: &mut Option<Value>, token: &Token<'_>) -> Result<Value, ErrorSource> {
    if let Some(value) = cache {
        return Ok(value.clone());
    }
    let value = token.to_value()?;
    *cache = Some(value.clone());
    Ok(value)
}

impl SkimHandler for Engine<'_, '_> {
    fn enter(&mut self, name: Option<&Token<'_>>, kind: ContainerKind) -> Result<Flow, ErrorSource> {
        let name = text(name)?;
        let name = name.as_deref();
        self.path.push(Segment::new(name, kind));
        let root = self.path.len() == 1;

        for index in 0..self.states.len() {
            let state = &mut self.states[index];
            if state.in_subtree() {
                state.subtree_enter(name, kind);
                continue;
            }
            if state.is_dead() {
                state.enter_dead();
                continue;
            }

            let plan = state.plan_enter(name, root);
            if plan.emit {
                self.deliver(index).map_err(ErrorSource::Processor)?;
            }
            for &slot in &plan.keys {
                if self.states[index].is_dead() || self.halt == Halt::Stop {
                    break;
                }
                let key = Value::String(name.unwrap_or_default().into());
                self.store(index, slot, name, key)
                    .map_err(ErrorSource::Processor)?;
            }
            self.states[index].open(plan, name, kind);

            if self.halt != Halt::Running {
                break;
            }
        }
        Ok(self.flow())
    }

    fn value(&mut self, name: Option<&Token<'_>>, token: &Token<'_>) -> Result<Flow, ErrorSource> {
        let name = text(name)?;
        let name = name.as_deref();
        let root = self.path.is_empty();
        let mut value = None;

        for index in 0..self.states.len() {
            let state = &mut self.states[index];
            if state.in_subtree() {
                state.subtree_value(name, decoded(&mut value, token)?);
                continue;
            }
            if state.is_dead() {
                continue;
            }

            for slot in state.leaf_slots(name, root) {
                if self.states[index].is_dead() || self.halt == Halt::Stop {
                    break;
                }
                let captured = if self.states[index].is_keys_slot(slot) {
                    Value::String(name.unwrap_or_default().into())
                } else {
                    decoded(&mut value, token)?
                };
                self.store(index, slot, name, captured)
                    .map_err(ErrorSource::Processor)?;
            }

            if self.halt != Halt::Running {
                break;
            }
        }
        Ok(self.flow())
    }

    fn exit(&mut self, _kind: ContainerKind) -> Result<Flow, ErrorSource> {
        for index in 0..self.states.len() {
            let state = &mut self.states[index];
            if state.in_subtree() {
                if let Some((slot, name, value)) = state.subtree_exit() {
                    self.store(index, slot, name.as_deref(), value)
                        .map_err(ErrorSource::Processor)?;
                }
            } else {
                if state.delivers_on_exit() {
                    self.deliver(index).map_err(ErrorSource::Processor)?;
                }
                self.states[index].exit();
            }

            if self.halt != Halt::Running {
                break;
            }
        }

        self.path.pop();
        let depth = self.path.len();
        for state in self.states.iter_mut() {
            state.revive(depth);
        }
        Ok(self.flow())
    }
}
