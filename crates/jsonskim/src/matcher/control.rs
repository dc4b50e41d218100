use alloc::string::String;

use super::{Halt, path::Segment, state::PatternState};
use crate::error::MatcherError;

/// Steering handed to processors while a capture is delivered.
///
/// Through it a processor can inspect where in the document the delivery
/// happens, and influence the rest of the scan:
///
/// - [`reject`](Self::reject) stops a pattern from matching anything more in
///   the current container;
/// - [`clear`](Self::clear) drops captures that are pending but not yet
///   delivered;
/// - [`end`](Self::end) and [`stop`](Self::stop) finish the scan early.
///
/// ```
/// use jsonskim::JsonMatcher;
///
/// let json = r#"[{"type":"a","id":1},{"type":"b","id":2}]"#;
/// let mut ids = Vec::new();
/// {
///     let mut matcher = JsonMatcher::new();
///     matcher.add_pattern_with("(type@)", |capture, control| {
///         if capture.value().as_str() == Some("a") {
///             control.reject_all();
///         }
///         Ok(())
///     })?;
///     matcher.add_pattern_with("(id@)", |capture, _| {
///         ids.push(capture.value().as_i64());
///         Ok(())
///     })?;
///     matcher.parse(json)?;
/// }
/// assert_eq!(ids, [Some(2)]);
/// # Ok::<(), jsonskim::MatcherError>(())
/// ```
pub struct Control<'c> {
    pub(super) states: &'c mut [PatternState],
    pub(super) path: &'c [Segment],
    pub(super) current: usize,
    pub(super) halt: &'c mut Halt,
    pub(super) rejected: bool,
}

impl Control<'_> {
    /// Index of the pattern whose capture is being delivered.
    #[must_use]
    pub fn pattern(&self) -> usize {
        self.current
    }

    /// Makes the current pattern ignore the rest of the innermost open
    /// container. Processors after this one are not called for the current
    /// delivery.
    pub fn reject(&mut self) {
        self.reject_state(self.current);
    }

    /// Like [`reject`](Self::reject), for pattern `index`.
    ///
    /// # Errors
    ///
    /// [`MatcherError::UnknownPattern`] if no pattern has that index.
    pub fn reject_pattern(&mut self, index: usize) -> Result<(), MatcherError> {
        if index >= self.states.len() {
            return Err(MatcherError::UnknownPattern(index));
        }
        self.reject_state(index);
        Ok(())
    }

    /// Like [`reject`](Self::reject), for every pattern.
    pub fn reject_all(&mut self) {
        for index in 0..self.states.len() {
            self.reject_state(index);
        }
    }

    fn reject_state(&mut self, index: usize) {
        let depth = self.path.len();
        tracing::trace!(pattern = index, depth, "rejected");
        self.states[index].reject(depth);
        if index == self.current {
            self.rejected = true;
        }
    }

    /// Drops the pending captures of the current pattern.
    pub fn clear(&mut self) {
        self.states[self.current].clear();
    }

    /// Drops the pending captures of pattern `index`.
    ///
    /// # Errors
    ///
    /// [`MatcherError::UnknownPattern`] if no pattern has that index.
    pub fn clear_pattern(&mut self, index: usize) -> Result<(), MatcherError> {
        self.states
            .get_mut(index)
            .ok_or(MatcherError::UnknownPattern(index))?
            .clear();
        Ok(())
    }

    /// Drops the pending captures of every pattern.
    pub fn clear_all(&mut self) {
        for state in self.states.iter_mut() {
            state.clear();
        }
    }

    /// Stops scanning. Pending captures are still delivered.
    pub fn end(&mut self) {
        if *self.halt == Halt::Running {
            *self.halt = Halt::End;
        }
    }

    /// Stops scanning and drops every pending capture.
    pub fn stop(&mut self) {
        *self.halt = Halt::Stop;
    }

    /// Number of open containers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// The open containers, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        self.path
    }

    /// The open containers joined with `/`, such as `[]/{}/devices/{}`.
    #[must_use]
    pub fn path(&self) -> String {
        super::path::join(self.path)
    }

    /// The innermost open container.
    #[must_use]
    pub fn parent(&self) -> Option<&Segment> {
        self.path.last()
    }

    /// The container `n` levels above [`parent`](Self::parent).
    #[must_use]
    pub fn parent_at(&self, n: usize) -> Option<&Segment> {
        let index = self.path.len().checked_sub(n)?.checked_sub(1)?;
        self.path.get(index)
    }
}
