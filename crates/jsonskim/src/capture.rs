use alloc::string::String;
use core::fmt;

use crate::value::Value;

/// A value delivered to a processor.
///
/// When a delivery holds a single capture, `value` is that capture and
/// `name` is the member it was read from. When several captures are
/// delivered together, `value` is an object keyed by member name and `name`
/// is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    name: Option<String>,
    value: Value,
}

impl Capture {
    pub(crate) fn new(name: Option<String>, value: Value) -> Self {
        Self { name, value }
    }

    /// The member name the value was captured from, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the capture was read from the member called `name`.
    #[must_use]
    pub fn name_equals(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// The captured value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Takes the captured value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }
}

impl fmt::Display for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}
