/// Configuration options for the scanner and the matcher built on it.
///
/// The defaults accept the relaxed, hand-edited flavour of JSON: comments,
/// unquoted names and values, trailing commas and newline-separated members
/// without commas. Set [`strict`](Self::strict) to accept RFC 8259 JSON only.
///
/// # Default
///
/// All options default to `false` / `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkimOptions {
    /// Whether to accept only standard JSON.
    ///
    /// When `true`, comments, unquoted names, trailing commas and missing
    /// commas are syntax errors, and an unquoted value must be `true`,
    /// `false`, `null` or a JSON number.
    ///
    /// # Examples
    ///
    /// Accepted only when `strict` is `false`:
    ///
    /// ```text
    /// {
    ///     // device inventory
    ///     type: ENCHARGE,
    ///     devices: [ { serial_num: 32131444 }, ]
    /// }
    /// ```
    ///
    /// # Default
    ///
    /// `false`
    pub strict: bool,

    /// Maximum container nesting depth.
    ///
    /// Opening a container deeper than this is a syntax error. `None` leaves
    /// nesting unbounded, which is fine for trusted input; untrusted input
    /// should set a limit since the scanner keeps one frame per open
    /// container.
    ///
    /// # Default
    ///
    /// `None`
    pub max_depth: Option<usize>,
}
