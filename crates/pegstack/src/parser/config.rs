/// Configuration options for a parse.
///
/// # Example
///
/// ```rust
/// use pegstack::ParserConfig;
///
/// let config = ParserConfig {
///     recovery: true,    // run a recovery pass after a failed parse
///     max_depth: 512,    // nested rule invocations before aborting
///     ..ParserConfig::default()
/// };
/// assert!(config.memoization);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Honour [`RuleOptions::memo_mismatches`](crate::RuleOptions::memo_mismatches)
    ///
    /// When enabled, a rule marked for memoization that failed at a position
    /// fails immediately when invoked there again.
    pub memoization: bool,

    /// Memoized mismatches kept before the table is cleared
    pub max_memo_entries: usize,

    /// Run a recovery pass when the parse fails
    pub recovery: bool,

    /// Stand-in matches allowed during one recovery pass
    pub max_recovered_errors: usize,

    /// Nested rule invocations allowed before the parse is aborted with
    /// [`ParseError::RecursionLimit`](crate::ParseError::RecursionLimit)
    ///
    /// The engine grows its stack on demand, so the limit holds on threads
    /// with small stacks too.
    pub max_depth: usize,

    /// Build a [`ParseNode`](crate::ParseNode) tree of the rules that matched
    pub build_parse_tree: bool,

    /// Mirror parse events to `log::trace!`
    pub trace_events: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            memoization: true,
            max_memo_entries: 100_000,
            recovery: false,
            max_recovered_errors: 100,
            max_depth: 256,
            build_parse_tree: false,
            trace_events: false,
        }
    }
}
