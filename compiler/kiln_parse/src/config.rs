//! Resource bounds for a parse.

/// Limits applied while parsing, expanding macros and evaluating static
/// code. Every bound turns runaway input into a diagnostic instead of a
/// hang or a crash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of simultaneously active macro expansions.
    pub max_macro_depth: usize,
    /// Maximum number of nested cursor states (expansions, splices and
    /// deferred bodies together).
    pub max_cursor_depth: usize,
    /// Maximum nesting of static function calls.
    pub max_eval_depth: usize,
    /// Maximum iterations of an unrolled static `while` or of a loop run
    /// by the evaluator.
    pub max_static_iterations: usize,
    /// Cap on the total number of symbol table entries. `None` means
    /// unbounded; exceeding the cap is reported as out of memory.
    pub entry_limit: Option<usize>,
}

impl ParserConfig {
    pub const DEFAULT_MAX_MACRO_DEPTH: usize = 64;
    pub const DEFAULT_MAX_CURSOR_DEPTH: usize = 256;
    pub const DEFAULT_MAX_EVAL_DEPTH: usize = 256;
    pub const DEFAULT_MAX_STATIC_ITERATIONS: usize = 10_000;

    #[must_use]
    pub fn with_max_macro_depth(mut self, depth: usize) -> Self {
        self.max_macro_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_eval_depth(mut self, depth: usize) -> Self {
        self.max_eval_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_static_iterations(mut self, iterations: usize) -> Self {
        self.max_static_iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_entry_limit(mut self, limit: usize) -> Self {
        self.entry_limit = Some(limit);
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_macro_depth: Self::DEFAULT_MAX_MACRO_DEPTH,
            max_cursor_depth: Self::DEFAULT_MAX_CURSOR_DEPTH,
            max_eval_depth: Self::DEFAULT_MAX_EVAL_DEPTH,
            max_static_iterations: Self::DEFAULT_MAX_STATIC_ITERATIONS,
            entry_limit: None,
        }
    }
}
