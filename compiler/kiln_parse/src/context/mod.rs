//! Context-sensitive parsing flags.
//!
//! Flags describe where the parser currently is (inside a syntax body,
//! inside the lazily parsed body of a static function, inside a loop).
//! They are set for the duration of a sub-parse through
//! [`Parser::with_context`](crate::Parser::with_context), which restores
//! the previous flags when the closure returns.

/// Bitfield of parse-position flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseContext(u16);

impl ParseContext {
    /// No flags set.
    pub const NONE: Self = Self(0);

    /// Inside a function body; `return` is allowed.
    pub const IN_FUNCTION: Self = Self(1 << 0);

    /// Inside a runtime loop; `break` and `continue` are runtime statements.
    pub const IN_LOOP: Self = Self(1 << 1);

    /// Inside an unrolled static loop; `break` and `continue` steer the
    /// unrolling.
    pub const IN_STATIC_LOOP: Self = Self(1 << 2);

    /// Inside a syntax body; `get_statements` and `insert` are allowed.
    pub const IN_SYNTAX_BODY: Self = Self(1 << 3);

    /// Inside the body of a static function being prepared for the
    /// evaluator. Side-effecting built-ins and static calls are emitted as
    /// nodes instead of running at parse time, and static variables are
    /// not folded.
    pub const DEFER_EFFECTS: Self = Self(1 << 4);

    /// Inside a runtime `if` or `while` body. A `return` here belongs to
    /// the enclosing function, not to a syntax body.
    pub const RUNTIME_BRANCH: Self = Self(1 << 5);

    /// Flags that describe the innermost function only.
    pub const FUNCTION_SCOPED: Self = Self(
        Self::IN_FUNCTION.0
            | Self::IN_LOOP.0
            | Self::IN_STATIC_LOOP.0
            | Self::DEFER_EFFECTS.0
            | Self::RUNTIME_BRANCH.0,
    );

    #[inline]
    pub const fn new() -> Self {
        Self::NONE
    }

    #[inline]
    pub const fn has(self, flag: Self) -> bool {
        (self.0 & flag.0) != 0
    }

    #[inline]
    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    #[inline]
    #[must_use]
    pub const fn without(self, flag: Self) -> Self {
        Self(self.0 & !flag.0)
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn in_function(self) -> bool {
        self.has(Self::IN_FUNCTION)
    }

    #[inline]
    pub const fn in_loop(self) -> bool {
        self.has(Self::IN_LOOP)
    }

    #[inline]
    pub const fn in_static_loop(self) -> bool {
        self.has(Self::IN_STATIC_LOOP)
    }

    #[inline]
    pub const fn in_syntax_body(self) -> bool {
        self.has(Self::IN_SYNTAX_BODY)
    }

    #[inline]
    pub const fn defers_effects(self) -> bool {
        self.has(Self::DEFER_EFFECTS)
    }

    #[inline]
    pub const fn in_runtime_branch(self) -> bool {
        self.has(Self::RUNTIME_BRANCH)
    }
}

#[cfg(test)]
mod tests;
