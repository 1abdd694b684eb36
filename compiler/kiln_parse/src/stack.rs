//! Stack safety for deep recursion.
//!
//! Nested macro expansions, deeply parenthesized expressions and
//! recursive static calls all recurse on the native stack. Entry points
//! of those recursions run under [`ensure_sufficient_stack`], which grows
//! the stack on demand instead of overflowing.

/// Minimum stack space to keep available before growing (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first when less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
