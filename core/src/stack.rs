//! Stack growth for deep recursion.
//!
//! Evaluation, rendering, and encoding all recurse on the nesting of a value.
//! Wrapping each recursive step in [`ensure_sufficient_stack`] moves the
//! limit from the native stack to the explicit depth guard of the evaluator.

/// If less than this much stack remains, grow it before recursing.
const RED_ZONE: usize = 128 * 1024;

/// Stack segment allocated on each growth.
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if it is close to exhausted.
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
