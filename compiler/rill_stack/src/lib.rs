//! Stack growth for the recursive passes of the Rill pipeline.
//!
//! The parser, every analysis pass and the evaluator walk trees recursively.
//! Deeply nested source (long `else if` chains, nested lists, recursive
//! functions) would exhaust the native stack, so each recursive entry point
//! wraps its body in [`with_stack`].
//!
//! On native targets the `stacker` crate allocates a fresh segment once less
//! than [`RED_ZONE`] bytes remain. WASM manages its own stack and the guard is
//! a plain call there.

/// Remaining stack below which a new segment is allocated.
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
pub const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if the red zone has been reached.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// Run `f` directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Remaining stack in bytes, when the platform can report it.
#[cfg(not(target_arch = "wasm32"))]
pub fn remaining() -> Option<usize> {
    stacker::remaining_stack()
}
