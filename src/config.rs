//! Compile-time tuning knobs for the allocator.
//!
//! These mirror the `#define`-style constants of the original single-header
//! implementation this crate generalizes: a minimum arena size, the payload
//! alignment every strategy-driven pointer honors, and the buddy pool's
//! order ceiling.

/// Minimum bytes requested from the OS for any one arena (1 MiB).
pub const ARENA_MIN: usize = 1 << 20;

/// Payload alignment for the four strategy-driven allocators.
pub const ALIGN: usize = 16;

/// Starting order of the buddy pool (2^22 = 4 MiB) before oversize growth.
pub const BUDDY_INIT_ORDER: usize = 22;

/// Hard ceiling on the buddy pool's order (2^26 = 64 MiB).
pub const BUDDY_MAX_ORDER: usize = 26;

/// Round `x` up to the next multiple of `align` (`align` must be a power of two).
#[inline]
pub const fn align_up(x: usize, align: usize) -> usize {
    (x + (align - 1)) & !(align - 1)
}
