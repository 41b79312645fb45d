//! The process-wide allocator singleton and its public, C-ABI-flavored
//! surface: raw pointers in, raw pointers out, null on failure, never a
//! `Result` or a panic for anything but a genuine programmer error
//! (mixing strategies).
//!
//! Concurrency model: exactly one mutator. The singleton is guarded by
//! [`OnceLock`] only to make first-touch initialization race-free; there
//! is no further locking on the hot path, since thread safety across
//! concurrent allocation calls is explicitly out of scope.

use crate::buddy::BuddyPool;
use crate::general::GeneralHeap;
use crate::index::Index;
use crate::strategy::{Strategy, latch};
use core::cell::UnsafeCell;
use core::ptr::NonNull;
use std::sync::OnceLock;

pub struct Allocator {
    strategy: Option<Strategy>,
    general: Option<GeneralHeap>,
    buddy: BuddyPool,
}

impl Allocator {
    const fn new() -> Self {
        Self {
            strategy: None,
            general: None,
            buddy: BuddyPool::new(),
        }
    }

    fn general_for(&mut self, strategy: Strategy) -> &mut GeneralHeap {
        latch(&mut self.strategy, strategy);
        self.general
            .get_or_insert_with(|| GeneralHeap::new(Index::for_strategy(strategy)))
    }

    fn allocate(&mut self, strategy: Strategy, size: usize) -> *mut u8 {
        self.general_for(strategy)
            .allocate(strategy, size)
            .map_or(core::ptr::null_mut(), NonNull::as_ptr)
    }

    fn allocate_buddy(&mut self, size: usize) -> *mut u8 {
        self.buddy
            .alloc(size)
            .map_or(core::ptr::null_mut(), NonNull::as_ptr)
    }

    /// Unified free: classify `ptr` as buddy or general, then dispatch.
    /// Null is a no-op. A pointer the buddy classifier rejects falls
    /// through to the general free, which is itself double-free-safe.
    ///
    /// # Safety
    /// `ptr`, if non-null, must have been produced by one of this
    /// allocator's allocation functions and not already fully freed (a
    /// buddy block, once merged and re-split, is a fresh allocation; a
    /// general block double-free is tolerated as a silent no-op, but a
    /// use-after-free write before calling this is still undefined
    /// behavior, as in any manual allocator).
    unsafe fn free(&mut self, ptr: *mut u8) {
        let Some(ptr) = NonNull::new(ptr) else {
            return;
        };
        if self.buddy.classify(ptr).is_some() {
            // SAFETY: classify confirmed this is a live buddy allocation.
            unsafe { self.buddy.free(ptr) };
            return;
        }
        if let Some(general) = self.general.as_mut() {
            // SAFETY: caller guarantees ptr is either a live general
            // allocation or already-freed (free_general tolerates that).
            unsafe { general.free(ptr) };
        }
    }
}

/// Process-wide singleton. `UnsafeCell` because the public functions below
/// hand out `&mut Allocator` on every call under the single-mutator
/// assumption documented on [`Allocator`]; `OnceLock` only serializes the
/// one-time construction, not subsequent access.
struct AllocatorCell(UnsafeCell<Allocator>);

// SAFETY: access to the inner `Allocator` is never actually concurrent —
// this crate's non-goal is thread safety, and callers are expected to
// uphold the single-mutator contract documented at the crate root.
unsafe impl Sync for AllocatorCell {}

static ALLOCATOR: OnceLock<AllocatorCell> = OnceLock::new();

fn allocator() -> &'static mut Allocator {
    let cell = ALLOCATOR.get_or_init(|| AllocatorCell(UnsafeCell::new(Allocator::new())));
    // SAFETY: single-mutator contract (documented on `Allocator`); no two
    // calls into this crate's public API may run concurrently.
    unsafe { &mut *cell.0.get() }
}

/// Reset the global allocator to a fresh, unlatched state. Exposed only
/// for test harnesses that want one strategy per test within a single
/// process instead of forking — production callers never need this.
///
/// # Safety
/// Every pointer previously handed out by this allocator becomes
/// dangling with respect to its bookkeeping the moment this is called;
/// the caller must not free any of them afterward.
pub unsafe fn reset_for_tests() {
    *allocator() = Allocator::new();
}

/// Explicitly latch a strategy before the first allocation under it.
/// Optional: the strategy-specific `alloc_*` functions latch implicitly
/// on first use. Present mainly so callers can fail fast at a known
/// point rather than on their first allocation.
pub fn allocator_init(strategy: Strategy) {
    latch(&mut allocator().strategy, strategy);
}

pub fn alloc_first_fit(size: usize) -> *mut u8 {
    allocator().allocate(Strategy::First, size)
}

pub fn alloc_next_fit(size: usize) -> *mut u8 {
    allocator().allocate(Strategy::Next, size)
}

pub fn alloc_best_fit(size: usize) -> *mut u8 {
    allocator().allocate(Strategy::Best, size)
}

pub fn alloc_worst_fit(size: usize) -> *mut u8 {
    allocator().allocate(Strategy::Worst, size)
}

/// Independent of the strategy latch: buddy allocations never touch it.
pub fn alloc_buddy(size: usize) -> *mut u8 {
    allocator().allocate_buddy(size)
}

/// Unified free. Null-safe; see [`Allocator::free`] for the dispatch
/// contract.
///
/// # Safety
/// `ptr`, if non-null, must have been returned by one of this crate's
/// `alloc_*` functions and not already passed to `free` after a buddy
/// merge consumed it.
pub unsafe fn free(ptr: *mut u8) {
    // SAFETY: forwarded, same precondition.
    unsafe { allocator().free(ptr) };
}

/// Guards every unit test that touches the process-global [`ALLOCATOR`].
/// `cargo test` runs the unit tests of one crate in one process across
/// several threads by default; without this, two such tests calling
/// `reset_for_tests`/`alloc_*`/`free` concurrently would race on the
/// same singleton, violating the single-mutator contract documented on
/// [`Allocator`]. Exposed `pub(crate)` so [`crate::tests`] can share it.
#[cfg(test)]
pub(crate) static GLOBAL_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
