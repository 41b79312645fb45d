//! Internal error surface.
//!
//! The public API (§6/§7 of the design doc) never returns a `Result` — it
//! hands back a null pointer on any recoverable failure, matching the
//! C-ABI-flavored contract this crate generalizes. `AllocError` exists only
//! at the one internal boundary that can fail for a documented reason (OS
//! page mapping); callers fold `Err` to `None`/null immediately.

use core::fmt;

/// Internal failure at the page-mapping boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// `mmap` denied the requested arena or buddy pool.
    OutOfMemory,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::OutOfMemory => write!(f, "OS denied the requested page mapping"),
        }
    }
}

impl std::error::Error for AllocError {}
