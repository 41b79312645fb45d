//! The strategy latch: a once-set discipline over which free-block index
//! backs the general heap.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    First,
    Next,
    Best,
    Worst,
}

impl Strategy {
    #[inline]
    pub fn uses_tree(self) -> bool {
        matches!(self, Strategy::Best | Strategy::Worst)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::First => "first-fit",
            Strategy::Next => "next-fit",
            Strategy::Best => "best-fit",
            Strategy::Worst => "worst-fit",
        };
        write!(f, "{name}")
    }
}

/// Latch a process-wide strategy choice. The first call wins; any later
/// call naming a different strategy is a programmer error and aborts the
/// process — strategies may never mix because the index representation
/// (list vs. tree) is mutually exclusive.
pub fn latch(current: &mut Option<Strategy>, requested: Strategy) {
    match *current {
        None => {
            log::debug!("[strategy] latching to {requested}");
            *current = Some(requested);
        }
        Some(existing) if existing == requested => {}
        Some(existing) => {
            log::error!(
                "[strategy] conflict: process already latched to {existing}, rejecting {requested}"
            );
            panic!("strata-alloc: strategy conflict ({existing} already latched, {requested} requested)");
        }
    }
}
