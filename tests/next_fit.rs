//! Next-fit's distinguishing behavior: the scan resumes from wherever it
//! last left off rather than restarting at the arena head.

use strata_alloc::{Strategy, alloc_next_fit, allocator_init, free};

#[test]
fn next_fit_reuses_freed_space_and_keeps_scanning_forward() {
    let _ = env_logger::try_init();
    allocator_init(Strategy::Next);
    let p1 = alloc_next_fit(128);
    let p2 = alloc_next_fit(128);
    let p3 = alloc_next_fit(128);
    assert!(!p1.is_null() && !p2.is_null() && !p3.is_null());

    // SAFETY: p1 and p3 are live allocations from this call.
    unsafe {
        free(p1);
        free(p3);
    }
    let p4 = alloc_next_fit(128);
    assert!(!p4.is_null());
    // p4 reuses exactly one of the two freed 128-byte blocks.
    assert!(p4 == p1 || p4 == p3);

    let p5 = alloc_next_fit(128);
    assert!(!p5.is_null());
    let remaining = if p4 == p1 { p3 } else { p1 };
    assert_eq!(p5, remaining, "the cursor should sweep to the other freed block next");

    // SAFETY: p2, p4, p5 are all live allocations.
    unsafe {
        free(p2);
        free(p4);
        free(p5);
    }
}
