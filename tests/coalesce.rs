//! Freeing two physically adjacent blocks must coalesce them so a
//! request spanning their combined size can be satisfied without
//! growing the arena.

use strata_alloc::{Strategy, alloc_first_fit, allocator_init, free};

#[test]
fn freeing_adjacent_blocks_coalesces_into_one_reusable_range() {
    let _ = env_logger::try_init();
    allocator_init(Strategy::First);

    let p1 = alloc_first_fit(128);
    let p2 = alloc_first_fit(128);
    let p3 = alloc_first_fit(128);
    let p4 = alloc_first_fit(128);
    assert!([p1, p2, p3, p4].iter().all(|p| !p.is_null()));

    // SAFETY: p2 and p3 are live, physically adjacent allocations.
    unsafe {
        free(p2);
        free(p3);
    }

    let merged = alloc_first_fit(256);
    assert!(!merged.is_null());
    assert_eq!(
        merged, p2,
        "the merged block should start exactly where the first freed block did"
    );

    // SAFETY: the payload spans what used to be p2's and p3's ranges.
    unsafe {
        merged.write_bytes(0x5, 256);
        assert_eq!(*merged, 0x5);
        assert_eq!(*merged.add(255), 0x5);
        free(p1);
        free(merged);
        free(p4);
    }
}
