//! A request too large for one arena forces the heap to map a second
//! one and still succeed, rather than failing because the first arena
//! is exhausted.

use strata_alloc::{ARENA_MIN, Strategy, alloc_first_fit, allocator_init, free};

#[test]
fn oversize_request_grows_a_second_arena_and_succeeds() {
    let _ = env_logger::try_init();
    allocator_init(Strategy::First);

    // Touch the heap once so the first (ARENA_MIN-sized) arena exists.
    let warmup = alloc_first_fit(64);
    assert!(!warmup.is_null());

    let big_size = ARENA_MIN + ARENA_MIN / 2;
    let big = alloc_first_fit(big_size);
    assert!(!big.is_null(), "an oversize request must trigger arena growth, not fail");

    // SAFETY: big is valid for big_size bytes, spanning whatever new
    // arena was mapped to satisfy it.
    unsafe {
        big.write_bytes(0x9, big_size);
        assert_eq!(*big, 0x9);
        assert_eq!(*big.add(big_size - 1), 0x9);
        free(warmup);
        free(big);
    }
}
