//! Page source: the OS page-mapping primitive and the arena chain.
//!
//! `map_region` realizes the abstract "map N pages, or fail" primitive
//! as an anonymous, private `mmap`. Arenas are never split or unmapped
//! during process life — the allocator grows monotonically.

use crate::error::AllocError;
use core::ptr::NonNull;

#[repr(C)]
pub struct Arena {
    pub next: Option<NonNull<Arena>>,
    /// Total bytes mapped for this arena, including the `Arena` header.
    pub size: usize,
}

/// Map `len` anonymous, read/write bytes from the OS.
///
/// # Safety
/// `len` must be non-zero.
pub unsafe fn map_region(len: usize) -> Result<NonNull<u8>, AllocError> {
    // SAFETY: MAP_PRIVATE | MAP_ANONYMOUS with a null fd and zero offset is
    // always a well-formed request for an anonymous mapping.
    let mem = unsafe {
        libc::mmap(
            core::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if mem == libc::MAP_FAILED {
        log::debug!("[arena] mmap({len} bytes) denied by OS");
        return Err(AllocError::OutOfMemory);
    }
    // SAFETY: mmap succeeded, so `mem` is a valid non-null mapping.
    Ok(unsafe { NonNull::new_unchecked(mem as *mut u8) })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A mapping request for a reasonable size succeeds and is writable.
    #[test]
    fn test_map_region_succeeds_and_is_writable() {
        let len = 4096;
        // SAFETY: len is non-zero.
        let mem = unsafe { map_region(len) }.expect("mapping should succeed");
        // SAFETY: mem is valid for `len` bytes per map_region's contract.
        unsafe {
            mem.as_ptr().write_bytes(0xAB, len);
            assert_eq!(*mem.as_ptr(), 0xAB);
            libc::munmap(mem.as_ptr() as *mut libc::c_void, len);
        }
    }
}
