//! The block header and the physical chain.
//!
//! A [`Block`] is the atomic unit of the general heap: a header plus a
//! payload, laid out in-place inside arena memory. Free-block metadata
//! (the free-list successor, and the AVL left/right/height fields) lives
//! in the same struct as the physical-chain links, per the header's
//! design note — a block is either free (owned by exactly one index) or
//! allocated (owned by the user), never both, so the list and tree fields
//! are never simultaneously meaningful.

use crate::config::{ALIGN, align_up};
use bitflags::bitflags;
use core::ptr::NonNull;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BlockFlags: u8 {
        /// Block is on a free index; absent means allocated to the user.
        const FREE = 1 << 0;
    }
}

#[repr(C)]
pub struct Block {
    /// Payload size in bytes, a multiple of `ALIGN`.
    pub size: usize,
    pub flags: BlockFlags,
    /// Physical chain (address order within one arena).
    pub prev_phys: Option<NonNull<Block>>,
    pub next_phys: Option<NonNull<Block>>,
    /// Free-list index successor; meaningful only while `flags` has `FREE`
    /// and the list index is the active one.
    pub next_free: Option<NonNull<Block>>,
    /// AVL tree fields; meaningful only while `flags` has `FREE` and the
    /// tree index is the active one.
    pub tree_left: Option<NonNull<Block>>,
    pub tree_right: Option<NonNull<Block>>,
    pub tree_height: i32,
}

/// Header size, aligned up to `ALIGN`. The user pointer is always
/// `block_base + HDR`.
pub fn hdr_size() -> usize {
    align_up(core::mem::size_of::<Block>(), ALIGN)
}

impl Block {
    /// Initialize a fresh free block of `size` bytes at `base`, with no
    /// physical neighbors yet wired up.
    ///
    /// # Safety
    /// `base` must point to at least `hdr_size() + size` writable bytes.
    pub unsafe fn init_free(base: NonNull<Block>, size: usize) {
        // SAFETY: caller guarantees `base` is valid for a `Block` write.
        unsafe {
            base.as_ptr().write(Block {
                size,
                flags: BlockFlags::FREE,
                prev_phys: None,
                next_phys: None,
                next_free: None,
                tree_left: None,
                tree_right: None,
                tree_height: 1,
            });
        }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.flags.contains(BlockFlags::FREE)
    }

    #[inline]
    pub fn mark_free(&mut self) {
        self.flags.insert(BlockFlags::FREE);
    }

    #[inline]
    pub fn mark_allocated(&mut self) {
        self.flags.remove(BlockFlags::FREE);
    }

    /// Reset the free-metadata fields. Called before a block is reinserted
    /// into whichever index is active, so stale links from a previous
    /// membership never leak into the new one.
    #[inline]
    pub fn reset_free_links(&mut self) {
        self.next_free = None;
        self.tree_left = None;
        self.tree_right = None;
        self.tree_height = 1;
    }

    /// Address identity used as the tiebreaker key everywhere a total
    /// order over blocks is needed (tree key, free-list ordering).
    #[inline]
    pub fn address(this: NonNull<Block>) -> usize {
        this.as_ptr() as usize
    }
}

/// User pointer for a block base.
#[inline]
pub fn block_to_ptr(block: NonNull<Block>) -> NonNull<u8> {
    // SAFETY: offsetting within the same allocation by a fixed, in-bounds
    // header size; the result is non-null because `block` is non-null and
    // `hdr_size()` is a small positive constant.
    unsafe { NonNull::new_unchecked((block.as_ptr() as *mut u8).add(hdr_size())) }
}

/// Recover the owning block header from a user pointer.
///
/// # Safety
/// `ptr` must have been produced by [`block_to_ptr`] on a still-live block.
pub unsafe fn ptr_to_block(ptr: NonNull<u8>) -> NonNull<Block> {
    // SAFETY: caller guarantees `ptr` is `block_to_ptr(block) `for some
    // live `block`, so subtracting the header size recovers it exactly.
    unsafe { NonNull::new_unchecked(ptr.as_ptr().sub(hdr_size()) as *mut Block) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::alloc::{Layout, alloc, dealloc};

    fn scratch_block(size: usize) -> (NonNull<Block>, Layout) {
        let layout = Layout::from_size_align(hdr_size() + size, ALIGN).unwrap();
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc(layout) };
        let base = NonNull::new(raw as *mut Block).unwrap();
        // SAFETY: `base` is valid for `hdr_size() + size` bytes, just allocated.
        unsafe { Block::init_free(base, size) };
        (base, layout)
    }

    /// A fresh block is free and round-trips through the pointer conversions.
    #[test]
    fn test_new_block_is_free_and_roundtrips() {
        let (base, layout) = scratch_block(256);
        // SAFETY: base still valid.
        unsafe {
            assert!(base.as_ref().is_free());
            let user = block_to_ptr(base);
            assert_eq!(ptr_to_block(user), base);
            dealloc(base.as_ptr() as *mut u8, layout);
        }
    }

    /// Marking allocated clears the free flag; marking free restores it.
    #[test]
    fn test_mark_allocated_and_free() {
        let (mut base, layout) = scratch_block(64);
        // SAFETY: base still valid.
        unsafe {
            base.as_mut().mark_allocated();
            assert!(!base.as_ref().is_free());
            base.as_mut().mark_free();
            assert!(base.as_ref().is_free());
            dealloc(base.as_ptr() as *mut u8, layout);
        }
    }

    #[test]
    fn test_hdr_size_is_align_multiple() {
        assert_eq!(hdr_size() % ALIGN, 0);
        assert!(hdr_size() >= core::mem::size_of::<Block>());
    }
}
