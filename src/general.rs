//! Split, coalesce, and the general-heap allocation/free paths.
//!
//! These operate on whichever index the strategy latch has selected,
//! without caring which one it is — block surgery is size-agnostic.

use crate::arena::{Arena, map_region};
use crate::block::{Block, block_to_ptr, hdr_size, ptr_to_block};
use crate::config::{ALIGN, ARENA_MIN, align_up};
use crate::error::AllocError;
use crate::index::Index;
use core::ptr::NonNull;

/// One arena plus the index it feeds. Owned by the top-level `Allocator`.
pub struct GeneralHeap {
    pub arenas: Option<NonNull<Arena>>,
    pub index: Index,
}

impl GeneralHeap {
    pub fn new(index: Index) -> Self {
        Self {
            arenas: None,
            index,
        }
    }

    /// Map a new arena sized to hold at least `min_usable` payload bytes,
    /// link it at the head of the arena chain, and insert its one initial
    /// free block into the active index.
    fn grow(&mut self, min_usable: usize) -> Result<(), AllocError> {
        let need = align_up(
            (core::mem::size_of::<Arena>() + hdr_size() + min_usable).max(ARENA_MIN),
            ALIGN,
        );
        // SAFETY: need is non-zero.
        let mem = unsafe { map_region(need) }?;
        let arena_ptr = mem.cast::<Arena>();
        // SAFETY: mem is valid for `need` bytes, just mapped.
        unsafe {
            arena_ptr.as_ptr().write(Arena {
                next: self.arenas,
                size: need,
            });
        }
        self.arenas = Some(arena_ptr);

        let block_base = {
            // SAFETY: mem is valid for `need` bytes; Arena occupies the prefix.
            let raw = unsafe { mem.as_ptr().add(core::mem::size_of::<Arena>()) };
            NonNull::new(raw as *mut Block).expect("arena mapping is non-null")
        };
        let usable = need - core::mem::size_of::<Arena>() - hdr_size();
        // SAFETY: block_base is valid for hdr_size() + usable bytes within the mapping.
        unsafe { Block::init_free(block_base, usable) };
        log::debug!("[arena] mapped {need} bytes, {usable} usable, base={block_base:p}");

        // SAFETY: block_base was just initialized and is linked nowhere else.
        unsafe { self.index.insert(block_base) };
        Ok(())
    }

    /// `allocate_general`: round up, find-or-grow, split, return the user
    /// pointer. Null (here, `None`) on zero-size requests or OOM.
    pub fn allocate(&mut self, strategy: crate::strategy::Strategy, size: usize) -> Option<NonNull<u8>> {
        if size == 0 {
            return None;
        }
        let need = align_up(size, ALIGN);

        let block = match self.index.find(strategy, need) {
            Some(b) => b,
            None => {
                self.grow(need).ok()?;
                self.index.find(strategy, need)?
            }
        };
        // SAFETY: block came from the active index, so it is currently a member.
        unsafe { self.index.remove(block) };
        let allocated = split(block, need, &mut self.index);
        // SAFETY: allocated is an exclusively-owned block about to leave the index.
        unsafe { allocated.as_ptr().as_mut().unwrap().mark_allocated() };
        Some(block_to_ptr(allocated))
    }

    /// `free_general`: null-safe, idempotent on double free.
    ///
    /// # Safety
    /// `ptr`, if non-null, must have been produced by [`Self::allocate`]
    /// on this heap and not already coalesced away.
    pub unsafe fn free(&mut self, ptr: NonNull<u8>) {
        // SAFETY: caller guarantees ptr was produced by `allocate`.
        let mut block = unsafe { ptr_to_block(ptr) };
        // SAFETY: block is a live header.
        if unsafe { block.as_ref().is_free() } {
            return; // double free: silent no-op
        }
        // SAFETY: block is a live header.
        unsafe { block.as_mut().mark_free() };
        coalesce(block, &mut self.index);
    }
}

/// Split a chosen free block of size `B` for a request of (aligned) size
/// `N`. Returns the (possibly unchanged) block sized exactly `N`, with any
/// leftover remainder spliced into the physical chain and reinserted into
/// the index.
fn split(mut block: NonNull<Block>, need: usize, index: &mut Index) -> NonNull<Block> {
    // SAFETY: block is exclusively owned by the caller here (just removed from the index).
    let b_size = unsafe { block.as_ref().size };
    let remainder = b_size - need;
    if remainder < hdr_size() + ALIGN {
        return block; // no room for a standalone remainder; slack goes to the user
    }

    // SAFETY: block is a valid header with `b_size` usable bytes following it.
    let remainder_base = unsafe {
        NonNull::new_unchecked((block.as_ptr() as *mut u8).add(hdr_size() + need) as *mut Block)
    };
    let remainder_size = remainder - hdr_size();
    // SAFETY: remainder_base lies within block's own payload, which is valid for b_size bytes.
    unsafe { Block::init_free(remainder_base, remainder_size) };

    // SAFETY: block is a live header being resized.
    let old_next = unsafe { block.as_ref().next_phys };
    // SAFETY: remainder_base was just initialized.
    unsafe {
        let mut r = remainder_base;
        r.as_mut().prev_phys = Some(block);
        r.as_mut().next_phys = old_next;
    }
    if let Some(mut next) = old_next {
        // SAFETY: next is a live physical-chain neighbor.
        unsafe { next.as_mut().prev_phys = Some(remainder_base) };
    }
    // SAFETY: block is a live header being resized.
    unsafe {
        block.as_mut().next_phys = Some(remainder_base);
        block.as_mut().size = need;
    }
    // SAFETY: remainder_base is freshly initialized and linked nowhere else.
    unsafe { index.insert(remainder_base) };
    block
}

/// Coalesce a just-freed block with any free physical neighbors, then
/// insert the (possibly extended) result into the index. After this call,
/// no two adjacent free blocks exist anywhere in the arena.
fn coalesce(mut block: NonNull<Block>, index: &mut Index) {
    // SAFETY: block is a live header, exclusively owned here (freshly marked free).
    let prev = unsafe { block.as_ref().prev_phys };
    if let Some(mut prev) = prev {
        // SAFETY: prev is a live physical-chain neighbor.
        if unsafe { prev.as_ref().is_free() } {
            // SAFETY: prev is currently a member of the index (it is free).
            unsafe { index.remove(prev) };
            // SAFETY: both prev and block are live headers.
            unsafe {
                prev.as_mut().size += hdr_size() + block.as_ref().size;
                let new_next = block.as_ref().next_phys;
                prev.as_mut().next_phys = new_next;
                if let Some(mut next) = new_next {
                    next.as_mut().prev_phys = Some(prev);
                }
            }
            block = prev;
        }
    }

    // SAFETY: block is a live header.
    let next = unsafe { block.as_ref().next_phys };
    if let Some(next) = next {
        // SAFETY: next is a live physical-chain neighbor.
        if unsafe { next.as_ref().is_free() } {
            // SAFETY: next is currently a member of the index (it is free).
            unsafe { index.remove(next) };
            // SAFETY: both block and next are live headers.
            unsafe {
                let mut block_mut = block;
                block_mut.as_mut().size += hdr_size() + next.as_ref().size;
                let new_next = next.as_ref().next_phys;
                block_mut.as_mut().next_phys = new_next;
                if let Some(mut nn) = new_next {
                    nn.as_mut().prev_phys = Some(block);
                }
            }
        }
    }

    // SAFETY: block is a live header, exclusively owned here.
    unsafe {
        block.as_mut().reset_free_links();
        block.as_mut().mark_free();
        index.insert(block);
    }
}
