// Owns a growing, never-shrinking sequence of blocks for one element type.
// Allocation scans tail-to-head (the newest block is statistically most
// likely to have room, so the common case is O(1)); deallocation locates
// the owning block by address-range scan, also tail-to-head, so no
// back-pointer is stored per slot.

use std::mem::MaybeUninit;
use std::ptr::NonNull;

use super::bitword::BitWord;
use super::block::Block;
use super::error::PoolAllocError;
use crate::log_debug;
use crate::log_warn;

pub struct MultiPool<T, W: BitWord> {
    blocks: Vec<Box<Block<T, W>>>,
    live_slots: usize,
}

impl<T, W: BitWord> MultiPool<T, W> {
    /// Appends one fresh block, as the allocator's constructor contract
    /// requires. A failure to obtain that first block is as fatal as any
    /// later growth failure, so it is surfaced the same way other OOM paths
    /// in this crate are: via `handle_alloc_error`.
    pub fn new() -> Self {
        match Block::try_new() {
            Ok(block) => Self {
                blocks: vec![Box::new(block)],
                live_slots: 0,
            },
            Err(PoolAllocError::BackingAllocationFailed { layout }) => {
                std::alloc::handle_alloc_error(layout)
            }
        }
    }

    /// Allocates a single slot, growing the multi-pool by one block if every
    /// existing block is full.
    pub fn try_allocate(&mut self) -> Result<NonNull<T>, PoolAllocError> {
        for block in self.blocks.iter().rev() {
            if let Some(ptr) = block.allocate() {
                self.live_slots += 1;
                return Ok(ptr);
            }
        }

        log_debug!(
            super::logger(),
            "pool allocator: all blocks full, growing",
            self.blocks.len() as u64
        );

        let block = Block::try_new()?;
        self.blocks.push(Box::new(block));
        let ptr = self
            .blocks
            .last()
            .expect("just pushed")
            .allocate()
            .expect("freshly grown block must have capacity for at least one slot");
        self.live_slots += 1;
        Ok(ptr)
    }

    /// Allocates a single slot, aborting the process via `handle_alloc_error`
    /// on backing allocation failure — the same convention `Box`/`Vec` use
    /// for OOM in stable Rust, mirroring `PoolHandle::allocate`.
    pub fn allocate(&mut self) -> NonNull<T> {
        match self.try_allocate() {
            Ok(ptr) => ptr,
            Err(PoolAllocError::BackingAllocationFailed { layout }) => {
                log_warn!(
                    super::logger(),
                    "pool allocator: backing allocation failed, aborting"
                );
                std::alloc::handle_alloc_error(layout)
            }
        }
    }

    /// Releases `ptr` back to its owning pool.
    ///
    /// # Safety (precondition, not checked in release)
    /// `ptr` must have been returned by `try_allocate` on this same
    /// multi-pool and not already deallocated.
    pub fn deallocate(&mut self, ptr: NonNull<T>) {
        let raw: NonNull<MaybeUninit<T>> = ptr.cast();
        for block in self.blocks.iter().rev() {
            if block.deallocate(raw) {
                self.live_slots -= 1;
                return;
            }
        }
        debug_assert!(
            false,
            "deallocate called with a pointer foreign to this multi-pool"
        );
    }

    /// Number of blocks currently provisioned.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total slot capacity across all provisioned blocks.
    pub fn capacity(&self) -> usize {
        self.blocks.len() * W::BITS * W::BITS * W::BITS
    }

    /// Number of slots currently allocated (not yet freed).
    pub fn len(&self) -> usize {
        self.live_slots
    }

    pub fn is_empty(&self) -> bool {
        self.live_slots == 0
    }
}
