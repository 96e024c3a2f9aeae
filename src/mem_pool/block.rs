// A block is one contiguous backing allocation shared by `W::BITS` pools,
// plus the `unmaxed_pools` summary word (invariant B1: bit `i` set iff pool
// `i` is not full). Blocks never shrink and are freed only when the owning
// `MultiPool` is dropped.

use std::alloc::{self, Layout};
use std::cell::Cell;
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use super::bitword::BitWord;
use super::error::PoolAllocError;
use super::pool::Pool;

pub(crate) struct Block<T, W: BitWord> {
    storage: NonNull<MaybeUninit<T>>,
    layout: Layout,
    pools: Box<[Pool<T, W>]>,
    unmaxed_pools: Cell<W>,
}

impl<T, W: BitWord> Block<T, W> {
    /// Allocates a fresh block of `W::BITS` pools (`W::BITS^3` slots total),
    /// all free.
    pub(crate) fn try_new() -> Result<Self, PoolAllocError> {
        // `alloc::alloc` is UB on a zero-size `Layout`; this allocator's slot
        // storage is always a real backing allocation (unlike `Box`/`Vec`,
        // which special-case ZSTs to avoid ever calling the global
        // allocator), so zero-sized `T` is out of scope here.
        assert!(
            std::mem::size_of::<T>() > 0,
            "pool allocator does not support zero-sized element types"
        );

        let pool_slots = W::BITS * W::BITS;
        let slot_count = pool_slots * W::BITS;
        let layout = Layout::array::<MaybeUninit<T>>(slot_count)
            .expect("pool block layout exceeds addressable range");

        // SAFETY: layout has non-zero size because T is non-zero-sized
        // (checked above) and W::BITS > 0, guaranteed by this crate's
        // BitWord impls.
        let raw = unsafe { alloc::alloc(layout) } as *mut MaybeUninit<T>;
        let storage = match NonNull::new(raw) {
            Some(p) => p,
            None => return Err(PoolAllocError::BackingAllocationFailed { layout }),
        };

        let mut pools = Vec::with_capacity(W::BITS);
        for i in 0..W::BITS {
            // SAFETY: base lies within `storage`'s allocation; the slice
            // [i*pool_slots, (i+1)*pool_slots) is disjoint from every other
            // pool's slice and stays valid for the block's lifetime.
            let base = unsafe { NonNull::new_unchecked(storage.as_ptr().add(i * pool_slots)) };
            pools.push(unsafe { Pool::new(base) });
        }

        Ok(Self {
            storage,
            layout,
            pools: pools.into_boxed_slice(),
            unmaxed_pools: Cell::new(W::ALL_ONES),
        })
    }

    #[inline]
    pub(crate) fn full(&self) -> bool {
        self.unmaxed_pools.get().is_zero()
    }

    /// Allocates from the lowest-indexed non-full pool, or `None` if the
    /// block itself is full.
    #[inline]
    pub(crate) fn allocate(&self) -> Option<NonNull<T>> {
        if self.full() {
            return None;
        }

        let i = self.unmaxed_pools.get().trailing_zeros() as usize;
        let pool = &self.pools[i];
        let ptr = pool.allocate();

        if pool.full() {
            let mut outer = self.unmaxed_pools.get();
            outer.clear_bit(i);
            self.unmaxed_pools.set(outer);
        }

        Some(ptr)
    }

    #[inline]
    pub(crate) fn contains(&self, ptr: NonNull<MaybeUninit<T>>) -> bool {
        let start = self.storage.as_ptr() as usize;
        let end = start + W::BITS * W::BITS * W::BITS * std::mem::size_of::<T>();
        let addr = ptr.as_ptr() as usize;
        addr >= start && addr < end
    }

    /// Attempts to deallocate `ptr` through this block. Returns `false` if
    /// `ptr` does not lie within this block's storage (the caller, a
    /// `MultiPool`, is expected to try the next block).
    #[inline]
    pub(crate) fn deallocate(&self, ptr: NonNull<MaybeUninit<T>>) -> bool {
        if !self.contains(ptr) {
            return false;
        }

        let pool_slots = W::BITS * W::BITS;
        // SAFETY: contains() confirmed ptr lies within this block's storage.
        let offset = unsafe { ptr.as_ptr().offset_from(self.storage.as_ptr()) as usize };
        let pool_idx = offset / pool_slots;

        self.pools[pool_idx].deallocate(ptr);

        let mut outer = self.unmaxed_pools.get();
        outer.set_bit(pool_idx);
        self.unmaxed_pools.set(outer);

        true
    }
}

impl<T, W: BitWord> Drop for Block<T, W> {
    fn drop(&mut self) {
        // SAFETY: `storage` was allocated with `layout` in `try_new` and is
        // not referenced by anything outliving this `Block`.
        unsafe { alloc::dealloc(self.storage.as_ptr() as *mut u8, self.layout) };
    }
}

// Block does not expose shared references into T's storage; Send tracks the
// same bound a Box<[T]> would need, same reasoning as Pool.
unsafe impl<T: Send, W: BitWord> Send for Block<T, W> {}
