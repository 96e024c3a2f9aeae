// Leaf bitmap-indexed slot grid.
//
// A `Pool<T, W>` does not own its slot storage — it holds a base pointer into
// a slice owned by its parent `Block`, plus the two-tier bitmap over that
// slice. This mirrors `Block`'s "contiguous array of pools" layout from the
// allocator's contract: address arithmetic on a returned pointer must be able
// to walk straight back to the owning block without any indirection through
// per-pool heap storage.
//
// # Safety invariants
//
// 1. `base` must point to a live slice of `W::BITS * W::BITS` slots owned by
//    the enclosing `Block`, valid for the `Pool`'s entire lifetime.
// 2. Every mutating method here is only ever called while the owning
//    `MultiPool`'s mutex is held — there is no further synchronization inside
//    `Pool` itself.
// 3. P1: bit `k` of `unused_words` == (`unallocated_slots[k]` != 0).
// 4. P2: a slot's bit is 1 iff the slot is not currently owned by a caller.
// 5. P3: `full()` == (`unused_words` == 0).

use std::cell::{Cell, UnsafeCell};
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use super::bitword::BitWord;

pub(crate) struct Pool<T, W: BitWord> {
    base: NonNull<MaybeUninit<T>>,
    unallocated_slots: UnsafeCell<Box<[W]>>,
    unused_words: Cell<W>,
    _marker: PhantomData<T>,
}

impl<T, W: BitWord> Pool<T, W> {
    /// Builds a pool over the `W::BITS * W::BITS`-slot slice starting at
    /// `base`, with every slot marked free (invariant P1-P3 established).
    ///
    /// # Safety
    /// `base` must point to a valid, exclusively-owned slice of at least
    /// `W::BITS * W::BITS` slots that outlives this `Pool`.
    pub(crate) unsafe fn new(base: NonNull<MaybeUninit<T>>) -> Self {
        Self {
            base,
            unallocated_slots: UnsafeCell::new(vec![W::ALL_ONES; W::BITS].into_boxed_slice()),
            unused_words: Cell::new(W::ALL_ONES),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn full(&self) -> bool {
        self.unused_words.get().is_zero()
    }

    /// Allocates the lowest free slot.
    ///
    /// # Safety
    /// Caller must ensure `!self.full()`.
    #[inline]
    pub(crate) fn allocate(&self) -> NonNull<T> {
        debug_assert!(!self.full(), "Pool::allocate called on a full pool");

        let k = self.unused_words.get().trailing_zeros() as usize;

        // SAFETY: single mutator at a time, guarded by the owning multi-pool's mutex.
        let words = unsafe { &mut *self.unallocated_slots.get() };
        let mut word = words[k];
        let s = word.trailing_zeros() as usize;
        word.clear_bit(s);
        words[k] = word;

        if word.is_zero() {
            let mut outer = self.unused_words.get();
            outer.clear_bit(k);
            self.unused_words.set(outer);
        }

        // SAFETY: k * W::BITS + s < W::BITS * W::BITS, within `base`'s slice.
        let ptr = unsafe { self.base.as_ptr().add(k * W::BITS + s).cast::<T>() };
        unsafe { NonNull::new_unchecked(ptr) }
    }

    /// Returns `slot` to the pool.
    ///
    /// # Safety
    /// `slot` must have been produced by `self.allocate()` and not already
    /// returned since.
    #[inline]
    pub(crate) fn deallocate(&self, slot: NonNull<MaybeUninit<T>>) {
        let index = self.slot_index(slot);
        let k = index / W::BITS;
        let s = index % W::BITS;

        // SAFETY: guarded by the owning multi-pool's mutex.
        let words = unsafe { &mut *self.unallocated_slots.get() };
        let mut word = words[k];
        debug_assert!(!word.test_bit(s), "double free: slot already marked free");
        let was_empty = word.is_zero();
        word.set_bit(s);
        words[k] = word;

        if was_empty {
            let mut outer = self.unused_words.get();
            outer.set_bit(k);
            self.unused_words.set(outer);
        }
    }

    #[inline]
    fn slot_index(&self, ptr: NonNull<MaybeUninit<T>>) -> usize {
        debug_assert!(self.contains(ptr), "pointer does not belong to this pool");
        // SAFETY: both pointers are derived from the same allocation (checked
        // above in debug builds; a precondition violation in release, per the
        // allocator's documented contract).
        unsafe { ptr.as_ptr().offset_from(self.base.as_ptr()) as usize }
    }

    #[inline]
    pub(crate) fn contains(&self, ptr: NonNull<MaybeUninit<T>>) -> bool {
        let start = self.base.as_ptr() as usize;
        let end = start + W::BITS * W::BITS * std::mem::size_of::<T>();
        let addr = ptr.as_ptr() as usize;
        addr >= start && addr < end
    }
}

// Pool does not own T's storage (that lives in the parent Block), so Send
// tracks the same bound a Box<[T]> would need.
unsafe impl<T: Send, W: BitWord> Send for Pool<T, W> {}
