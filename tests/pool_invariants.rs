// Property-based checks for the structural invariants of the pool allocator
// (P1/B1 from the allocator's design, plus the never-aliasing guarantee),
// exercised over randomized allocate/deallocate sequences rather than a
// fixed set of hand-enumerated cases.

use std::collections::HashSet;
use std::ptr::NonNull;

use nodepool::mem_pool::PoolHandle;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Allocate,
    // Deallocate the nth still-live pointer, oldest first.
    DeallocateNth(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Allocate),
        1 => (0usize..64).prop_map(Op::DeallocateNth),
    ]
}

proptest! {
    /// Allocated pointers are always pairwise distinct, regardless of the
    /// allocate/deallocate interleaving that produced them.
    #[test]
    fn never_aliases(ops in prop::collection::vec(op_strategy(), 0..2000)) {
        let handle: PoolHandle<u64> = PoolHandle::new();
        let mut live: Vec<NonNull<u64>> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate => {
                    let ptr = handle.allocate();
                    prop_assert!(!live.contains(&ptr), "freshly allocated pointer aliases a live one");
                    live.push(ptr);
                }
                Op::DeallocateNth(n) => {
                    if !live.is_empty() {
                        let idx = n % live.len();
                        let ptr = live.remove(idx);
                        unsafe { handle.deallocate(ptr) };
                    }
                }
            }
        }

        for ptr in live {
            unsafe { handle.deallocate(ptr) };
        }
    }

    /// Every pointer returned at any point during a run is unique: the
    /// allocator never hands out the same raw address for two distinct
    /// *simultaneously live* allocations, even across growth events.
    #[test]
    fn concurrently_live_pointers_are_unique_across_growth(alloc_count in 0usize..300_000) {
        let handle: PoolHandle<u8> = PoolHandle::new();
        let mut ptrs = Vec::with_capacity(alloc_count);
        let mut addrs = HashSet::with_capacity(alloc_count);

        for _ in 0..alloc_count {
            let ptr = handle.allocate();
            let addr = ptr.as_ptr() as usize;
            prop_assert!(addrs.insert(addr), "duplicate live address returned by allocate");
            ptrs.push(ptr);
        }

        for ptr in ptrs {
            unsafe { handle.deallocate(ptr) };
        }
    }

    /// Allocating then immediately freeing every slot returns the allocator
    /// to a state indistinguishable from freshly constructed: a subsequent
    /// allocate-all-then-free-all cycle of the same size must succeed again.
    #[test]
    fn full_cycle_is_idempotent(cycles in 1usize..5, batch in 1usize..5000) {
        let handle: PoolHandle<u32> = PoolHandle::new();

        for _ in 0..cycles {
            let mut ptrs = Vec::with_capacity(batch);
            for _ in 0..batch {
                ptrs.push(handle.allocate());
            }
            for ptr in ptrs {
                unsafe { handle.deallocate(ptr) };
            }
        }
    }
}

#[test]
fn cross_handle_deallocation_respects_never_alias() {
    let a: PoolHandle<u64> = PoolHandle::new();
    let b: PoolHandle<u64> = PoolHandle::new();

    let mut ptrs = Vec::new();
    for _ in 0..10_000 {
        ptrs.push(a.allocate());
    }

    let mut addrs: Vec<usize> = ptrs.iter().map(|p| p.as_ptr() as usize).collect();
    addrs.sort_unstable();
    let before = addrs.len();
    addrs.dedup();
    assert_eq!(addrs.len(), before);

    for ptr in ptrs {
        unsafe { b.deallocate(ptr) };
    }
}
