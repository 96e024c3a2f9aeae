// Error type surfaced by the pool allocator.
//
// Only one failure kind is ever surfaced (backing allocation failure) — the
// rest of the error table in the allocator's contract (precondition
// violations, foreign pointers, double free) are documented UB in release
// and `debug_assert!`-checked in debug. No `thiserror`/`anyhow` dependency is
// introduced; this matches the plain `std::error::Error` style used
// elsewhere in this crate.

use std::alloc::Layout;
use std::fmt;

/// Failure kind returned when the allocator cannot obtain backing memory for
/// a new pool block.
#[derive(Debug, Clone, Copy)]
pub enum PoolAllocError {
    /// The global allocator refused the `Layout` needed for a new block.
    BackingAllocationFailed { layout: Layout },
}

impl fmt::Display for PoolAllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolAllocError::BackingAllocationFailed { layout } => write!(
                f,
                "pool allocator: failed to allocate a new block (size {} bytes, align {})",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl std::error::Error for PoolAllocError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_layout() {
        let layout = Layout::new::<u64>();
        let err = PoolAllocError::BackingAllocationFailed { layout };
        let rendered = err.to_string();
        assert!(rendered.contains(&layout.size().to_string()));
    }

    #[test]
    fn implements_std_error() {
        let layout = Layout::new::<u8>();
        let err = PoolAllocError::BackingAllocationFailed { layout };
        let _: &dyn std::error::Error = &err;
    }
}
