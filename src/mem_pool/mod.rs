//! Fixed-size object pool allocator.
//!
//! A two-tier bitmap-indexed slot allocator for workloads that repeatedly
//! allocate and free many same-type, same-size objects (tree/list container
//! nodes, order book entries, and the like). Trades contiguous multi-object
//! allocation and resize away for O(1) allocate/deallocate with good cache
//! locality and minimal per-slot metadata.
//!
//! Three layers, leaves first:
//! - [`Pool`] — `W::BITS * W::BITS` slots behind a two-tier bitmap.
//! - [`Block`] — `W::BITS` pools allocated as one contiguous backing
//!   allocation.
//! - [`MultiPool`] — a growing, never-shrinking sequence of blocks for one
//!   element type.
//!
//! Most callers only need [`PoolHandle`]: a stateless, `Copy` façade bound to
//! an element type that transparently shares a process-wide `MultiPool`
//! singleton with every other handle for that type.
//!
//! ```
//! use nodepool::mem_pool::PoolHandle;
//!
//! struct Node {
//!     value: u64,
//! }
//!
//! let handle: PoolHandle<Node> = PoolHandle::new();
//! let ptr = handle.allocate();
//! unsafe {
//!     ptr.as_ptr().write(Node { value: 42 });
//!     assert_eq!((*ptr.as_ptr()).value, 42);
//!     std::ptr::drop_in_place(ptr.as_ptr());
//!     handle.deallocate(ptr);
//! }
//! ```

mod bitword;
mod block;
mod error;
mod handle;
mod multi_pool;
mod pool;
mod registry;

pub use bitword::BitWord;
pub use error::PoolAllocError;
pub use handle::PoolHandle;
pub use multi_pool::MultiPool;

use crate::logging::{LogLevel, Logger};
use std::sync::OnceLock;

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// The ambient logger for rare allocator-level events (block growth, backing
/// allocation failure). Never touched on the allocate/deallocate hot path.
pub(crate) fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::with_level(LogLevel::Debug))
}
