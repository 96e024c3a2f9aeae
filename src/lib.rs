//! `nodepool` — a fixed-size object pool allocator.
//!
//! See [`mem_pool`] for the allocator itself. `logging`, `lf_queue`, and
//! `time` are the ambient low-overhead infrastructure the allocator (and any
//! future client code) is built on.

#![cfg_attr(feature = "allocator_api", feature(allocator_api))]

pub mod lf_queue;
pub mod logging;
pub mod mem_pool;
pub mod time;
