//! Memory management utilities
//!
//! Currently a single allocator: [`BlockPool`], a fixed-block pool with
//! linear page growth backed by the crate's [`BitVec`](crate::BitVec)
//! occupancy map.

mod block_pool;

pub use block_pool::{BlockPool, BlockPoolConfig, DEFAULT_PAGE_SHIFT};
