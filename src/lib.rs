//! # Groundwork: Foundational Containers and Allocation
//!
//! This crate provides the low-level building blocks a storage or indexing
//! engine sits on: a growth-tunable vector, packed bit storage with bulk
//! bitwise operations, a fixed-block pool allocator, and two hash map
//! designs tuned for different collision profiles.
//!
//! ## Key Features
//!
//! - **DynVec**: Dynamic array with a configurable growth factor and
//!   realloc-based resizing
//! - **BitVec**: Packed bit sequence with chunked growth, range fills,
//!   and whole-sequence bitwise operators under zero-extension semantics
//! - **BlockPool**: Fixed-block pool allocator with linear page growth
//!   and bitmapped occupancy
//! - **DenseMap**: Robin-Hood open-addressed hash map with byte-sized
//!   slot metadata and back-shift deletion
//! - **SparseMap**: Separately chained hash map with inline bucket heads
//! - **Memory Safety**: C-grade layout control with Rust's ownership
//!   guarantees
//!
//! ## Quick Start
//!
//! ```rust
//! use groundwork::{BitVec, BlockPool, DenseMap, DynVec, SparseMap};
//!
//! // growth-tunable vector
//! let mut vec = DynVec::new();
//! vec.push_back(42)?;
//! assert_eq!(vec[0], 42);
//!
//! // packed bits with bulk updates
//! let mut bits = BitVec::new();
//! bits.set_range(3, 37)?;
//! assert_eq!(bits.count_ones(), 37);
//!
//! // fixed-block allocation
//! let mut pool = BlockPool::new(24)?;
//! let block = pool.allocate()?;
//! pool.free(block);
//!
//! // open-addressed and chained maps share one API shape
//! let mut dense = DenseMap::new();
//! dense.insert("key", 1)?;
//! let mut sparse = SparseMap::new();
//! sparse.insert("key", 1)?;
//! # Ok::<(), groundwork::GroundworkError>(())
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod bits;
pub mod containers;
pub mod error;
pub mod hash_map;
pub mod memory;

// Re-export core types
pub use bits::BitVec;
pub use containers::DynVec;
pub use error::{GroundworkError, Result};
pub use hash_map::{DenseMap, SparseMap};
pub use memory::{BlockPool, BlockPoolConfig, DEFAULT_PAGE_SHIFT};
