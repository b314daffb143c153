//! Hash map implementations
//!
//! Two complementary designs over the same hashing front end
//! ([`ahash`]):
//!
//! - [`DenseMap`]: Robin-Hood open addressing with one metadata byte and
//!   one probe-length byte per slot. Cache-friendly, bounded probe
//!   distances, back-shift deletion.
//! - [`SparseMap`]: separate chaining with the first entry of each
//!   bucket stored inline and overflow nodes on the heap. Stable under
//!   pathological clustering, per-bucket insertion order.
//!
//! Both support a multimap mode where equal keys coexist as separate
//! entries.

mod dense_map;
mod sparse_map;

pub use dense_map::{DenseMap, DenseMapIter};
pub use sparse_map::{SparseMap, SparseMapIter};
