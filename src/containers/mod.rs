//! Generic container types sharing one element contract
//!
//! Every container in this crate stores *owned* payloads in its cells,
//! and the element contract is enforced at compile time rather than
//! through per-operation callbacks:
//!
//! - duplication is a `T: Clone` bound on exactly the operations that
//!   duplicate ([`DynVec::clone`], [`DynVec::merge`], [`DynVec::filter`],
//!   [`DynVec::resize`]);
//! - teardown is ordinary `Drop`, run exactly once per live cell;
//! - dynamic per-call context rides in closure captures (comparators,
//!   predicates), not in a stored cookie.
//!
//! Internal shifting and rehashing move cells without invoking `Clone`.
//! Nested containers need no adapters: `DynVec<DynVec<T>>` clones and
//! drops element-wise like any other payload.

mod dyn_vec;

pub use dyn_vec::DynVec;
