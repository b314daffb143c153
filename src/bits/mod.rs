//! Packed bit storage
//!
//! [`BitVec`] stores booleans LSB-first in u64 words, grows in fixed
//! 256-bit chunks, and offers bulk range updates plus whole-sequence
//! bitwise operators with zero-extension semantics for unequal lengths.

mod bit_vec;

pub use bit_vec::BitVec;
