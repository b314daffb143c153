//! Packed boolean sequence with bulk bitwise operations
//!
//! Bits are stored LSB-first inside u64 words. Allocation grows in fixed
//! 256-bit chunks and freshly allocated words are zeroed, so whole-word
//! operations past the logical length are well-defined.

use crate::containers::DynVec;
use crate::error::Result;
use std::fmt;

/// Bits per storage word.
const WORD_BITS: usize = 64;
/// Allocation granularity in bits (32 bytes).
const CHUNK_BITS: usize = 256;
/// Allocation granularity in words.
const CHUNK_WORDS: usize = CHUNK_BITS / WORD_BITS;

/// Number of words needed to hold `bits` bits.
#[inline]
const fn words_for(bits: usize) -> usize {
    (bits + WORD_BITS - 1) / WORD_BITS
}

/// Mask covering bit positions `[lo, hi)` of a word, `hi <= 64`.
#[inline]
fn word_mask(lo: usize, hi: usize) -> u64 {
    debug_assert!(lo <= hi && hi <= WORD_BITS);
    if hi - lo == WORD_BITS {
        !0
    } else {
        ((1u64 << (hi - lo)) - 1) << lo
    }
}

/// A packed boolean sequence
///
/// `len()` counts logical bits; `capacity()` counts allocated bits and is
/// always a multiple of 256 once anything has been allocated. Reads past
/// the logical length are defined to be 0, and every operation that
/// combines two vectors of unequal length zero-extends the shorter one.
///
/// # Examples
///
/// ```rust
/// use groundwork::BitVec;
///
/// let mut bv = BitVec::new();
/// bv.push(true)?;
/// bv.push(false)?;
/// bv.set(10)?;
/// assert_eq!(bv.len(), 11);
/// assert!(bv.get(10));
/// assert!(!bv.get(999));
/// # Ok::<(), groundwork::GroundworkError>(())
/// ```
pub struct BitVec {
    words: DynVec<u64>,
    len: usize,
}

impl BitVec {
    /// Create a new empty bit vector
    #[inline]
    pub fn new() -> Self {
        Self {
            words: DynVec::new(),
            len: 0,
        }
    }

    /// Create a bit vector with at least the given capacity in bits
    pub fn with_capacity(bits: usize) -> Result<Self> {
        let mut bv = Self::new();
        bv.reserve(bits)?;
        Ok(bv)
    }

    /// Number of logical bits
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the vector holds no bits
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated capacity in bits; always a multiple of 256 once non-zero
    #[inline]
    pub fn capacity(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    /// Ensure the allocation covers at least `bits` bits, zeroing new words
    pub fn reserve(&mut self, bits: usize) -> Result<()> {
        let needed_chunks = (words_for(bits) + CHUNK_WORDS - 1) / CHUNK_WORDS;
        let needed_words = needed_chunks * CHUNK_WORDS;
        while self.words.len() < needed_words {
            self.words.push_back(0)?;
        }
        Ok(())
    }

    /// Word `i` with bits at or past `len` masked to zero
    #[inline]
    fn word(&self, i: usize) -> u64 {
        if i >= self.words.len() || i * WORD_BITS >= self.len {
            return 0;
        }
        let raw = self.words[i];
        let live = self.len - i * WORD_BITS;
        if live >= WORD_BITS {
            raw
        } else {
            raw & word_mask(0, live)
        }
    }

    /// Read bit `i`; positions at or past `len` read as 0
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        if i >= self.len {
            return false;
        }
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    /// Write bit `i` without growth bookkeeping
    #[inline]
    fn write_bit(&mut self, i: usize, value: bool) {
        let w = i / WORD_BITS;
        let b = i % WORD_BITS;
        if value {
            self.words[w] |= 1u64 << b;
        } else {
            self.words[w] &= !(1u64 << b);
        }
    }

    /// Append one bit at the logical tail
    pub fn push(&mut self, value: bool) -> Result<()> {
        self.reserve(self.len + 1)?;
        let i = self.len;
        self.write_bit(i, value);
        self.len += 1;
        Ok(())
    }

    /// Remove and return the last bit; `None` on an empty vector
    pub fn pop(&mut self) -> Option<bool> {
        if self.len == 0 {
            log::warn!("BitVec::pop on empty vector");
            return None;
        }
        self.len -= 1;
        let i = self.len;
        let value = (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1;
        self.write_bit(i, false);
        Some(value)
    }

    /// Force bit `i` to 1, growing capacity and length as needed
    pub fn set(&mut self, i: usize) -> Result<()> {
        self.reserve(i + 1)?;
        self.write_bit(i, true);
        if i >= self.len {
            self.len = i + 1;
        }
        Ok(())
    }

    /// Force bit `i` to 0, growing capacity and length as needed
    pub fn clear_bit(&mut self, i: usize) -> Result<()> {
        self.reserve(i + 1)?;
        self.write_bit(i, false);
        if i >= self.len {
            self.len = i + 1;
        }
        Ok(())
    }

    /// Fill the entire allocated word range with ones
    ///
    /// Acts on capacity, not length; masked reads still treat positions at
    /// or past `len` as 0.
    pub fn set_all(&mut self) {
        self.words.as_mut_slice().fill(!0);
    }

    /// Zero the entire allocated word range
    pub fn clear_all(&mut self) {
        self.words.as_mut_slice().fill(0);
    }

    /// Fill the bit range `[start, start + n)`, growing as needed
    ///
    /// Head bits up to a word boundary are masked individually, the aligned
    /// middle is a whole-word fill, and the tail word is masked.
    pub fn set_range(&mut self, start: usize, n: usize) -> Result<()> {
        self.fill_range(start, n, true)
    }

    /// Zero the bit range `[start, start + n)`, growing as needed
    pub fn clear_range(&mut self, start: usize, n: usize) -> Result<()> {
        self.fill_range(start, n, false)
    }

    fn fill_range(&mut self, start: usize, n: usize, value: bool) -> Result<()> {
        if n == 0 {
            log::warn!(
                "BitVec::{}_range with zero length at {}",
                if value { "set" } else { "clear" },
                start
            );
            return Ok(());
        }
        let end = start + n;
        self.reserve(end)?;

        let first = start / WORD_BITS;
        let last = (end - 1) / WORD_BITS;

        if first == last {
            let mask = word_mask(start % WORD_BITS, (end - 1) % WORD_BITS + 1);
            if value {
                self.words[first] |= mask;
            } else {
                self.words[first] &= !mask;
            }
        } else {
            // head: partial word up to the next boundary
            let head_mask = word_mask(start % WORD_BITS, WORD_BITS);
            if value {
                self.words[first] |= head_mask;
            } else {
                self.words[first] &= !head_mask;
            }
            // middle: aligned whole-word fill
            if last > first + 1 {
                let fill = if value { !0 } else { 0 };
                self.words.as_mut_slice()[first + 1..last].fill(fill);
            }
            // tail: mask the final word
            let tail_mask = word_mask(0, (end - 1) % WORD_BITS + 1);
            if value {
                self.words[last] |= tail_mask;
            } else {
                self.words[last] &= !tail_mask;
            }
        }

        if end > self.len {
            self.len = end;
        }
        Ok(())
    }

    /// Number of set bits in the first `len` positions
    pub fn count_ones(&self) -> usize {
        self.count_ones_before(self.len)
    }

    /// Number of set bits strictly before `pos` (clamped to `len`)
    pub fn count_ones_before(&self, pos: usize) -> usize {
        let pos = pos.min(self.len);
        let mut count = 0;
        let full = pos / WORD_BITS;
        for i in 0..full {
            count += self.word(i).count_ones() as usize;
        }
        let rem = pos % WORD_BITS;
        if rem > 0 {
            count += (self.word(full) & word_mask(0, rem)).count_ones() as usize;
        }
        count
    }

    /// Word-wise combine of two vectors under zero-extension
    fn combine<F>(&self, other: &BitVec, f: F, invert: bool) -> Result<BitVec>
    where
        F: Fn(u64, u64) -> u64,
    {
        let out_len = self.len.max(other.len);
        let mut out = BitVec::with_capacity(out_len)?;
        let nwords = words_for(out_len);
        for i in 0..nwords {
            let mut w = f(self.word(i), other.word(i));
            if invert {
                w = !w;
            }
            // keep bits past the result length zero
            let live = out_len - i * WORD_BITS;
            if live < WORD_BITS {
                w &= word_mask(0, live);
            }
            out.words[i] = w;
        }
        out.len = out_len;
        Ok(out)
    }

    /// Bitwise exclusive-or; the shorter operand zero-extends
    pub fn xor(&self, other: &BitVec) -> Result<BitVec> {
        self.combine(other, |a, b| a ^ b, false)
    }

    /// Bitwise and; the shorter operand zero-extends
    pub fn and(&self, other: &BitVec) -> Result<BitVec> {
        self.combine(other, |a, b| a & b, false)
    }

    /// Bitwise or; the shorter operand zero-extends
    pub fn or(&self, other: &BitVec) -> Result<BitVec> {
        self.combine(other, |a, b| a | b, false)
    }

    /// Bitwise exclusive-nor over the result length
    pub fn xnor(&self, other: &BitVec) -> Result<BitVec> {
        self.combine(other, |a, b| a ^ b, true)
    }

    /// Bitwise nand over the result length
    pub fn nand(&self, other: &BitVec) -> Result<BitVec> {
        self.combine(other, |a, b| a & b, true)
    }

    /// Bitwise nor over the result length
    pub fn nor(&self, other: &BitVec) -> Result<BitVec> {
        self.combine(other, |a, b| a | b, true)
    }

    /// New vector inverting exactly the first `len` bits
    pub fn not(&self) -> Result<BitVec> {
        let mut out = BitVec::with_capacity(self.len)?;
        let nwords = words_for(self.len);
        for i in 0..nwords {
            let mut w = !self.word(i);
            let live = self.len - i * WORD_BITS;
            if live < WORD_BITS {
                w &= word_mask(0, live);
            }
            out.words[i] = w;
        }
        out.len = self.len;
        Ok(out)
    }

    /// Logical left shift by `k`: `out[i] = self[i + k]`, length `len - k`
    ///
    /// The low `k` bits are discarded; shifting by `len` or more yields an
    /// empty vector.
    pub fn shl(&self, k: usize) -> Result<BitVec> {
        if k >= self.len {
            return Ok(BitVec::new());
        }
        let out_len = self.len - k;
        let mut out = BitVec::with_capacity(out_len)?;
        let q = k / WORD_BITS;
        let s = k % WORD_BITS;
        for i in 0..words_for(out_len) {
            let mut w = if s == 0 {
                self.word(i + q)
            } else {
                (self.word(i + q) >> s) | (self.word(i + q + 1) << (WORD_BITS - s))
            };
            let live = out_len - i * WORD_BITS;
            if live < WORD_BITS {
                w &= word_mask(0, live);
            }
            out.words[i] = w;
        }
        out.len = out_len;
        Ok(out)
    }

    /// Logical right shift by `k`: `out[i + k] = self[i]`, length `len + k`
    ///
    /// The low `k` bits of the result are zero.
    pub fn shr(&self, k: usize) -> Result<BitVec> {
        let out_len = self.len + k;
        let mut out = BitVec::with_capacity(out_len)?;
        let q = k / WORD_BITS;
        let s = k % WORD_BITS;
        for i in q..words_for(out_len) {
            let lo = self.word(i - q);
            let w = if s == 0 {
                lo
            } else {
                let carry = if i > q { self.word(i - q - 1) >> (WORD_BITS - s) } else { 0 };
                (lo << s) | carry
            };
            out.words[i] = w;
        }
        out.len = out_len;
        Ok(out)
    }

    /// True iff the two vectors represent the same sequence when the
    /// shorter one is zero-extended
    pub fn cmpeq(&self, other: &BitVec) -> bool {
        let nwords = words_for(self.len.max(other.len));
        (0..nwords).all(|i| self.word(i) == other.word(i))
    }

    /// Make `self` bit-identical to `src`, growing as needed
    pub fn set_equal(&mut self, src: &BitVec) -> Result<()> {
        self.reserve(src.len)?;
        for i in 0..self.words.len() {
            self.words[i] = if i < src.words.len() { src.words[i] } else { 0 };
        }
        self.len = src.len;
        Ok(())
    }

    /// Force the logical length to `n`
    ///
    /// Growth fills the new range with `value`; shrink zeroes the vacated
    /// range so later reads and whole-word operations see zeros.
    pub fn resize(&mut self, n: usize, value: bool) -> Result<()> {
        if n > self.len {
            // write the new range explicitly; set_all may have dirtied
            // the words past len
            let start = self.len;
            self.fill_range(start, n - start, value)?;
        } else if n < self.len {
            let start = n;
            let count = self.len - n;
            self.len = n;
            // clear the vacated range directly; len is already trimmed
            let end = start + count;
            let first = start / WORD_BITS;
            let last = (end - 1) / WORD_BITS;
            for w in first..=last {
                let lo = if w == first { start % WORD_BITS } else { 0 };
                let hi = if w == last { (end - 1) % WORD_BITS + 1 } else { WORD_BITS };
                self.words[w] &= !word_mask(lo, hi);
            }
        }
        Ok(())
    }

    /// Drop every bit and zero the storage, keeping capacity
    pub fn clear(&mut self) {
        self.words.as_mut_slice().fill(0);
        self.len = 0;
    }

    /// The underlying words (capacity range), for tests and diagnostics
    #[inline]
    pub fn words(&self) -> &[u64] {
        self.words.as_slice()
    }
}

impl Default for BitVec {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for BitVec {
    fn clone(&self) -> Self {
        Self {
            words: self.words.clone(),
            len: self.len,
        }
    }
}

impl PartialEq for BitVec {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.cmpeq(other)
    }
}

impl Eq for BitVec {}

impl fmt::Debug for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVec {{ len: {}, bits: [", self.len)?;
        for i in 0..self.len.min(64) {
            write!(f, "{}", if self.get(i) { '1' } else { '0' })?;
        }
        if self.len > 64 {
            write!(f, "...")?;
        }
        write!(f, "] }}")
    }
}
