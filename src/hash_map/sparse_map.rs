//! SparseMap - separately chained hash map with inline bucket heads
//!
//! The first entry of every bucket lives directly in the bucket array;
//! collisions go into heap-allocated chain nodes appended at the tail.
//! A [`BitVec`](crate::BitVec) tracks which bucket heads are initialized,
//! so empty buckets cost one bit beyond their slot.
//!
//! # Examples
//!
//! ```rust
//! use groundwork::SparseMap;
//!
//! let mut map = SparseMap::new();
//! map.insert("answer", 42)?;
//! assert_eq!(map.get(&"answer"), Some(&42));
//! # Ok::<(), groundwork::GroundworkError>(())
//! ```

use crate::bits::BitVec;
use crate::containers::DynVec;
use crate::error::Result;
use ahash::AHasher;
use std::hash::{Hash, Hasher};
use std::mem::{self, MaybeUninit};

/// Initial bucket count; always a power of two.
const INITIAL_CAPACITY: usize = 64;

/// Default maximum load factor.
const DEFAULT_MAX_LOAD: f64 = 0.75;

#[inline]
fn hash_of<K: Hash>(key: &K) -> u64 {
    let mut hasher = AHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Bucket head: the first entry stored inline plus the overflow chain
struct Head<K, V> {
    item: MaybeUninit<(K, V)>,
    next: Option<Box<ChainNode<K, V>>>,
}

impl<K, V> Head<K, V> {
    fn empty() -> Self {
        Self {
            item: MaybeUninit::uninit(),
            next: None,
        }
    }
}

/// Heap-allocated overflow entry
struct ChainNode<K, V> {
    item: (K, V),
    next: Option<Box<ChainNode<K, V>>>,
}

/// Separately chained hash map
///
/// Bucket count is always a power of two (at least 64); the map doubles
/// whenever an insert would push the load factor past `max_load_factor`
/// (default 0.75, counting entries against buckets, so chains keep the
/// effective load per bucket near one). In multimap mode equal keys are
/// appended at the chain tail in insertion order; lookups return the
/// oldest.
pub struct SparseMap<K, V> {
    heads: DynVec<Head<K, V>>,
    occupancy: BitVec,
    count: usize,
    max_load_factor: f64,
    multimap: bool,
}

impl<K, V> SparseMap<K, V>
where
    K: Hash + Eq,
{
    /// Create an empty map
    pub fn new() -> Self {
        Self::with_options(DEFAULT_MAX_LOAD, false)
    }

    /// Create an empty multimap: equal keys are kept as separate entries
    pub fn new_multimap() -> Self {
        Self::with_options(DEFAULT_MAX_LOAD, true)
    }

    /// Create an empty map with a custom maximum load factor
    ///
    /// Values outside `(0, 1)` are clamped to the default with a warning.
    pub fn with_load_factor(max_load_factor: f64) -> Self {
        Self::with_options(max_load_factor, false)
    }

    fn with_options(mut max_load_factor: f64, multimap: bool) -> Self {
        if !(max_load_factor > 0.0 && max_load_factor < 1.0) || !max_load_factor.is_finite() {
            log::warn!(
                "SparseMap load factor {} out of (0, 1), using {}",
                max_load_factor,
                DEFAULT_MAX_LOAD
            );
            max_load_factor = DEFAULT_MAX_LOAD;
        }
        let mut map = Self {
            heads: DynVec::new(),
            occupancy: BitVec::new(),
            count: 0,
            max_load_factor,
            multimap,
        };
        map.alloc_storage(INITIAL_CAPACITY)
            .expect("initial SparseMap allocation failed");
        map
    }

    fn alloc_storage(&mut self, cap: usize) -> Result<()> {
        debug_assert!(cap.is_power_of_two());
        let mut heads = DynVec::with_capacity(cap)?;
        heads.resize_with(cap, Head::empty)?;
        let mut occupancy = BitVec::new();
        occupancy.resize(cap, false)?;
        self.heads = heads;
        self.occupancy = occupancy;
        Ok(())
    }

    /// Number of live entries
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the map holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current bucket count (a power of two)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.heads.len()
    }

    /// Entries per bucket on average
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    /// Whether equal keys are kept as separate entries
    #[inline]
    pub fn is_multimap(&self) -> bool {
        self.multimap
    }

    #[inline]
    fn bucket_of(&self, key: &K) -> usize {
        (hash_of(key) as usize) & (self.capacity() - 1)
    }

    /// Insert a key/value pair
    ///
    /// In map mode an existing entry for the key has its value replaced
    /// in place and the old value is returned. In multimap mode every
    /// insert appends a fresh entry at its bucket's chain tail.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        if !self.multimap {
            if let Some(slot) = self.get_mut(&key) {
                return Ok(Some(mem::replace(slot, value)));
            }
        }

        if (self.count + 1) as f64 / self.capacity() as f64 > self.max_load_factor {
            let cap = self.capacity();
            self.rehash(cap * 2)?;
        }

        self.place(key, value)?;
        self.count += 1;
        Ok(None)
    }

    /// Store a pair in its bucket: inline head if free, chain tail
    /// otherwise
    fn place(&mut self, key: K, value: V) -> Result<()> {
        let bucket = self.bucket_of(&key);
        if !self.occupancy.get(bucket) {
            self.heads[bucket].item = MaybeUninit::new((key, value));
            self.occupancy.set(bucket)?;
            return Ok(());
        }

        let mut cur = &mut self.heads[bucket].next;
        while let Some(node) = cur {
            cur = &mut node.next;
        }
        *cur = Some(Box::new(ChainNode {
            item: (key, value),
            next: None,
        }));
        Ok(())
    }

    /// Reference to the value stored for `key` (oldest entry in multimap
    /// mode)
    pub fn get(&self, key: &K) -> Option<&V> {
        let bucket = self.bucket_of(key);
        if !self.occupancy.get(bucket) {
            return None;
        }
        let head = &self.heads[bucket];
        let item = unsafe { &*head.item.as_ptr() };
        if item.0 == *key {
            return Some(&item.1);
        }
        let mut cur = &head.next;
        while let Some(node) = cur {
            if node.item.0 == *key {
                return Some(&node.item.1);
            }
            cur = &node.next;
        }
        None
    }

    /// Mutable reference to the value stored for `key`
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let bucket = self.bucket_of(key);
        if !self.occupancy.get(bucket) {
            return None;
        }
        let head = &mut self.heads[bucket];
        let item = unsafe { &mut *head.item.as_mut_ptr() };
        if item.0 == *key {
            return Some(&mut item.1);
        }
        let mut cur = &mut head.next;
        while let Some(node) = cur {
            if node.item.0 == *key {
                return Some(&mut node.item.1);
            }
            cur = &mut node.next;
        }
        None
    }

    /// Check if the map contains `key`
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Remove every entry whose key equals `key`, returning the first
    /// removed value
    ///
    /// Removing an inline head promotes its first chain successor into
    /// the bucket array; an emptied bucket clears its occupancy bit.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let bucket = self.bucket_of(key);
        if !self.occupancy.get(bucket) {
            return None;
        }
        let mut first = None;

        // peel matching heads, promoting the chain successor each time
        loop {
            let head_matches = {
                let head = &self.heads[bucket];
                unsafe { (*head.item.as_ptr()).0 == *key }
            };
            if !head_matches {
                break;
            }
            let head = &mut self.heads[bucket];
            let (_key, value) = unsafe { head.item.assume_init_read() };
            if first.is_none() {
                first = Some(value);
            }
            self.count -= 1;
            match head.next.take() {
                Some(node) => {
                    let ChainNode { item, next } = *node;
                    head.item = MaybeUninit::new(item);
                    head.next = next;
                }
                None => {
                    // bit is within capacity
                    let _ = self.occupancy.clear_bit(bucket);
                    return first;
                }
            }
            if !self.multimap {
                return first;
            }
        }

        // filter the chain, relinking survivors in order
        let mut rest = self.heads[bucket].next.take();
        let mut tail = &mut self.heads[bucket].next;
        while let Some(mut node) = rest {
            rest = node.next.take();
            if node.item.0 == *key {
                if first.is_none() {
                    first = Some(node.item.1);
                }
                self.count -= 1;
                if !self.multimap {
                    *tail = rest;
                    return first;
                }
            } else {
                *tail = Some(node);
                if let Some(kept) = tail {
                    tail = &mut kept.next;
                }
            }
        }
        first
    }

    /// Double (or otherwise resize) the table and re-bucket every entry
    ///
    /// Fresh storage is built completely before the swap; entries move by
    /// value and keep their per-bucket insertion order.
    fn rehash(&mut self, new_cap: usize) -> Result<()> {
        debug_assert!(new_cap.is_power_of_two() && new_cap > self.count / 2);

        let mut heads = DynVec::with_capacity(new_cap)?;
        heads.resize_with(new_cap, Head::empty)?;
        let mut occupancy = BitVec::new();
        occupancy.resize(new_cap, false)?;

        let mut old_heads = mem::replace(&mut self.heads, heads);
        let old_occupancy = mem::replace(&mut self.occupancy, occupancy);

        for i in 0..old_heads.len() {
            if old_occupancy.get(i) {
                let head = &mut old_heads[i];
                let (key, value) = unsafe { head.item.assume_init_read() };
                let mut chain = head.next.take();
                self.place(key, value)?;
                while let Some(node) = chain {
                    let ChainNode { item, next } = *node;
                    chain = next;
                    self.place(item.0, item.1)?;
                }
            }
        }
        // old head cells are structurally freed; their payloads moved out
        Ok(())
    }
}

impl<K, V> SparseMap<K, V> {
    /// Drop every entry, keeping the bucket allocation
    pub fn clear(&mut self) {
        for i in 0..self.heads.len() {
            if self.occupancy.get(i) {
                let head = &mut self.heads[i];
                unsafe {
                    head.item.assume_init_drop();
                }
                head.next = None;
                // bit is within capacity
                let _ = self.occupancy.clear_bit(i);
            }
        }
        self.count = 0;
    }

    /// Iterate over the live entries in bucket order, chains after their
    /// heads
    pub fn iter(&self) -> SparseMapIter<'_, K, V> {
        SparseMapIter {
            map: self,
            bucket: 0,
            node: None,
        }
    }
}

impl<K, V> Drop for SparseMap<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Hash + Eq, V> Default for SparseMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a [`SparseMap`]'s live entries
pub struct SparseMapIter<'a, K, V> {
    map: &'a SparseMap<K, V>,
    bucket: usize,
    node: Option<&'a ChainNode<K, V>>,
}

impl<'a, K, V> Iterator for SparseMapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(node) = self.node {
            self.node = node.next.as_deref();
            return Some((&node.item.0, &node.item.1));
        }
        while self.bucket < self.map.heads.len() {
            let b = self.bucket;
            self.bucket += 1;
            if self.map.occupancy.get(b) {
                let head = &self.map.heads[b];
                self.node = head.next.as_deref();
                let item = unsafe { &*head.item.as_ptr() };
                return Some((&item.0, &item.1));
            }
        }
        None
    }
}
