//! DenseMap - Robin-Hood open-addressed hash map with 8-bit slot metadata
//!
//! Each slot carries one metadata byte (bit 7 = occupied, bits 0..7 = the
//! low seven bits of the key's hash) and one probe-sequence-length byte.
//! Lookups fast-reject on the metadata byte before touching the key;
//! inserts displace richer elements Robin-Hood style; deletions back-shift
//! the following cluster so probe lengths stay exact.
//!
//! # Examples
//!
//! ```rust
//! use groundwork::DenseMap;
//!
//! let mut map = DenseMap::new();
//! map.insert("answer", 42)?;
//! assert_eq!(map.get(&"answer"), Some(&42));
//! # Ok::<(), groundwork::GroundworkError>(())
//! ```

use crate::containers::DynVec;
use crate::error::Result;
use ahash::AHasher;
use std::hash::{Hash, Hasher};
use std::mem::{self, MaybeUninit};
use std::ptr;

/// Initial slot count; always a power of two.
const INITIAL_CAPACITY: usize = 64;

/// Occupied flag in the metadata byte.
const OCCUPIED: u8 = 0x80;

/// Default maximum load factor.
const DEFAULT_MAX_LOAD: f64 = 0.875;

/// Hash a key with the crate's default (non-cryptographic) hasher
#[inline]
fn hash_of<K: Hash>(key: &K) -> u64 {
    let mut hasher = AHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Metadata byte for a stored hash: occupied flag plus the low 7 bits
#[inline]
fn meta_byte(hash: u64) -> u8 {
    OCCUPIED | (hash as u8 & 0x7F)
}

/// Open-addressed hash map with Robin-Hood displacement
///
/// Capacity is always a power of two (at least 64). The map doubles and
/// rehashes in place whenever an insert would push the load factor past
/// `max_load_factor` (default 0.875). In multimap mode equal keys each
/// get their own slot and cluster in contiguous forward probe positions;
/// lookups return the first of them.
pub struct DenseMap<K, V> {
    slots: DynVec<MaybeUninit<(K, V)>>,
    meta: DynVec<u8>,
    psl: DynVec<u8>,
    count: usize,
    max_load_factor: f64,
    multimap: bool,
}

impl<K, V> DenseMap<K, V>
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
                "DenseMap load factor {} out of (0, 1), using {}",
                max_load_factor,
                DEFAULT_MAX_LOAD
            );
            max_load_factor = DEFAULT_MAX_LOAD;
        }
        let mut map = Self {
            slots: DynVec::new(),
            meta: DynVec::new(),
            psl: DynVec::new(),
            count: 0,
            max_load_factor,
            multimap,
        };
        // initial storage; a fresh allocation of 64 cells cannot overflow
        map.alloc_storage(INITIAL_CAPACITY)
            .expect("initial DenseMap allocation failed");
        map
    }

    fn alloc_storage(&mut self, cap: usize) -> Result<()> {
        debug_assert!(cap.is_power_of_two());
        let mut slots = DynVec::with_capacity(cap)?;
        slots.resize_with(cap, MaybeUninit::uninit)?;
        let mut meta = DynVec::with_capacity(cap)?;
        meta.resize(cap, 0u8)?;
        let mut psl = DynVec::with_capacity(cap)?;
        psl.resize(cap, 0u8)?;
        self.slots = slots;
        self.meta = meta;
        self.psl = psl;
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

    /// Current slot count (a power of two)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.meta.len()
    }

    /// Current load factor
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    /// Whether equal keys are kept as separate entries
    #[inline]
    pub fn is_multimap(&self) -> bool {
        self.multimap
    }

    /// Insert a key/value pair
    ///
    /// In map mode an existing entry for the key has its value replaced in
    /// place (metadata and probe length untouched) and the old value is
    /// returned. In multimap mode every insert creates a fresh slot.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        if !self.multimap {
            if let Some(i) = self.locate(&key) {
                let pair = unsafe { &mut *self.slots[i].as_mut_ptr() };
                let old = mem::replace(&mut pair.1, value);
                return Ok(Some(old));
            }
        }

        if (self.count + 1) as f64 / self.capacity() as f64 > self.max_load_factor {
            let cap = self.capacity();
            self.rehash(cap * 2)?;
        }

        self.place_pair((key, value))?;
        self.count += 1;
        Ok(None)
    }

    /// Robin-Hood placement, growing on probe-length overflow
    fn place_pair(&mut self, mut pair: (K, V)) -> Result<()> {
        loop {
            match self.try_place(pair) {
                Ok(()) => return Ok(()),
                Err(displaced) => {
                    pair = displaced;
                    let cap = self.capacity();
                    self.rehash(cap * 2)?;
                }
            }
        }
    }

    /// One Robin-Hood probe walk; `Err` carries whichever pair was in
    /// hand when its probe length would no longer fit in a byte
    fn try_place(&mut self, pair: (K, V)) -> std::result::Result<(), (K, V)> {
        let hash = hash_of(&pair.0);
        let mask = self.capacity() - 1;
        let mut i = (hash as usize) & mask;
        let mut carried = MaybeUninit::new(pair);
        let mut cmeta = meta_byte(hash);
        let mut cpsl: u8 = 0;

        loop {
            if self.meta[i] & OCCUPIED == 0 {
                self.slots[i] = carried;
                self.meta[i] = cmeta;
                self.psl[i] = cpsl;
                return Ok(());
            }
            if self.psl[i] < cpsl {
                mem::swap(&mut self.slots[i], &mut carried);
                mem::swap(&mut self.meta[i], &mut cmeta);
                mem::swap(&mut self.psl[i], &mut cpsl);
            }
            if cpsl == u8::MAX {
                return Err(unsafe { carried.assume_init() });
            }
            cpsl += 1;
            i = (i + 1) & mask;
        }
    }

    /// Slot index of the first entry matching `key`
    ///
    /// Probes forward from the home slot, fast-rejecting on the metadata
    /// byte (the occupied bit is tested before the hash bits), and stops
    /// at the first empty slot.
    pub fn locate(&self, key: &K) -> Option<usize> {
        let hash = hash_of(key);
        let want = meta_byte(hash);
        let mask = self.capacity() - 1;
        let mut i = (hash as usize) & mask;

        for _ in 0..=mask {
            let m = self.meta[i];
            if m & OCCUPIED == 0 {
                return None;
            }
            if m == want {
                let stored = unsafe { &*self.slots[i].as_ptr() };
                if stored.0 == *key {
                    return Some(i);
                }
            }
            i = (i + 1) & mask;
        }
        None
    }

    /// Reference to the value stored for `key` (first match in multimap
    /// mode)
    pub fn get(&self, key: &K) -> Option<&V> {
        self.locate(key)
            .map(|i| unsafe { &(*self.slots[i].as_ptr()).1 })
    }

    /// Mutable reference to the value stored for `key`
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.locate(key) {
            Some(i) => Some(unsafe { &mut (*self.slots[i].as_mut_ptr()).1 }),
            None => None,
        }
    }

    /// Check if the map contains `key`
    pub fn contains_key(&self, key: &K) -> bool {
        self.locate(key).is_some()
    }

    /// Remove every entry whose key equals `key`, returning the first
    /// removed value
    ///
    /// Back-shifts the following cluster so probe lengths stay exact.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let mut first = None;
        while let Some(i) = self.locate(key) {
            let (_, value) = self.remove_at(i);
            if first.is_none() {
                first = Some(value);
            }
            if !self.multimap {
                break;
            }
        }
        first
    }

    /// Remove the entry at slot `i`, back-shifting the cluster behind it
    fn remove_at(&mut self, mut i: usize) -> (K, V) {
        let mask = self.capacity() - 1;
        let pair = unsafe { self.slots[i].assume_init_read() };

        loop {
            let next = (i + 1) & mask;
            if self.meta[next] & OCCUPIED == 0 || self.psl[next] == 0 {
                self.meta[i] = 0;
                self.psl[i] = 0;
                break;
            }
            let src = self.slots[next].as_ptr();
            let dst = self.slots[i].as_mut_ptr();
            unsafe {
                ptr::copy_nonoverlapping(src, dst, 1);
            }
            self.meta[i] = self.meta[next];
            self.psl[i] = self.psl[next] - 1;
            i = next;
        }

        self.count -= 1;
        pair
    }

    /// Double (or otherwise resize) the table and re-place every entry
    ///
    /// Fresh storage is built completely before the swap; payloads move
    /// by raw transfer and the old slot vector is freed without running
    /// element destructors.
    fn rehash(&mut self, new_cap: usize) -> Result<()> {
        debug_assert!(new_cap.is_power_of_two() && new_cap > self.count);

        let mut new_slots = DynVec::with_capacity(new_cap)?;
        new_slots.resize_with(new_cap, MaybeUninit::uninit)?;
        let mut new_meta = DynVec::with_capacity(new_cap)?;
        new_meta.resize(new_cap, 0u8)?;
        let mut new_psl = DynVec::with_capacity(new_cap)?;
        new_psl.resize(new_cap, 0u8)?;

        let old_slots = mem::replace(&mut self.slots, new_slots);
        let old_meta = mem::replace(&mut self.meta, new_meta);
        let _old_psl = mem::replace(&mut self.psl, new_psl);

        for i in 0..old_meta.len() {
            if old_meta[i] & OCCUPIED != 0 {
                let pair = unsafe { old_slots[i].assume_init_read() };
                self.place_pair(pair)?;
            }
        }
        // old_slots holds only MaybeUninit cells now; dropping it releases
        // storage without touching the transferred payloads
        Ok(())
    }
}

impl<K, V> DenseMap<K, V> {
    /// Key/value pair stored at slot `i`, if occupied
    pub fn entry_at(&self, i: usize) -> Option<(&K, &V)> {
        if i < self.meta.len() && self.meta[i] & OCCUPIED != 0 {
            let pair = unsafe { &*self.slots[i].as_ptr() };
            Some((&pair.0, &pair.1))
        } else {
            None
        }
    }

    /// Probe length recorded for slot `i`, if occupied
    pub fn probe_len_at(&self, i: usize) -> Option<u8> {
        if i < self.meta.len() && self.meta[i] & OCCUPIED != 0 {
            Some(self.psl[i])
        } else {
            None
        }
    }

    /// Drop every entry, keeping the table allocation
    pub fn clear(&mut self) {
        for i in 0..self.meta.len() {
            if self.meta[i] & OCCUPIED != 0 {
                unsafe {
                    self.slots[i].assume_init_drop();
                }
                self.meta[i] = 0;
                self.psl[i] = 0;
            }
        }
        self.count = 0;
    }

    /// Iterate over the live entries in slot order
    pub fn iter(&self) -> DenseMapIter<'_, K, V> {
        DenseMapIter { map: self, index: 0 }
    }
}

impl<K, V> Drop for DenseMap<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Hash + Eq, V> Default for DenseMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a [`DenseMap`]'s live entries
pub struct DenseMapIter<'a, K, V> {
    map: &'a DenseMap<K, V>,
    index: usize,
}

impl<'a, K, V> Iterator for DenseMapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.map.meta.len() {
            let i = self.index;
            self.index += 1;
            if let Some(entry) = self.map.entry_at(i) {
                return Some(entry);
            }
        }
        None
    }
}
