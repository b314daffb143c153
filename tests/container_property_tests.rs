//! Property-based testing for the core containers
//!
//! Uses proptest to validate the structural invariants each container
//! promises: length/capacity accounting, zero-extension past a bit
//! sequence's length, Robin-Hood probe distances, map/model agreement,
//! and copy/destroy balance for owned payloads.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicIsize, Ordering};

use groundwork::{BitVec, DenseMap, DynVec, SparseMap};

// =============================================================================
// DYNVEC
// =============================================================================

proptest! {
    #[test]
    fn prop_dynvec_length_le_capacity(
        elements in prop::collection::vec(any::<i32>(), 0..2000)
    ) {
        let mut vec = DynVec::new();
        let mut last_cap = vec.capacity();
        for &elem in &elements {
            vec.push_back(elem).unwrap();
            prop_assert!(vec.len() <= vec.capacity());
            // capacity never shrinks
            prop_assert!(vec.capacity() >= last_cap);
            last_cap = vec.capacity();
        }
        prop_assert_eq!(vec.len(), elements.len());
        for (i, &expected) in elements.iter().enumerate() {
            prop_assert_eq!(vec[i], expected);
        }
    }

    #[test]
    fn prop_dynvec_push_pop_symmetry(
        elements in prop::collection::vec(any::<u64>(), 0..1000)
    ) {
        let mut vec = DynVec::new();
        for &elem in &elements {
            vec.push_back(elem).unwrap();
        }
        let mut popped = Vec::new();
        while let Some(elem) = vec.pop_back() {
            popped.push(elem);
        }
        popped.reverse();
        prop_assert_eq!(popped, elements);
        prop_assert!(vec.is_empty());
    }

    #[test]
    fn prop_dynvec_remove_fast_keeps_membership(
        elements in prop::collection::vec(any::<u32>(), 1..300)
    ) {
        let mut vec = DynVec::new();
        for &elem in &elements {
            vec.push_back(elem).unwrap();
        }
        let mut drained = Vec::new();
        while !vec.is_empty() {
            drained.push(vec.remove_fast(0).unwrap());
        }
        let mut expected = elements.clone();
        expected.sort_unstable();
        drained.sort_unstable();
        prop_assert_eq!(drained, expected);
    }

    #[test]
    fn prop_dynvec_sort_matches_std(
        mut elements in prop::collection::vec(any::<i64>(), 0..500)
    ) {
        let mut vec = DynVec::new();
        for &elem in &elements {
            vec.push_back(elem).unwrap();
        }
        vec.merge_sort(|a, b| a.cmp(b));
        prop_assert!(vec.check_sorted(|a, b| a.cmp(b)));
        elements.sort();
        prop_assert_eq!(vec.as_slice(), elements.as_slice());
    }
}

// =============================================================================
// BITVEC
// =============================================================================

/// Reference model: a plain Vec<bool>
fn model_from_ops(ops: &[(bool, usize)]) -> Vec<bool> {
    let mut model = Vec::new();
    for &(value, index) in ops {
        if index >= model.len() {
            model.resize(index + 1, false);
        }
        model[index] = value;
    }
    model
}

proptest! {
    #[test]
    fn prop_bitvec_matches_bool_model(
        ops in prop::collection::vec((any::<bool>(), 0usize..2000), 0..200)
    ) {
        let mut bits = BitVec::new();
        for &(value, index) in &ops {
            if value {
                bits.set(index).unwrap();
            } else {
                bits.clear_bit(index).unwrap();
            }
        }
        let model = model_from_ops(&ops);
        prop_assert_eq!(bits.len(), model.len());
        for (i, &expected) in model.iter().enumerate() {
            prop_assert_eq!(bits.get(i), expected);
        }
        prop_assert_eq!(bits.count_ones(), model.iter().filter(|&&b| b).count());
    }

    #[test]
    fn prop_bitvec_zero_extension_after_mutation(
        len in 1usize..600,
        extra_sets in prop::collection::vec(0usize..600, 0..50)
    ) {
        let mut bits = BitVec::new();
        bits.reserve(len).unwrap();
        // dirty the full allocation, then shrink the logical length
        bits.set_all();
        bits.resize(len, true).unwrap();
        for &i in &extra_sets {
            if i < len {
                bits.set(i).unwrap();
            }
        }
        // bits past len read as zero regardless of stored word contents
        for i in bits.len()..bits.capacity() {
            prop_assert!(!bits.get(i));
        }
        prop_assert_eq!(bits.count_ones(), bits.len());

        // bulk ops see the same zero extension: against an all-ones
        // operand twice the length, the tail comes out all ones
        let mut ones = BitVec::new();
        ones.set_range(0, len * 2).unwrap();
        let x = bits.xor(&ones).unwrap();
        prop_assert_eq!(x.len(), len * 2);
        for i in 0..len {
            prop_assert!(!x.get(i));
        }
        for i in len..len * 2 {
            prop_assert!(x.get(i));
        }
    }

    #[test]
    fn prop_bitvec_double_not_identity(
        pattern in prop::collection::vec(any::<bool>(), 1..500)
    ) {
        let mut bits = BitVec::new();
        for &b in &pattern {
            bits.push(b).unwrap();
        }
        let back = bits.not().unwrap().not().unwrap();
        prop_assert_eq!(&back, &bits);
    }

    #[test]
    fn prop_bitvec_self_xor_is_zero(
        pattern in prop::collection::vec(any::<bool>(), 1..500)
    ) {
        let mut bits = BitVec::new();
        for &b in &pattern {
            bits.push(b).unwrap();
        }
        let zero = bits.xor(&bits).unwrap();
        prop_assert_eq!(zero.len(), bits.len());
        prop_assert_eq!(zero.count_ones(), 0);
    }

    #[test]
    fn prop_bitvec_range_fill_matches_loop(
        start in 0usize..300,
        n in 0usize..300
    ) {
        let mut bulk = BitVec::new();
        let mut scalar = BitVec::new();
        if n > 0 {
            bulk.set_range(start, n).unwrap();
            for i in start..start + n {
                scalar.set(i).unwrap();
            }
            prop_assert_eq!(&bulk, &scalar);
        }
    }
}

// =============================================================================
// DENSEMAP
// =============================================================================

proptest! {
    #[test]
    fn prop_densemap_probe_distance_exact(
        keys in prop::collection::hash_set(any::<u64>(), 0..800)
    ) {
        let mut map = DenseMap::new();
        for &k in &keys {
            map.insert(k, ()).unwrap();
        }
        let cap = map.capacity();
        let mut live = 0;
        for i in 0..cap {
            if map.entry_at(i).is_some() {
                live += 1;
                prop_assert!(map.probe_len_at(i).is_some());
            }
        }
        prop_assert_eq!(live, keys.len());
    }

    #[test]
    fn prop_densemap_matches_std_hashmap(
        ops in prop::collection::vec((any::<u16>(), any::<u32>(), any::<bool>()), 0..500)
    ) {
        let mut map = DenseMap::new();
        let mut model: HashMap<u16, u32> = HashMap::new();
        for &(k, v, is_insert) in &ops {
            if is_insert {
                let mine = map.insert(k, v).unwrap();
                let theirs = model.insert(k, v);
                prop_assert_eq!(mine, theirs);
            } else {
                prop_assert_eq!(map.remove(&k), model.remove(&k));
            }
        }
        prop_assert_eq!(map.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(map.get(k), Some(v));
        }
    }
}

// =============================================================================
// SPARSEMAP
// =============================================================================

proptest! {
    #[test]
    fn prop_sparsemap_matches_std_hashmap(
        ops in prop::collection::vec((any::<u16>(), any::<u32>(), any::<bool>()), 0..500)
    ) {
        let mut map = SparseMap::new();
        let mut model: HashMap<u16, u32> = HashMap::new();
        for &(k, v, is_insert) in &ops {
            if is_insert {
                let mine = map.insert(k, v).unwrap();
                let theirs = model.insert(k, v);
                prop_assert_eq!(mine, theirs);
            } else {
                prop_assert_eq!(map.remove(&k), model.remove(&k));
            }
        }
        prop_assert_eq!(map.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(map.get(k), Some(v));
        }
    }
}

// =============================================================================
// COPY/DESTROY BALANCE
// =============================================================================

static LIVE: AtomicIsize = AtomicIsize::new(0);

#[derive(Debug, PartialEq)]
struct Counted(u32);

impl Counted {
    fn new(v: u32) -> Self {
        LIVE.fetch_add(1, Ordering::SeqCst);
        Counted(v)
    }
}

impl Clone for Counted {
    fn clone(&self) -> Self {
        Counted::new(self.0)
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        LIVE.fetch_sub(1, Ordering::SeqCst);
    }
}

#[test]
fn copy_destroy_balance_over_vector_lifetime() {
    // serialized access to the global counter
    let before = LIVE.load(Ordering::SeqCst);
    {
        let mut vec = DynVec::new();
        for i in 0..100 {
            vec.push_back(Counted::new(i)).unwrap();
        }
        let merged = vec.clone();
        assert_eq!(LIVE.load(Ordering::SeqCst) - before, 200);

        for _ in 0..30 {
            vec.pop_back();
        }
        vec.resize(50, Counted::new(7)).unwrap();
        assert_eq!(
            LIVE.load(Ordering::SeqCst) - before,
            (vec.len() + merged.len()) as isize
        );
    }
    // live payload count returns to the baseline at destruction
    assert_eq!(LIVE.load(Ordering::SeqCst), before);
}
