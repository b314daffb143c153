//! DynVec: dynamic array with realloc growth and a configurable growth ratio
//!
//! Unlike std::Vec which uses malloc+memcpy for growth, DynVec uses realloc
//! which can often avoid copying when the allocator can expand in place. On
//! top of the usual push/pop surface it offers order-preserving and
//! swap-with-last mutation, element filtering, merging, and in-place sorts.

use crate::error::{GroundworkError, Result};
use std::alloc::{self, Layout};
use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr::{self, NonNull};
use std::slice;

/// Capacity floor used the first time an empty vector grows.
const INITIAL_CAPACITY: usize = 4;

/// Dynamic array of owned elements with realloc-based geometric growth
///
/// Element duplication is expressed through `T: Clone` bounds on the
/// operations that actually duplicate (`clone`, [`DynVec::merge`],
/// [`DynVec::filter`], [`DynVec::resize`]); teardown is ordinary `Drop`.
/// Internal shifting moves cells without cloning.
///
/// The growth ratio is configurable: when full, capacity becomes
/// `capacity * (1 + resize_factor)`, repeated until the request fits.
/// The default factor of 1.0 doubles the allocation. Capacity never
/// shrinks.
///
/// # Examples
///
/// ```rust
/// use groundwork::DynVec;
///
/// let mut vec = DynVec::new();
/// vec.push_back(42)?;
/// vec.push_back(84)?;
/// assert_eq!(vec.len(), 2);
/// assert_eq!(vec[0], 42);
/// # Ok::<(), groundwork::GroundworkError>(())
/// ```
pub struct DynVec<T> {
    ptr: Option<NonNull<T>>,
    len: usize,
    cap: usize,
    resize_factor: f64,
}

impl<T> DynVec<T> {
    /// Create a new empty vector with the default growth ratio
    #[inline]
    pub fn new() -> Self {
        Self {
            ptr: None,
            len: 0,
            cap: 0,
            resize_factor: 1.0,
        }
    }

    /// Create an empty vector with a custom growth ratio
    ///
    /// `factor` must be positive and finite; growth multiplies capacity by
    /// `1 + factor`.
    pub fn with_resize_factor(factor: f64) -> Result<Self> {
        if !(factor > 0.0) || !factor.is_finite() {
            return Err(GroundworkError::invalid_config(format!(
                "resize factor must be positive and finite, got {}",
                factor
            )));
        }
        Ok(Self {
            ptr: None,
            len: 0,
            cap: 0,
            resize_factor: factor,
        })
    }

    /// Create a vector with the specified capacity
    pub fn with_capacity(cap: usize) -> Result<Self> {
        let mut vec = Self::new();
        if cap > 0 {
            vec.grow_exact(cap)?;
        }
        Ok(vec)
    }

    /// Number of live elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the vector is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated cells
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Configured growth ratio
    #[inline]
    pub fn resize_factor(&self) -> f64 {
        self.resize_factor
    }

    /// Pointer to the underlying data
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => ptr::null(),
        }
    }

    /// Mutable pointer to the underlying data
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => ptr::null_mut(),
        }
    }

    /// The live elements as a slice
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        if self.len == 0 {
            &[]
        } else {
            unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
        }
    }

    /// The live elements as a mutable slice
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        if self.len == 0 {
            &mut []
        } else {
            unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
        }
    }

    /// Reference to the element at `pos`, or `None` past the live range
    #[inline]
    pub fn get(&self, pos: usize) -> Option<&T> {
        if pos < self.len {
            Some(unsafe { &*self.as_ptr().add(pos) })
        } else {
            None
        }
    }

    /// Mutable reference to the element at `pos`
    #[inline]
    pub fn get_mut(&mut self, pos: usize) -> Option<&mut T> {
        if pos < self.len {
            Some(unsafe { &mut *self.as_mut_ptr().add(pos) })
        } else {
            None
        }
    }

    /// Reference to the first element
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Reference to the last element
    #[inline]
    pub fn back(&self) -> Option<&T> {
        if self.len == 0 {
            None
        } else {
            self.get(self.len - 1)
        }
    }

    /// Ensure `capacity >= min_cap`; never touches the live range
    pub fn reserve(&mut self, min_cap: usize) -> Result<()> {
        if min_cap <= self.cap {
            return Ok(());
        }
        let mut target = self.cap.max(INITIAL_CAPACITY);
        while target < min_cap {
            target = self.next_capacity(target)?;
        }
        self.grow_exact(target)
    }

    /// Next capacity step under the configured growth ratio
    fn next_capacity(&self, cap: usize) -> Result<usize> {
        let grown = (cap as f64 * (1.0 + self.resize_factor)) as usize;
        let next = grown.max(cap + 1);
        if next <= cap {
            return Err(GroundworkError::out_of_memory(usize::MAX));
        }
        Ok(next)
    }

    /// Reallocate to exactly `new_cap` cells using realloc
    fn grow_exact(&mut self, new_cap: usize) -> Result<()> {
        if mem::size_of::<T>() == 0 {
            // zero-sized payloads need no storage; the allocator must
            // never see a zero-size layout
            self.ptr = Some(NonNull::dangling());
            self.cap = usize::MAX;
            return Ok(());
        }
        debug_assert!(new_cap > self.cap);
        let new_layout = Layout::array::<T>(new_cap)
            .map_err(|_| GroundworkError::out_of_memory(new_cap.saturating_mul(mem::size_of::<T>())))?;

        let new_ptr = match self.ptr {
            Some(ptr) => {
                let old_layout = Layout::array::<T>(self.cap).unwrap();
                unsafe {
                    alloc::realloc(ptr.as_ptr() as *mut u8, old_layout, new_layout.size()) as *mut T
                }
            }
            None => unsafe { alloc::alloc(new_layout) as *mut T },
        };

        if new_ptr.is_null() {
            log::error!("DynVec growth to {} cells failed", new_cap);
            return Err(GroundworkError::out_of_memory(new_layout.size()));
        }

        self.ptr = Some(unsafe { NonNull::new_unchecked(new_ptr) });
        self.cap = new_cap;
        Ok(())
    }

    /// Grow so that one more element fits
    #[inline]
    fn make_room(&mut self) -> Result<()> {
        if self.len < self.cap {
            return Ok(());
        }
        self.reserve(self.len + 1)
    }

    /// Append an element at the tail
    pub fn push_back(&mut self, value: T) -> Result<()> {
        self.make_room()?;
        unsafe {
            ptr::write(self.as_mut_ptr().add(self.len), value);
        }
        self.len += 1;
        Ok(())
    }

    /// Insert an element at position 0, shifting everything up
    pub fn push_front(&mut self, value: T) -> Result<()> {
        self.insert(0, value)
    }

    /// Remove and return the last element
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            Some(unsafe { ptr::read(self.as_ptr().add(self.len)) })
        }
    }

    /// Remove and return the first element, shifting the tail down
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.remove(0).ok()
        }
    }

    /// Order-preserving insert at `pos`, shifting `[pos, len)` up one cell
    pub fn insert(&mut self, pos: usize, value: T) -> Result<()> {
        if pos > self.len {
            return Err(GroundworkError::out_of_bounds(pos, self.len));
        }
        self.make_room()?;
        unsafe {
            let p = self.as_mut_ptr().add(pos);
            ptr::copy(p, p.add(1), self.len - pos);
            ptr::write(p, value);
        }
        self.len += 1;
        Ok(())
    }

    /// Non-order-preserving insert: the current occupant of `pos` moves to
    /// the tail, then `value` lands at `pos`
    pub fn insert_fast(&mut self, pos: usize, value: T) -> Result<()> {
        if pos > self.len {
            return Err(GroundworkError::out_of_bounds(pos, self.len));
        }
        self.make_room()?;
        unsafe {
            let base = self.as_mut_ptr();
            if pos < self.len {
                ptr::copy_nonoverlapping(base.add(pos), base.add(self.len), 1);
            }
            ptr::write(base.add(pos), value);
        }
        self.len += 1;
        Ok(())
    }

    /// Order-preserving removal returning the payload
    pub fn remove(&mut self, pos: usize) -> Result<T> {
        if pos >= self.len {
            return Err(GroundworkError::out_of_bounds(pos, self.len));
        }
        unsafe {
            let p = self.as_mut_ptr().add(pos);
            let value = ptr::read(p);
            ptr::copy(p.add(1), p, self.len - pos - 1);
            self.len -= 1;
            Ok(value)
        }
    }

    /// Order-preserving removal dropping the payload in place
    pub fn delete(&mut self, pos: usize) -> Result<()> {
        self.remove(pos).map(drop)
    }

    /// Swap-with-last removal returning the payload
    pub fn remove_fast(&mut self, pos: usize) -> Result<T> {
        if pos >= self.len {
            return Err(GroundworkError::out_of_bounds(pos, self.len));
        }
        unsafe {
            let base = self.as_mut_ptr();
            let value = ptr::read(base.add(pos));
            self.len -= 1;
            if pos != self.len {
                ptr::copy_nonoverlapping(base.add(self.len), base.add(pos), 1);
            }
            Ok(value)
        }
    }

    /// Swap-with-last removal dropping the payload
    pub fn delete_fast(&mut self, pos: usize) -> Result<()> {
        self.remove_fast(pos).map(drop)
    }

    /// Raw in-place swap of two cells
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        crate::error::check_bounds(i, self.len)?;
        crate::error::check_bounds(j, self.len)?;
        if i != j {
            unsafe {
                let base = self.as_mut_ptr();
                ptr::swap(base.add(i), base.add(j));
            }
        }
        Ok(())
    }

    /// Drop every live element, keeping capacity
    pub fn clear(&mut self) {
        for i in 0..self.len {
            unsafe {
                ptr::drop_in_place(self.as_mut_ptr().add(i));
            }
        }
        self.len = 0;
    }

    /// Force `len = new_len`, filling growth with values produced by `f`
    /// and dropping any vacated tail
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<()>
    where
        F: FnMut() -> T,
    {
        if new_len > self.len {
            self.reserve(new_len)?;
            for i in self.len..new_len {
                unsafe {
                    ptr::write(self.as_mut_ptr().add(i), f());
                }
            }
        } else {
            for i in new_len..self.len {
                unsafe {
                    ptr::drop_in_place(self.as_mut_ptr().add(i));
                }
            }
        }
        self.len = new_len;
        Ok(())
    }

    /// True iff no adjacent pair compares descending
    pub fn check_sorted<F>(&self, mut cmp: F) -> bool
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.as_slice()
            .windows(2)
            .all(|w| cmp(&w[0], &w[1]) != Ordering::Greater)
    }

    /// Sort in place; currently dispatches to insertion sort
    pub fn sort<F>(&mut self, cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.insertion_sort(cmp);
    }

    /// Classic insertion sort; stable, O(n^2), fast on short or nearly
    /// sorted input
    pub fn insertion_sort<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let s = self.as_mut_slice();
        for i in 1..s.len() {
            let mut j = i;
            while j > 0 && cmp(&s[j - 1], &s[j]) == Ordering::Greater {
                s.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    /// Bubble sort; stable, O(n^2)
    pub fn bubble_sort<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let s = self.as_mut_slice();
        let n = s.len();
        for pass in 0..n {
            let mut swapped = false;
            for j in 1..n - pass {
                if cmp(&s[j - 1], &s[j]) == Ordering::Greater {
                    s.swap(j - 1, j);
                    swapped = true;
                }
            }
            if !swapped {
                break;
            }
        }
    }

    /// Bottom-up merge sort; stable, O(n log n), uses a scratch buffer of
    /// `len` cells
    pub fn merge_sort<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let len = self.len;
        if len < 2 {
            return;
        }
        let mut scratch: Vec<T> = Vec::with_capacity(len);
        let data = self.as_mut_ptr();
        let mut width = 1;
        while width < len {
            let mut start = 0;
            while start < len {
                let mid = (start + width).min(len);
                let end = (start + 2 * width).min(len);
                if mid < end {
                    unsafe {
                        merge_runs(data, start, mid, end, scratch.as_mut_ptr(), &mut cmp);
                    }
                }
                start = end;
            }
            width *= 2;
        }
    }

    /// Iterate over the live elements
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T: Clone> DynVec<T> {
    /// Force `len = new_len`; growth clones `fill`, shrink drops the
    /// vacated tail
    pub fn resize(&mut self, new_len: usize, fill: T) -> Result<()> {
        self.resize_with(new_len, || fill.clone())
    }

    /// Append a clone of every live element of `other`
    pub fn merge(&mut self, other: &DynVec<T>) -> Result<()> {
        self.reserve(self.len + other.len)?;
        for item in other.as_slice() {
            self.push_back(item.clone())?;
        }
        Ok(())
    }

    /// New vector holding clones of the elements satisfying `pred`
    pub fn filter<F>(&self, mut pred: F) -> Result<DynVec<T>>
    where
        F: FnMut(&T) -> bool,
    {
        let mut out = DynVec::new();
        out.resize_factor = self.resize_factor;
        for item in self.as_slice() {
            if pred(item) {
                out.push_back(item.clone())?;
            }
        }
        Ok(out)
    }
}

/// Merge two adjacent sorted runs `[start, mid)` and `[mid, end)` of `data`
/// through `scratch`, which must have room for `end - start` cells.
///
/// # Safety
///
/// All indices must lie within the initialized range of `data`, and
/// `scratch` must point to writable uninitialized storage. Elements are
/// moved out and back; `scratch` never owns them past the call.
unsafe fn merge_runs<T, F>(
    data: *mut T,
    start: usize,
    mid: usize,
    end: usize,
    scratch: *mut T,
    cmp: &mut F,
) where
    F: FnMut(&T, &T) -> Ordering,
{
    unsafe {
        let (mut i, mut j, mut k) = (start, mid, 0);
        while i < mid && j < end {
            if cmp(&*data.add(i), &*data.add(j)) == Ordering::Greater {
                ptr::copy_nonoverlapping(data.add(j), scratch.add(k), 1);
                j += 1;
            } else {
                ptr::copy_nonoverlapping(data.add(i), scratch.add(k), 1);
                i += 1;
            }
            k += 1;
        }
        while i < mid {
            ptr::copy_nonoverlapping(data.add(i), scratch.add(k), 1);
            i += 1;
            k += 1;
        }
        while j < end {
            ptr::copy_nonoverlapping(data.add(j), scratch.add(k), 1);
            j += 1;
            k += 1;
        }
        ptr::copy_nonoverlapping(scratch, data.add(start), k);
    }
}

impl<T> Default for DynVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for DynVec<T> {
    fn drop(&mut self) {
        self.clear();
        if mem::size_of::<T>() == 0 {
            return;
        }
        if let Some(ptr) = self.ptr {
            if self.cap > 0 {
                unsafe {
                    let layout = Layout::array::<T>(self.cap).unwrap();
                    alloc::dealloc(ptr.as_ptr() as *mut u8, layout);
                }
            }
        }
    }
}

impl<T> Deref for DynVec<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T> DerefMut for DynVec<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T> Index<usize> for DynVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for DynVec<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.as_mut_slice()[index]
    }
}

impl<T: fmt::Debug> fmt::Debug for DynVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynVec<T> {}

impl<T: Clone> Clone for DynVec<T> {
    fn clone(&self) -> Self {
        let mut new_vec = Self::with_capacity(self.len).unwrap();
        new_vec.resize_factor = self.resize_factor;
        for item in self.as_slice() {
            new_vec.push_back(item.clone()).unwrap();
        }
        new_vec
    }
}

impl<'a, T> IntoIterator for &'a DynVec<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

// Safety: DynVec<T> owns its elements; thread transfer follows T.
unsafe impl<T: Send> Send for DynVec<T> {}
unsafe impl<T: Sync> Sync for DynVec<T> {}
