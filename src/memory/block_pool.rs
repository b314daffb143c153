//! Fixed-block pool allocator with linear page growth
//!
//! The pool hands out fixed-size blocks carved from pages of `2^k`
//! contiguous blocks. Pages are appended as demand grows and never
//! released before the pool is dropped. A bit per block tracks occupancy,
//! and a last-freed hint makes free/alloc ping-pong cheap.

use crate::bits::BitVec;
use crate::containers::DynVec;
use crate::error::{GroundworkError, Result};
use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// Default page size exponent: pages hold `2^5 = 32` blocks.
pub const DEFAULT_PAGE_SHIFT: u32 = 5;

/// Growth step for the page-pointer vector, in entries.
const COL_STEP: usize = 8;

/// Byte alignment of every block.
const BLOCK_ALIGN: usize = 8;

/// Configuration for a [`BlockPool`]
#[derive(Debug, Clone)]
pub struct BlockPoolConfig {
    /// Page size exponent; each page holds `2^page_shift` blocks
    pub page_shift: u32,
}

impl Default for BlockPoolConfig {
    fn default() -> Self {
        Self {
            page_shift: DEFAULT_PAGE_SHIFT,
        }
    }
}

/// Pool of fixed-size blocks with linear page growth
///
/// Strictly single-threaded; the pool holds raw page pointers and is
/// neither `Send` nor `Sync`. Blocks come back zeroed only on first use
/// (pages are allocated zeroed); recycled blocks keep their old contents.
///
/// # Examples
///
/// ```rust
/// use groundwork::BlockPool;
///
/// let mut pool = BlockPool::new(24)?;
/// let a = pool.allocate()?;
/// let b = pool.allocate()?;
/// assert_ne!(a, b);
/// pool.free(a);
/// # Ok::<(), groundwork::GroundworkError>(())
/// ```
pub struct BlockPool {
    block_size: usize,
    page_shift: u32,
    pages: DynVec<NonNull<u8>>,
    occupancy: BitVec,
    allocated: usize,
    last_freed: Option<usize>,
}

impl BlockPool {
    /// Create a pool with the default page size (32 blocks per page)
    pub fn new(block_size: usize) -> Result<Self> {
        Self::with_config(block_size, BlockPoolConfig::default())
    }

    /// Create a pool with an explicit page size exponent
    pub fn with_config(block_size: usize, config: BlockPoolConfig) -> Result<Self> {
        if block_size == 0 {
            log::error!("BlockPool rejects zero block size");
            return Err(GroundworkError::invalid_config("block size must be non-zero"));
        }
        let mut pool = Self {
            block_size,
            page_shift: config.page_shift,
            pages: DynVec::new(),
            occupancy: BitVec::new(),
            allocated: 0,
            last_freed: None,
        };
        pool.add_page()?;
        Ok(pool)
    }

    /// Size of each block in bytes
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Blocks per page
    #[inline]
    pub fn blocks_per_page(&self) -> usize {
        1usize << self.page_shift
    }

    /// Total block capacity across all pages
    #[inline]
    pub fn capacity(&self) -> usize {
        self.pages.len() * self.blocks_per_page()
    }

    /// Number of blocks currently handed out
    #[inline]
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Occupancy ratio in `[0, 1]`
    pub fn load(&self) -> f64 {
        let cap = self.capacity();
        if cap == 0 {
            0.0
        } else {
            self.allocated as f64 / cap as f64
        }
    }

    fn page_layout(&self) -> Layout {
        Layout::from_size_align(self.block_size * self.blocks_per_page(), BLOCK_ALIGN).unwrap()
    }

    /// Append one zeroed page; the page-pointer vector grows in
    /// `COL_STEP`-entry steps
    fn add_page(&mut self) -> Result<()> {
        let layout = self.page_layout();
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or_else(|| {
            log::error!("BlockPool page allocation of {} bytes failed", layout.size());
            GroundworkError::out_of_memory(layout.size())
        })?;

        let wanted = (self.pages.len() + COL_STEP) / COL_STEP * COL_STEP;
        self.pages.reserve(wanted)?;
        self.pages.push_back(ptr)?;
        Ok(())
    }

    /// Ensure total capacity covers at least `n_blocks`
    pub fn reserve(&mut self, n_blocks: usize) -> Result<()> {
        while self.capacity() < n_blocks {
            self.add_page()?;
        }
        Ok(())
    }

    /// Pointer to block `index`
    #[inline]
    fn block_ptr(&self, index: usize) -> NonNull<u8> {
        let page = index >> self.page_shift;
        let slot = index & (self.blocks_per_page() - 1);
        unsafe { NonNull::new_unchecked(self.pages[page].as_ptr().add(slot * self.block_size)) }
    }

    /// Hand out one block
    ///
    /// Prefers the last-freed hint, falls back to a first-fit scan of the
    /// occupancy map, and grows by one page when the pool is full.
    pub fn allocate(&mut self) -> Result<NonNull<u8>> {
        if let Some(hint) = self.last_freed {
            if hint < self.capacity() && !self.occupancy.get(hint) {
                return self.take(hint);
            }
            self.last_freed = None;
        }

        for i in 0..self.capacity() {
            if !self.occupancy.get(i) {
                return self.take(i);
            }
        }

        // pool is full; grow one block's worth of capacity (a whole page)
        let first_new = self.capacity();
        self.reserve(first_new + 1)?;
        self.take(first_new)
    }

    fn take(&mut self, index: usize) -> Result<NonNull<u8>> {
        self.occupancy.set(index)?;
        self.allocated += 1;

        if self.last_freed == Some(index) {
            let next = index + 1;
            if next < self.capacity() && !self.occupancy.get(next) {
                self.last_freed = Some(next);
            } else {
                self.last_freed = None;
            }
        }
        Ok(self.block_ptr(index))
    }

    /// Return a block to the pool
    ///
    /// Double frees and pointers that belong to no page are logged and
    /// skipped; neither aborts.
    pub fn free(&mut self, block: NonNull<u8>) {
        let addr = block.as_ptr() as usize;
        let page_bytes = self.block_size * self.blocks_per_page();

        for (page_idx, page) in self.pages.iter().enumerate() {
            let base = page.as_ptr() as usize;
            if addr >= base && addr < base + page_bytes {
                let offset = addr - base;
                if offset % self.block_size != 0 {
                    log::error!(
                        "BlockPool::free: pointer {:p} is inside page {} but not on a block boundary",
                        block.as_ptr(),
                        page_idx
                    );
                    return;
                }
                let index = page_idx * self.blocks_per_page() + offset / self.block_size;
                if !self.occupancy.get(index) {
                    log::warn!("BlockPool::free: double free of block {}", index);
                    return;
                }
                // clear_bit cannot fail here; the bit is within capacity
                let _ = self.occupancy.clear_bit(index);
                self.allocated -= 1;
                self.last_freed = Some(index);
                return;
            }
        }

        log::error!(
            "BlockPool::free: pointer {:p} does not belong to this pool",
            block.as_ptr()
        );
    }
}

impl Drop for BlockPool {
    fn drop(&mut self) {
        let layout = self.page_layout();
        for page in self.pages.iter() {
            unsafe {
                alloc::dealloc(page.as_ptr(), layout);
            }
        }
    }
}

impl std::fmt::Debug for BlockPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockPool")
            .field("block_size", &self.block_size)
            .field("blocks_per_page", &self.blocks_per_page())
            .field("capacity", &self.capacity())
            .field("allocated", &self.allocated)
            .finish()
    }
}
