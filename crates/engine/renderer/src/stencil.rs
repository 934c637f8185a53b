//! Stencil buffer layout for nested portal regions
//!
//! The stencil word is split into one flag bit (the highest used bit) and a
//! value field below it. The value names the region a pixel belongs to; the
//! flag marks pixels claimed by a portal on the current level that has not
//! been committed yet.

use tracing::warn;

pub const DEFAULT_STENCIL_BITS: u8 = 8;
pub const MIN_STENCIL_BITS: u8 = 2;
pub const MAX_STENCIL_BITS: u8 = 16;

/// Hands out region ids and composes stencil words
pub trait MaskAllocator {
    /// A region id for a portal seen from inside region `parent`
    ///
    /// The id is never 0 (the root region) and differs from `parent`
    /// whenever the layout has more than one id.
    fn allocate_region(&mut self, parent: u32) -> u32;

    /// Stencil word for a region id, with or without the flag bit
    fn combine(&self, flag: bool, value: u32) -> u32;

    fn flag_mask(&self) -> u32;

    fn value_mask(&self) -> u32;

    /// Allocations that had to hand out an id already in use this frame
    fn reuses(&self) -> usize {
        0
    }
}

/// Allocator that counts up through the value field and wraps around
///
/// Ids are reused once the field is exhausted. Regions of earlier levels stay
/// in the stencil buffer wherever their children did not cover them, so a
/// reused id can let a chunk draw into the leftover pixels of an unrelated
/// region. Reuse is counted and warned about but not prevented.
#[derive(Debug, Clone)]
pub struct CyclingMaskAllocator {
    flag: u32,
    next: u32,
    issued: usize,
    reuses: usize,
}

impl CyclingMaskAllocator {
    /// Layout using the low `bits` bits of the stencil word, clamped to 2..=16
    pub fn new(bits: u8) -> Self {
        let bits = bits.clamp(MIN_STENCIL_BITS, MAX_STENCIL_BITS);
        Self {
            flag: 1 << (bits - 1),
            next: 1,
            issued: 0,
            reuses: 0,
        }
    }

    /// Number of distinct non-root region ids
    pub fn capacity(&self) -> u32 {
        self.value_mask()
    }

    fn advance(&mut self) -> u32 {
        let id = self.next;
        self.next = if id >= self.value_mask() { 1 } else { id + 1 };
        id
    }
}

impl Default for CyclingMaskAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_STENCIL_BITS)
    }
}

impl MaskAllocator for CyclingMaskAllocator {
    fn allocate_region(&mut self, parent: u32) -> u32 {
        let mut id = self.advance();
        if id == parent && self.capacity() > 1 {
            id = self.advance();
        }

        self.issued += 1;
        if self.issued > self.capacity() as usize {
            if self.reuses == 0 {
                warn!(
                    capacity = self.capacity(),
                    "Stencil region ids exhausted, reusing ids from earlier levels"
                );
            }
            self.reuses += 1;
        }
        id
    }

    fn combine(&self, flag: bool, value: u32) -> u32 {
        let value = value & self.value_mask();
        if flag {
            value | self.flag
        } else {
            value
        }
    }

    fn flag_mask(&self) -> u32 {
        self.flag
    }

    fn value_mask(&self) -> u32 {
        self.flag - 1
    }

    fn reuses(&self) -> usize {
        self.reuses
    }
}
