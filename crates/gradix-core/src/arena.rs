//! Two-phase arena for adapter working memory.
//!
//! Phase one declares typed regions on an [`ArenaLayout`] and reads off
//! the exact byte requirement. Phase two binds one contiguous backing
//! store — self-allocated or caller-supplied — and hands out typed
//! sub-slices. Nothing is allocated after binding.
//!
//! The backing store is a `Vec<u64>`, so every region boundary the arena
//! hands out is aligned to the 8-byte quantum and the typed views are
//! plain [`bytemuck`] casts. Int regions pack at the front of the buffer,
//! double regions follow at the next quantum boundary, mirroring the
//! order the size computation accounts them in. Placement past the
//! computed size is a hard invariant violation and panics.

use crate::error::{Error, Result};

/// Alignment quantum of the backing store, in bytes.
pub const QUANTUM: usize = std::mem::size_of::<u64>();

/// Handle to one declared region. Only valid for the layout it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegionKind {
    Int,
    Double,
}

#[derive(Debug, Clone, Copy)]
struct Region {
    kind: RegionKind,
    len: usize,
}

/// Phase one: a declared sequence of typed regions.
///
/// The layout is the single source of truth for both the size
/// computation and the later partitioning, so the two phases cannot see
/// different shape parameters.
#[derive(Debug, Clone, Default)]
pub struct ArenaLayout {
    regions: Vec<Region>,
}

impl ArenaLayout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a region of `len` `i32` values.
    pub fn int_region(&mut self, len: usize) -> RegionId {
        self.regions.push(Region { kind: RegionKind::Int, len });
        RegionId(self.regions.len() - 1)
    }

    /// Declare a region of `len` `f64` values.
    pub fn double_region(&mut self, len: usize) -> RegionId {
        self.regions.push(Region { kind: RegionKind::Double, len });
        RegionId(self.regions.len() - 1)
    }

    /// Exact byte requirement for this layout.
    ///
    /// Accounts every int region, the quantum boundary before the double
    /// block, every double region, plus one quantum of slack at the start
    /// and one before the double block for buffers handed in with
    /// arbitrary alignment. Deterministic for identical declarations.
    pub fn required_bytes(&self) -> usize {
        let ints: usize = self.int_len();
        let doubles: usize = self.double_len();
        let int_quanta = (ints * std::mem::size_of::<i32>()).div_ceil(QUANTUM);
        (int_quanta + doubles) * QUANTUM + 2 * QUANTUM
    }

    /// Backing-store length, in quanta, for [`required_bytes`].
    ///
    /// [`required_bytes`]: ArenaLayout::required_bytes
    pub fn required_quanta(&self) -> usize {
        self.required_bytes() / QUANTUM
    }

    fn int_len(&self) -> usize {
        self.regions
            .iter()
            .filter(|r| r.kind == RegionKind::Int)
            .map(|r| r.len)
            .sum()
    }

    fn double_len(&self) -> usize {
        self.regions
            .iter()
            .filter(|r| r.kind == RegionKind::Double)
            .map(|r| r.len)
            .sum()
    }
}

#[derive(Debug, Clone, Copy)]
struct PlacedRegion {
    kind: RegionKind,
    /// Offset in elements of the region's own type.
    start: usize,
    len: usize,
}

/// Phase two: one contiguous backing store partitioned per a layout.
#[derive(Debug)]
pub struct Arena {
    buf: Vec<u64>,
    placed: Vec<PlacedRegion>,
    used_bytes: usize,
}

impl Arena {
    /// Allocate a zeroed backing store of exactly the required size and
    /// partition it.
    pub fn allocate(layout: &ArenaLayout) -> Self {
        let buf = vec![0u64; layout.required_quanta()];
        Self::bind(layout, buf)
    }

    /// Partition a caller-supplied backing store.
    ///
    /// Fails if the buffer is smaller than the layout's requirement; a
    /// larger buffer is fine, the excess is simply never touched.
    pub fn from_buffer(layout: &ArenaLayout, buf: Vec<u64>) -> Result<Self> {
        let needed = layout.required_bytes();
        let got = buf.len() * QUANTUM;
        if got < needed {
            return Err(Error::BufferTooSmall { needed, got });
        }
        Ok(Self::bind(layout, buf))
    }

    /// Walk the buffer in the order sizing accounted for: int regions in
    /// declaration order, then double regions from the next quantum
    /// boundary. The trailing check against the computed size is the
    /// load-bearing guarantee of the whole scheme.
    fn bind(layout: &ArenaLayout, buf: Vec<u64>) -> Self {
        let mut placed = Vec::with_capacity(layout.regions.len());
        let mut int_cursor = 0usize;
        for region in &layout.regions {
            if region.kind == RegionKind::Int {
                placed.push(PlacedRegion {
                    kind: RegionKind::Int,
                    start: int_cursor,
                    len: region.len,
                });
                int_cursor += region.len;
            } else {
                // reserve the slot; start is filled in the double pass
                placed.push(PlacedRegion { kind: RegionKind::Double, start: 0, len: region.len });
            }
        }

        // align the double block to the quantum boundary
        let mut double_cursor = (int_cursor * std::mem::size_of::<i32>()).div_ceil(QUANTUM);
        for (region, slot) in layout.regions.iter().zip(placed.iter_mut()) {
            if region.kind == RegionKind::Double {
                slot.start = double_cursor;
                double_cursor += region.len;
            }
        }

        let used_bytes = double_cursor * QUANTUM;
        assert!(
            used_bytes <= layout.required_bytes(),
            "arena placement overran the computed size: {} > {} bytes",
            used_bytes,
            layout.required_bytes(),
        );
        Self { buf, placed, used_bytes }
    }

    /// Bytes actually consumed by placed regions.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Total bytes of the backing store.
    pub fn capacity_bytes(&self) -> usize {
        self.buf.len() * QUANTUM
    }

    /// Read access to an int region.
    pub fn ints(&self, id: RegionId) -> &[i32] {
        let r = self.int_bounds(id);
        &bytemuck::cast_slice(&self.buf)[r.start..r.start + r.len]
    }

    /// Write access to an int region.
    pub fn ints_mut(&mut self, id: RegionId) -> &mut [i32] {
        let r = self.int_bounds(id);
        &mut bytemuck::cast_slice_mut(&mut self.buf)[r.start..r.start + r.len]
    }

    /// Read access to a double region.
    pub fn doubles(&self, id: RegionId) -> &[f64] {
        let r = self.double_bounds(id);
        &bytemuck::cast_slice(&self.buf)[r.start..r.start + r.len]
    }

    /// Write access to a double region.
    pub fn doubles_mut(&mut self, id: RegionId) -> &mut [f64] {
        let r = self.double_bounds(id);
        &mut bytemuck::cast_slice_mut(&mut self.buf)[r.start..r.start + r.len]
    }

    /// Raw base pointer of an int region, for handing to native code.
    /// Dereferencing is the caller's contract; the pointer stays valid
    /// for the arena's lifetime.
    pub fn ints_ptr(&mut self, id: RegionId) -> *mut i32 {
        let r = self.int_bounds(id);
        (self.buf.as_mut_ptr() as *mut i32).wrapping_add(r.start)
    }

    /// Raw base pointer of a double region, for handing to native code.
    pub fn doubles_ptr(&mut self, id: RegionId) -> *mut f64 {
        let r = self.double_bounds(id);
        (self.buf.as_mut_ptr() as *mut f64).wrapping_add(r.start)
    }

    fn int_bounds(&self, id: RegionId) -> PlacedRegion {
        let r = self.placed[id.0];
        assert!(r.kind == RegionKind::Int, "region {:?} is not an int region", id);
        r
    }

    fn double_bounds(&self, id: RegionId) -> PlacedRegion {
        let r = self.placed[id.0];
        assert!(r.kind == RegionKind::Double, "region {:?} is not a double region", id);
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_bytes_deterministic() {
        let mut a = ArenaLayout::new();
        a.int_region(5);
        a.double_region(7);
        let mut b = ArenaLayout::new();
        b.int_region(5);
        b.double_region(7);
        assert_eq!(a.required_bytes(), b.required_bytes());
        assert_eq!(a.required_bytes() % QUANTUM, 0);
    }

    #[test]
    fn test_layout_accounting() {
        let mut layout = ArenaLayout::new();
        layout.int_region(3); // 12 bytes -> 2 quanta
        layout.double_region(4); // 4 quanta
        // 2 + 4 quanta of regions, 2 quanta of alignment slack
        assert_eq!(layout.required_bytes(), 8 * QUANTUM);
    }

    #[test]
    fn test_regions_are_disjoint_and_typed() {
        let mut layout = ArenaLayout::new();
        let a = layout.int_region(3);
        let b = layout.int_region(2);
        let c = layout.double_region(4);
        let d = layout.double_region(1);

        let mut arena = Arena::allocate(&layout);
        arena.ints_mut(a).copy_from_slice(&[1, 2, 3]);
        arena.ints_mut(b).copy_from_slice(&[4, 5]);
        arena.doubles_mut(c).copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        arena.doubles_mut(d).copy_from_slice(&[9.0]);

        assert_eq!(arena.ints(a), &[1, 2, 3]);
        assert_eq!(arena.ints(b), &[4, 5]);
        assert_eq!(arena.doubles(c), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(arena.doubles(d), &[9.0]);
    }

    #[test]
    fn test_allocate_is_zeroed() {
        let mut layout = ArenaLayout::new();
        let ints = layout.int_region(4);
        let doubles = layout.double_region(4);
        let arena = Arena::allocate(&layout);
        assert_eq!(arena.ints(ints), &[0; 4]);
        assert_eq!(arena.doubles(doubles), &[0.0; 4]);
    }

    #[test]
    fn test_from_buffer_rejects_undersized() {
        let mut layout = ArenaLayout::new();
        layout.double_region(16);
        let err = Arena::from_buffer(&layout, vec![0u64; 4]).unwrap_err();
        match err {
            crate::Error::BufferTooSmall { needed, got } => {
                assert_eq!(needed, layout.required_bytes());
                assert_eq!(got, 4 * QUANTUM);
            }
        }
    }

    #[test]
    fn test_from_buffer_accepts_oversized() {
        let mut layout = ArenaLayout::new();
        let d = layout.double_region(2);
        let quanta = layout.required_quanta();
        let mut arena = Arena::from_buffer(&layout, vec![0u64; quanta + 10]).unwrap();
        arena.doubles_mut(d).fill(1.0);
        assert_eq!(arena.doubles(d), &[1.0, 1.0]);
        assert!(arena.used_bytes() <= arena.capacity_bytes());
    }

    #[test]
    fn test_zero_length_regions() {
        let mut layout = ArenaLayout::new();
        let i = layout.int_region(0);
        let d = layout.double_region(0);
        let arena = Arena::allocate(&layout);
        assert!(arena.ints(i).is_empty());
        assert!(arena.doubles(d).is_empty());
    }

    #[test]
    #[should_panic(expected = "not an int region")]
    fn test_kind_mismatch_panics() {
        let mut layout = ArenaLayout::new();
        let d = layout.double_region(2);
        let arena = Arena::allocate(&layout);
        let _ = arena.ints(d);
    }

    #[test]
    fn test_raw_pointers_match_slices() {
        let mut layout = ArenaLayout::new();
        let i = layout.int_region(2);
        let d = layout.double_region(3);
        let mut arena = Arena::allocate(&layout);
        arena.ints_mut(i)[1] = 42;
        arena.doubles_mut(d)[2] = 2.5;

        let ip = arena.ints_ptr(i);
        let dp = arena.doubles_ptr(d);
        unsafe {
            assert_eq!(*ip.add(1), 42);
            assert_eq!(*dp.add(2), 2.5);
        }
    }
}
