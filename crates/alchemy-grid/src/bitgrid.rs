//! Sparse boolean occupancy grid.
//!
//! Cells are packed into 4x4x4 blocks, one `u64` per block, and only blocks
//! with at least one set bit are stored. Bit layout inside a block is
//! `z << 4 | y << 2 | x` on the local coordinates.

use hashbrown::HashMap;

use crate::coord::{Coord, Extent};
use crate::visit::{BlockVisitor, VisitStatus};

pub const BLOCK_SHIFT: i32 = 2;
pub const BLOCK_EDGE: i32 = 1 << BLOCK_SHIFT;
const LOCAL_MASK: i32 = BLOCK_EDGE - 1;
const ROW_MASK: u64 = (1 << BLOCK_EDGE) - 1;
const FULL_BLOCK: u64 = u64::MAX;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitGrid {
    // Invariant: no stored mask is zero.
    blocks: HashMap<Coord, u64>,
}

#[inline]
fn block_key(x: i32, y: i32, z: i32) -> Coord {
    Coord::new(x >> BLOCK_SHIFT, y >> BLOCK_SHIFT, z >> BLOCK_SHIFT)
}

#[inline]
fn bit_index(x: i32, y: i32, z: i32) -> u32 {
    (((z & LOCAL_MASK) << (2 * BLOCK_SHIFT)) | ((y & LOCAL_MASK) << BLOCK_SHIFT) | (x & LOCAL_MASK))
        as u32
}

#[inline]
fn block_origin(key: Coord) -> Coord {
    Coord::new(
        key.x << BLOCK_SHIFT,
        key.y << BLOCK_SHIFT,
        key.z << BLOCK_SHIFT,
    )
}

impl BitGrid {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> bool {
        self.blocks
            .get(&block_key(x, y, z))
            .is_some_and(|mask| mask & (1u64 << bit_index(x, y, z)) != 0)
    }

    pub fn set(&mut self, x: i32, y: i32, z: i32, value: bool) {
        let key = block_key(x, y, z);
        let bit = 1u64 << bit_index(x, y, z);
        if value {
            *self.blocks.entry(key).or_insert(0) |= bit;
        } else if let Some(mask) = self.blocks.get_mut(&key) {
            *mask &= !bit;
            if *mask == 0 {
                self.blocks.remove(&key);
            }
        }
    }

    pub fn set_extent(&mut self, extent: Extent, value: bool) {
        for c in extent.cells() {
            self.set(c.x, c.y, c.z, value);
        }
    }

    /// Number of set cells.
    pub fn count(&self) -> u64 {
        self.blocks.values().map(|m| u64::from(m.count_ones())).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of stored 4x4x4 blocks.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Tight bounding box of the set cells.
    pub fn bounds(&self) -> Option<Extent> {
        let mut out: Option<Extent> = None;
        for (&key, &mask) in &self.blocks {
            let base = block_origin(key);
            let mut rest = mask;
            while rest != 0 {
                let i = rest.trailing_zeros() as i32;
                rest &= rest - 1;
                let c = base.offset(
                    i & LOCAL_MASK,
                    (i >> BLOCK_SHIFT) & LOCAL_MASK,
                    i >> (2 * BLOCK_SHIFT),
                );
                let cell = Extent::single(c);
                out = Some(match out {
                    Some(e) => e.union(&cell),
                    None => cell,
                });
            }
        }
        out
    }

    /// Walks every stored block in ascending (z, y, x) block order.
    ///
    /// A full block is reported once as a 4x4x4 extent. Any other block is
    /// reported as runs of equal bits along each of its x rows, so unset
    /// cells inside stored blocks are reported with `false`. Space outside
    /// stored blocks is never reported.
    pub fn visit_blocks<V>(&self, visitor: &mut V) -> VisitStatus
    where
        V: BlockVisitor<bool> + ?Sized,
    {
        let mut keys: Vec<Coord> = self.blocks.keys().copied().collect();
        keys.sort_unstable_by_key(|k| (k.z, k.y, k.x));
        for key in keys {
            let mask = self.blocks[&key];
            if visit_block(key, mask, visitor) == VisitStatus::ExitEarly {
                return VisitStatus::ExitEarly;
            }
        }
        VisitStatus::Continue
    }
}

fn visit_block<V>(key: Coord, mask: u64, visitor: &mut V) -> VisitStatus
where
    V: BlockVisitor<bool> + ?Sized,
{
    let base = block_origin(key);
    if mask == FULL_BLOCK {
        let extent = Extent::new(base, base.offset(LOCAL_MASK, LOCAL_MASK, LOCAL_MASK));
        return visitor.visit(extent, true);
    }
    for lz in 0..BLOCK_EDGE {
        for ly in 0..BLOCK_EDGE {
            let row = (mask >> ((lz << (2 * BLOCK_SHIFT)) | (ly << BLOCK_SHIFT))) & ROW_MASK;
            let mut start = 0;
            while start < BLOCK_EDGE {
                let value = (row >> start) & 1 != 0;
                let mut end = start;
                while end + 1 < BLOCK_EDGE && ((row >> (end + 1)) & 1 != 0) == value {
                    end += 1;
                }
                let extent = Extent::new(base.offset(start, ly, lz), base.offset(end, ly, lz));
                if visitor.visit(extent, value) == VisitStatus::ExitEarly {
                    return VisitStatus::ExitEarly;
                }
                start = end + 1;
            }
        }
    }
    VisitStatus::Continue
}
