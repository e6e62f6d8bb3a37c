//! Keeping per-cell value grids in step with occupancy.
//!
//! Two policies, deliberately different:
//! - [`DiscoveryExtender`] syncs every occupied cell with a generator and
//!   overwrites whenever the stored value differs (including erasing when
//!   the generator yields nothing).
//! - [`CopyDiscoveryExtender`] fills occupied cells from a source grid only
//!   where nothing is stored yet; the first value written wins.
//!
//! Both hold a [`PersistentTreeGrid`] handle and replace it on each write, so
//! handles the caller kept from before the traversal never change.

use alchemy_grid::{BitGrid, BlockVisitor, Coord, Extent, PersistentTreeGrid, VisitStatus};

pub struct DiscoveryExtender<'a, T, F> {
    bits: &'a BitGrid,
    grid: PersistentTreeGrid<T>,
    generator: F,
    writes: usize,
}

impl<'a, T, F> DiscoveryExtender<'a, T, F>
where
    T: Clone + PartialEq,
    F: FnMut(Coord) -> Option<T>,
{
    pub fn new(bits: &'a BitGrid, grid: PersistentTreeGrid<T>, generator: F) -> Self {
        Self {
            bits,
            grid,
            generator,
            writes: 0,
        }
    }

    /// Latest handle; reflects every write made so far.
    #[inline]
    pub fn grid(&self) -> &PersistentTreeGrid<T> {
        &self.grid
    }

    pub fn into_grid(self) -> PersistentTreeGrid<T> {
        self.grid
    }

    /// Cells rewritten so far.
    #[inline]
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn run(mut self) -> PersistentTreeGrid<T> {
        let bits = self.bits;
        bits.visit_blocks(&mut self);
        log::debug!("discovery synced {} cell(s)", self.writes);
        self.grid
    }
}

impl<T, F> BlockVisitor<bool> for DiscoveryExtender<'_, T, F>
where
    T: Clone + PartialEq,
    F: FnMut(Coord) -> Option<T>,
{
    fn visit(&mut self, extent: Extent, value: bool) -> VisitStatus {
        if !value {
            return VisitStatus::Continue;
        }
        for c in extent.cells() {
            let fresh = (self.generator)(c);
            if self.grid.get(c.x, c.y, c.z) != fresh.as_ref() {
                self.grid = self.grid.set(c.x, c.y, c.z, fresh);
                self.writes += 1;
            }
        }
        VisitStatus::Continue
    }
}

pub struct CopyDiscoveryExtender<'a, T> {
    bits: &'a BitGrid,
    grid: PersistentTreeGrid<T>,
    source: &'a PersistentTreeGrid<T>,
    writes: usize,
}

impl<'a, T: Clone + PartialEq> CopyDiscoveryExtender<'a, T> {
    pub fn new(
        bits: &'a BitGrid,
        grid: PersistentTreeGrid<T>,
        source: &'a PersistentTreeGrid<T>,
    ) -> Self {
        Self {
            bits,
            grid,
            source,
            writes: 0,
        }
    }

    #[inline]
    pub fn grid(&self) -> &PersistentTreeGrid<T> {
        &self.grid
    }

    pub fn into_grid(self) -> PersistentTreeGrid<T> {
        self.grid
    }

    /// Cells filled so far.
    #[inline]
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn run(mut self) -> PersistentTreeGrid<T> {
        let bits = self.bits;
        bits.visit_blocks(&mut self);
        log::debug!("discovery copied {} cell(s)", self.writes);
        self.grid
    }
}

impl<T: Clone + PartialEq> BlockVisitor<bool> for CopyDiscoveryExtender<'_, T> {
    fn visit(&mut self, extent: Extent, value: bool) -> VisitStatus {
        if !value {
            return VisitStatus::Continue;
        }
        for c in extent.cells() {
            if self.grid.contains(c.x, c.y, c.z) {
                continue;
            }
            if let Some(v) = self.source.get(c.x, c.y, c.z) {
                self.grid = self.grid.set(c.x, c.y, c.z, Some(v.clone()));
                self.writes += 1;
            }
        }
        VisitStatus::Continue
    }
}

/// Syncs `grid` with `generator` over the occupied cells of `bits`.
pub fn discover_with<T, F>(
    bits: &BitGrid,
    grid: &PersistentTreeGrid<T>,
    generator: F,
) -> PersistentTreeGrid<T>
where
    T: Clone + PartialEq,
    F: FnMut(Coord) -> Option<T>,
{
    DiscoveryExtender::new(bits, grid.clone(), generator).run()
}

/// Fills unset occupied cells of `dest` from `source`.
pub fn discover_from<T: Clone + PartialEq>(
    bits: &BitGrid,
    dest: &PersistentTreeGrid<T>,
    source: &PersistentTreeGrid<T>,
) -> PersistentTreeGrid<T> {
    CopyDiscoveryExtender::new(bits, dest.clone(), source).run()
}
