//! One-step horizontal dilation of an occupancy grid.

use alchemy_grid::{BitGrid, BlockVisitor, Extent, VisitStatus};

/// Marks the 3x3 horizontal neighbourhood (same z) of every set cell.
///
/// `result` starts as a copy of the source and only ever gains cells, so the
/// source stays a subset of the result.
pub struct BitGridExtender<'a> {
    source: &'a BitGrid,
    result: BitGrid,
}

impl<'a> BitGridExtender<'a> {
    pub fn new(source: &'a BitGrid) -> Self {
        Self {
            source,
            result: source.clone(),
        }
    }

    #[inline]
    pub fn source(&self) -> &'a BitGrid {
        self.source
    }

    #[inline]
    pub fn result(&self) -> &BitGrid {
        &self.result
    }

    pub fn into_result(self) -> BitGrid {
        self.result
    }

    /// Drives the extender over its own source and returns the grown grid.
    pub fn run(mut self) -> BitGrid {
        let source = self.source;
        source.visit_blocks(&mut self);
        log::debug!(
            "dilated {} -> {} cells",
            source.count(),
            self.result.count()
        );
        self.result
    }
}

impl BlockVisitor<bool> for BitGridExtender<'_> {
    fn visit(&mut self, extent: Extent, value: bool) -> VisitStatus {
        if !value {
            return VisitStatus::Continue;
        }
        // Blocks can span many cells; every one of them spreads.
        for c in extent.cells() {
            for dx in -1..=1 {
                for dy in -1..=1 {
                    self.result
                        .set(c.x.saturating_add(dx), c.y.saturating_add(dy), c.z, true);
                }
            }
        }
        VisitStatus::Continue
    }
}

pub fn dilate(bits: &BitGrid) -> BitGrid {
    BitGridExtender::new(bits).run()
}

/// Applies `steps` successive dilations.
pub fn dilate_n(bits: &BitGrid, steps: usize) -> BitGrid {
    let mut out = bits.clone();
    for _ in 0..steps {
        out = dilate(&out);
    }
    out
}
