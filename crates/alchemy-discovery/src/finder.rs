use alchemy_grid::{BitGrid, BlockVisitor, Extent, VisitStatus};

/// Forwards every visited block, set or not, to a callback. Never touches a
/// grid itself.
pub struct Finder<F> {
    callback: F,
}

impl<F: FnMut(Extent, bool)> Finder<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }

    pub fn into_inner(self) -> F {
        self.callback
    }
}

impl<F: FnMut(Extent, bool)> BlockVisitor<bool> for Finder<F> {
    #[inline]
    fn visit(&mut self, extent: Extent, value: bool) -> VisitStatus {
        (self.callback)(extent, value);
        VisitStatus::Continue
    }
}

/// Every block the traversal of `bits` yields, in traversal order.
pub fn find_blocks(bits: &BitGrid) -> Vec<(Extent, bool)> {
    let mut found = Vec::new();
    bits.visit_blocks(&mut Finder::new(|extent, value| found.push((extent, value))));
    found
}
