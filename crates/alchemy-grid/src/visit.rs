use crate::coord::Extent;

/// What a visitor wants the traversal to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisitStatus {
    Continue,
    ExitEarly,
}

/// Callback driven by a grid traversal, once per uniform-value block.
///
/// The traversal order is a property of the grid being walked; visitors must
/// not depend on it. Any `FnMut(Extent, V) -> VisitStatus` closure is a
/// visitor as well.
pub trait BlockVisitor<V> {
    fn visit(&mut self, extent: Extent, value: V) -> VisitStatus;
}

impl<V, F> BlockVisitor<V> for F
where
    F: FnMut(Extent, V) -> VisitStatus,
{
    #[inline]
    fn visit(&mut self, extent: Extent, value: V) -> VisitStatus {
        self(extent, value)
    }
}
