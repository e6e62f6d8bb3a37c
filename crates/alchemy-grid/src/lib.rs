//! Sparse voxel grids: a block-packed occupancy bit grid and a persistent
//! value octree, both traversable block-by-block through [`BlockVisitor`].
#![forbid(unsafe_code)]

pub mod bitgrid;
pub mod coord;
pub mod tree_grid;
pub mod visit;

pub use bitgrid::BitGrid;
pub use coord::{Coord, Extent, ExtentCells};
pub use tree_grid::PersistentTreeGrid;
pub use visit::{BlockVisitor, VisitStatus};
