//! Persistent (structurally shared) sparse value grid.
//!
//! The grid is an octree of immutable `Arc` nodes. Every write builds a new
//! root by copying only the nodes on the path to the written cells; all other
//! subtrees are shared with the previous version, which stays valid and
//! unchanged. A node is either `Solid` (one value over its whole cube) or
//! `Split` into eight optional octants, where a missing octant is absent
//! data. Splits are re-merged on the way back up, so uniform regions stay a
//! single node.
//!
//! The root cube spans `[-2^(depth-1), 2^(depth-1))` on every axis and is
//! doubled around the origin whenever a write lands outside it.

use std::fmt;
use std::sync::Arc;

use crate::coord::{Coord, Extent};
use crate::visit::{BlockVisitor, VisitStatus};

const MIN_DEPTH: u32 = 4;
// Root edge 2^32 covers every i32.
const MAX_DEPTH: u32 = 32;

type Child<T> = Option<Arc<Node<T>>>;

enum Node<T> {
    Solid(T),
    Split([Child<T>; 8]),
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Solid(v) => f.debug_tuple("Solid").field(v).finish(),
            Node::Split(children) => f.debug_list().entries(children.iter()).finish(),
        }
    }
}

pub struct PersistentTreeGrid<T> {
    root: Child<T>,
    depth: u32,
}

impl<T> Clone for PersistentTreeGrid<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            depth: self.depth,
        }
    }
}

impl<T> Default for PersistentTreeGrid<T> {
    fn default() -> Self {
        Self {
            root: None,
            depth: MIN_DEPTH,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentTreeGrid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentTreeGrid")
            .field("depth", &self.depth)
            .field("root", &self.root)
            .finish()
    }
}

/// Octant index of a local coordinate at the given child level.
#[inline]
fn child_index(ux: u64, uy: u64, uz: u64, level: u32) -> usize {
    (((ux >> level) & 1) | (((uy >> level) & 1) << 1) | (((uz >> level) & 1) << 2)) as usize
}

#[inline]
fn octant_origin(o: [u64; 3], i: usize, child_level: u32) -> [u64; 3] {
    [
        o[0] + (((i & 1) as u64) << child_level),
        o[1] + ((((i >> 1) & 1) as u64) << child_level),
        o[2] + ((((i >> 2) & 1) as u64) << child_level),
    ]
}

impl<T> PersistentTreeGrid<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn half(&self) -> i64 {
        1i64 << (self.depth - 1)
    }

    #[inline]
    fn covers(&self, x: i32, y: i32, z: i32) -> bool {
        let h = self.half();
        [x, y, z].into_iter().all(|c| {
            let c = i64::from(c);
            c >= -h && c < h
        })
    }

    #[inline]
    fn local(&self, c: i32) -> u64 {
        (i64::from(c) + self.half()) as u64
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<&T> {
        if !self.covers(x, y, z) {
            return None;
        }
        let (ux, uy, uz) = (self.local(x), self.local(y), self.local(z));
        let mut node = self.root.as_deref()?;
        let mut level = self.depth;
        loop {
            match node {
                Node::Solid(v) => return Some(v),
                Node::Split(children) => {
                    level -= 1;
                    node = children[child_index(ux, uy, uz, level)].as_deref()?;
                }
            }
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        self.get(x, y, z).is_some()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// True when both handles share the same root, i.e. one was derived from
    /// the other without any effective write.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Number of cells holding a value.
    pub fn cell_count(&self) -> u128 {
        fn count<T>(node: &Node<T>, level: u32) -> u128 {
            match node {
                Node::Solid(_) => 1u128 << (3 * level),
                Node::Split(children) => children
                    .iter()
                    .flatten()
                    .map(|c| count(&**c, level - 1))
                    .sum(),
            }
        }
        self.root.as_deref().map_or(0, |n| count(n, self.depth))
    }

    /// Number of live tree nodes, shared or not.
    pub fn node_count(&self) -> usize {
        fn count<T>(node: &Node<T>) -> usize {
            match node {
                Node::Solid(_) => 1,
                Node::Split(children) => {
                    1 + children.iter().flatten().map(|c| count(&**c)).sum::<usize>()
                }
            }
        }
        self.root.as_deref().map_or(0, count)
    }

    /// Reports every uniform region once, with its extent and value. Absent
    /// space is not reported. Octants are walked in x, y, z bit order.
    pub fn visit_blocks<'a, V>(&'a self, visitor: &mut V) -> VisitStatus
    where
        V: BlockVisitor<&'a T> + ?Sized,
    {
        match self.root.as_deref() {
            None => VisitStatus::Continue,
            Some(root) => visit_node(root, self.depth, [0, 0, 0], self.half(), visitor),
        }
    }

    fn grown(&self) -> Self {
        debug_assert!(self.depth < MAX_DEPTH);
        let depth = self.depth + 1;
        let root = match self.root.as_deref() {
            None => None,
            // Solid nodes carry no size, so the old root can sit in every
            // inner corner unchanged.
            Some(Node::Solid(_)) => {
                let old = self.root.clone();
                let children: [Child<T>; 8] = std::array::from_fn(|i| {
                    let mut grand: [Child<T>; 8] = Default::default();
                    grand[i ^ 7] = old.clone();
                    Some(Arc::new(Node::Split(grand)))
                });
                Some(Arc::new(Node::Split(children)))
            }
            Some(Node::Split(old)) => {
                let children: [Child<T>; 8] = std::array::from_fn(|i| {
                    old[i].as_ref().map(|c| {
                        let mut grand: [Child<T>; 8] = Default::default();
                        grand[i ^ 7] = Some(c.clone());
                        Arc::new(Node::Split(grand))
                    })
                });
                Some(Arc::new(Node::Split(children)))
            }
        };
        Self { root, depth }
    }
}

impl<T: Clone + PartialEq> PersistentTreeGrid<T> {
    /// Returns a grid with `(x, y, z)` holding `value`; `None` erases.
    pub fn set(&self, x: i32, y: i32, z: i32, value: Option<T>) -> Self {
        self.set_extent(Extent::single(Coord::new(x, y, z)), value)
    }

    #[inline]
    pub fn remove(&self, x: i32, y: i32, z: i32) -> Self {
        self.set(x, y, z, None)
    }

    /// Returns a grid with every cell of `extent` holding `value`; `None`
    /// erases the region.
    pub fn set_extent(&self, extent: Extent, value: Option<T>) -> Self {
        let mut grid = self.clone();
        if value.is_some() {
            while !(grid.covers(extent.min.x, extent.min.y, extent.min.z)
                && grid.covers(extent.max.x, extent.max.y, extent.max.z))
            {
                grid = grid.grown();
            }
        }
        let h = grid.half();
        let clip = |lo: i32, hi: i32| -> Option<(u64, u64)> {
            let lo = i64::from(lo).max(-h);
            let hi = i64::from(hi).min(h - 1);
            (lo <= hi).then(|| ((lo + h) as u64, (hi + h) as u64))
        };
        let (Some(rx), Some(ry), Some(rz)) = (
            clip(extent.min.x, extent.max.x),
            clip(extent.min.y, extent.max.y),
            clip(extent.min.z, extent.max.z),
        ) else {
            return grid;
        };
        let region = Region {
            lo: [rx.0, ry.0, rz.0],
            hi: [rx.1, ry.1, rz.1],
        };
        grid.root = fill(grid.root.as_ref(), grid.depth, [0, 0, 0], &region, &value);
        grid
    }
}

/// Inclusive region in root-local unsigned coordinates.
struct Region {
    lo: [u64; 3],
    hi: [u64; 3],
}

impl Region {
    fn covers_cube(&self, o: [u64; 3], edge: u64) -> bool {
        (0..3).all(|a| self.lo[a] <= o[a] && o[a] + edge - 1 <= self.hi[a])
    }

    fn misses_cube(&self, o: [u64; 3], edge: u64) -> bool {
        (0..3).any(|a| self.hi[a] < o[a] || o[a] + edge - 1 < self.lo[a])
    }
}

fn fill<T: Clone + PartialEq>(
    node: Option<&Arc<Node<T>>>,
    level: u32,
    o: [u64; 3],
    region: &Region,
    value: &Option<T>,
) -> Child<T> {
    let edge = 1u64 << level;
    if region.misses_cube(o, edge) {
        return node.cloned();
    }
    if let (Some(Node::Solid(cur)), Some(v)) = (node.map(|n| &**n), value) {
        if cur == v {
            return node.cloned();
        }
    }
    if region.covers_cube(o, edge) {
        return value.clone().map(|v| Arc::new(Node::Solid(v)));
    }
    // Partial overlap; level > 0 because a unit cube is always covered or missed.
    let mut children: [Child<T>; 8] = match node.map(|n| &**n) {
        None if value.is_none() => return None,
        None => Default::default(),
        Some(Node::Solid(_)) => std::array::from_fn(|_| node.cloned()),
        Some(Node::Split(children)) => children.clone(),
    };
    let child_level = level - 1;
    let mut changed = false;
    for (i, child) in children.iter_mut().enumerate() {
        let co = octant_origin(o, i, child_level);
        let next = fill(child.as_ref(), child_level, co, region, value);
        changed |= !same_child(child, &next);
        *child = next;
    }
    if !changed {
        return node.cloned();
    }
    merge(children)
}

#[inline]
fn same_child<T>(a: &Child<T>, b: &Child<T>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

fn merge<T: PartialEq>(children: [Child<T>; 8]) -> Child<T> {
    if children.iter().all(Option::is_none) {
        return None;
    }
    if let Some(Node::Solid(first)) = children[0].as_deref() {
        let uniform = children[1..]
            .iter()
            .all(|c| matches!(c.as_deref(), Some(Node::Solid(v)) if v == first));
        if uniform {
            return children[0].clone();
        }
    }
    Some(Arc::new(Node::Split(children)))
}

fn visit_node<'a, T, V>(
    node: &'a Node<T>,
    level: u32,
    o: [u64; 3],
    half: i64,
    visitor: &mut V,
) -> VisitStatus
where
    V: BlockVisitor<&'a T> + ?Sized,
{
    match node {
        Node::Solid(v) => {
            let edge = (1i64 << level) - 1;
            let at = |a: usize| o[a] as i64 - half;
            let extent = Extent {
                min: Coord::new(at(0) as i32, at(1) as i32, at(2) as i32),
                max: Coord::new(
                    (at(0) + edge) as i32,
                    (at(1) + edge) as i32,
                    (at(2) + edge) as i32,
                ),
            };
            visitor.visit(extent, v)
        }
        Node::Split(children) => {
            let child_level = level - 1;
            for (i, child) in children.iter().enumerate() {
                let Some(child) = child.as_deref() else {
                    continue;
                };
                let co = octant_origin(o, i, child_level);
                if visit_node(child, child_level, co, half, visitor) == VisitStatus::ExitEarly {
                    return VisitStatus::ExitEarly;
                }
            }
            VisitStatus::Continue
        }
    }
}
