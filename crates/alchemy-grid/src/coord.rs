use std::fmt;

/// Integer cell coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Coord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Shifted coordinate; clamps at the `i32` limits instead of overflowing.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }
}

impl From<(i32, i32, i32)> for Coord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<[i32; 3]> for Coord {
    fn from(value: [i32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<Coord> for (i32, i32, i32) {
    fn from(value: Coord) -> Self {
        (value.x, value.y, value.z)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Inclusive axis-aligned box of cells. A traversal reports each uniform
/// block as one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent {
    pub min: Coord,
    pub max: Coord,
}

impl Extent {
    /// Builds the box spanned by two opposite corners, in either order.
    pub fn new(a: Coord, b: Coord) -> Self {
        Self {
            min: Coord::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Coord::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    #[inline]
    pub const fn single(c: Coord) -> Self {
        Self { min: c, max: c }
    }

    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        c.x >= self.min.x
            && c.x <= self.max.x
            && c.y >= self.min.y
            && c.y <= self.max.y
            && c.z >= self.min.z
            && c.z <= self.max.z
    }

    /// Number of cells; saturates for boxes spanning most of the `i32` range.
    pub fn volume(&self) -> u64 {
        let sx = (i64::from(self.max.x) - i64::from(self.min.x) + 1) as u64;
        let sy = (i64::from(self.max.y) - i64::from(self.min.y) + 1) as u64;
        let sz = (i64::from(self.max.z) - i64::from(self.min.z) + 1) as u64;
        sx.saturating_mul(sy).saturating_mul(sz)
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min: Coord::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Coord::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Every cell in the box, x fastest, then y, then z.
    pub fn cells(&self) -> ExtentCells {
        ExtentCells {
            extent: *self,
            next: Some(self.min),
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

#[derive(Clone, Debug)]
pub struct ExtentCells {
    extent: Extent,
    next: Option<Coord>,
}

impl Iterator for ExtentCells {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        let cur = self.next?;
        let e = &self.extent;
        self.next = if cur.x < e.max.x {
            Some(Coord::new(cur.x + 1, cur.y, cur.z))
        } else if cur.y < e.max.y {
            Some(Coord::new(e.min.x, cur.y + 1, cur.z))
        } else if cur.z < e.max.z {
            Some(Coord::new(e.min.x, e.min.y, cur.z + 1))
        } else {
            None
        };
        Some(cur)
    }
}
