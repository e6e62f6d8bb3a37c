use std::collections::{HashMap, HashSet};

use alchemy_discovery::{Finder, dilate, discover_from, discover_with, find_blocks};
use alchemy_grid::{BitGrid, Coord, Extent, PersistentTreeGrid};
use proptest::prelude::*;

fn small_coord() -> impl Strategy<Value = Coord> {
    (-12i32..12, -12i32..12, -3i32..3).prop_map(|(x, y, z)| Coord::new(x, y, z))
}

fn occupancy() -> impl Strategy<Value = BitGrid> {
    // Mix of single cells and boxes so full blocks show up.
    let cells = prop::collection::vec(small_coord(), 0..40);
    let boxes = prop::collection::vec((small_coord(), 1i32..6, 1i32..6, 1i32..4), 0..3);
    (cells, boxes).prop_map(|(cells, boxes)| {
        let mut g = BitGrid::new();
        for c in cells {
            g.set(c.x, c.y, c.z, true);
        }
        for (c, sx, sy, sz) in boxes {
            g.set_extent(Extent::new(c, c.offset(sx - 1, sy - 1, sz - 1)), true);
        }
        g
    })
}

fn value_grid() -> impl Strategy<Value = PersistentTreeGrid<u8>> {
    prop::collection::vec((small_coord(), 0u8..4), 0..60).prop_map(|cells| {
        let mut g = PersistentTreeGrid::new();
        for (c, v) in cells {
            g = g.set(c.x, c.y, c.z, Some(v));
        }
        g
    })
}

fn true_cells(g: &BitGrid) -> HashSet<Coord> {
    let mut out = HashSet::new();
    for (e, v) in find_blocks(g) {
        if v {
            out.extend(e.cells());
        }
    }
    out
}

fn probe_region() -> Extent {
    Extent::new(Coord::new(-16, -16, -5), Coord::new(20, 20, 6))
}

// Pure generator used by the sync tests; yields nothing for some cells.
fn element(c: Coord) -> Option<u8> {
    let h = c.x.wrapping_mul(73) ^ c.y.wrapping_mul(19) ^ c.z.wrapping_mul(7);
    let h = h.rem_euclid(5) as u8;
    (h != 4).then_some(h)
}

#[test]
fn single_cell_dilates_to_nine() {
    let mut g = BitGrid::new();
    g.set(0, 0, 0, true);
    let out = dilate(&g);
    let expect: HashSet<Coord> = Extent::new(Coord::new(-1, -1, 0), Coord::new(1, 1, 0))
        .cells()
        .collect();
    assert_eq!(true_cells(&out), expect);
}

proptest! {
    // Every set cell and its eight horizontal neighbours end up set, nothing else
    #[test]
    fn dilation_is_horizontal_3x3(g in occupancy()) {
        let src = true_cells(&g);
        let out = dilate(&g);
        for c in probe_region().cells() {
            let expect = (-1..=1).any(|dx| (-1..=1).any(|dy| src.contains(&c.offset(dx, dy, 0))));
            prop_assert_eq!(out.get(c.x, c.y, c.z), expect, "at {}", c);
        }
    }

    // Dilating again keeps growing a non-empty grid
    #[test]
    fn dilation_is_not_a_closure(g in occupancy()) {
        prop_assume!(!g.is_empty());
        let once = dilate(&g);
        let twice = dilate(&once);
        prop_assert!(twice.count() > once.count());
        prop_assert!(true_cells(&once).is_subset(&true_cells(&twice)));
    }

    // Occupied cells match the generator; everything else is as before
    #[test]
    fn generator_sync(g in occupancy(), before in value_grid()) {
        let after = discover_with(&g, &before, element);
        for c in probe_region().cells() {
            if g.get(c.x, c.y, c.z) {
                prop_assert_eq!(after.get(c.x, c.y, c.z).copied(), element(c));
            } else {
                prop_assert_eq!(after.get(c.x, c.y, c.z), before.get(c.x, c.y, c.z));
            }
        }
    }

    // Empty occupied cells take the source value; stored cells keep theirs
    #[test]
    fn copy_fill_first_write_wins(g in occupancy(), dest in value_grid(), src in value_grid()) {
        let after = discover_from(&g, &dest, &src);
        for c in probe_region().cells() {
            let prior = dest.get(c.x, c.y, c.z);
            let got = after.get(c.x, c.y, c.z);
            match prior {
                Some(p) => prop_assert_eq!(got, Some(p)),
                None if g.get(c.x, c.y, c.z) => prop_assert_eq!(got, src.get(c.x, c.y, c.z)),
                None => prop_assert_eq!(got, None),
            }
        }
    }

    // The finder sees exactly what a plain traversal closure sees
    #[test]
    fn finder_reports_every_block(g in occupancy()) {
        let mut direct: Vec<(Extent, bool)> = Vec::new();
        g.visit_blocks(&mut |e: Extent, v: bool| {
            direct.push((e, v));
            alchemy_grid::VisitStatus::Continue
        });
        let mut via_finder: HashMap<Extent, bool> = HashMap::new();
        g.visit_blocks(&mut Finder::new(|e: Extent, v: bool| {
            via_finder.insert(e, v);
        }));
        prop_assert_eq!(via_finder.len(), direct.len());
        for (e, v) in direct {
            prop_assert_eq!(via_finder.get(&e), Some(&v));
        }
    }
}
