use std::collections::HashSet;

use alchemy_grid::{BitGrid, Coord, Extent, VisitStatus};
use proptest::prelude::*;

fn small_coord() -> impl Strategy<Value = Coord> {
    (-20i32..20, -20i32..20, -6i32..6).prop_map(|(x, y, z)| Coord::new(x, y, z))
}

fn edits() -> impl Strategy<Value = Vec<(Coord, bool)>> {
    prop::collection::vec((small_coord(), any::<bool>()), 0..200)
}

fn build(edits: &[(Coord, bool)]) -> (BitGrid, HashSet<Coord>) {
    let mut grid = BitGrid::new();
    let mut model = HashSet::new();
    for &(c, v) in edits {
        grid.set(c.x, c.y, c.z, v);
        if v {
            model.insert(c);
        } else {
            model.remove(&c);
        }
    }
    (grid, model)
}

proptest! {
    // get/count agree with a plain set model
    #[test]
    fn matches_set_model(edits in edits(), probe in small_coord()) {
        let (grid, model) = build(&edits);
        prop_assert_eq!(grid.count(), model.len() as u64);
        prop_assert_eq!(grid.is_empty(), model.is_empty());
        prop_assert_eq!(grid.get(probe.x, probe.y, probe.z), model.contains(&probe));
        for c in &model {
            prop_assert!(grid.get(c.x, c.y, c.z));
        }
    }

    // Visited blocks tile stored space without overlap and carry uniform values
    #[test]
    fn visit_tiles_stored_blocks(edits in edits()) {
        let (grid, model) = build(&edits);
        let mut seen: HashSet<Coord> = HashSet::new();
        let mut trues: HashSet<Coord> = HashSet::new();
        grid.visit_blocks(&mut |e: Extent, v: bool| {
            for c in e.cells() {
                assert!(seen.insert(c), "cell {c} reported twice");
                assert_eq!(grid.get(c.x, c.y, c.z), v);
                if v {
                    trues.insert(c);
                }
            }
            VisitStatus::Continue
        });
        prop_assert_eq!(trues, model);
        prop_assert_eq!(seen.len(), grid.block_count() * 64);
    }

    // Bounds is the tight box around the set cells
    #[test]
    fn bounds_is_tight(edits in edits()) {
        let (grid, model) = build(&edits);
        match grid.bounds() {
            None => prop_assert!(model.is_empty()),
            Some(b) => {
                prop_assert!(model.iter().all(|c| b.contains(*c)));
                prop_assert!(model.iter().any(|c| c.x == b.min.x));
                prop_assert!(model.iter().any(|c| c.y == b.max.y));
                prop_assert!(model.iter().any(|c| c.z == b.min.z));
            }
        }
    }
}
