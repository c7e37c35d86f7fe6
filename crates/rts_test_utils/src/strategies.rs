//! Proptest strategies for pathfinding tests.
//!
//! These strategies generate random but reproducible maps and requests for
//! property-based testing.

use proptest::prelude::*;
use rts_pathfinding::grid::{CellType, GridPos, NavGrid};

/// Generate a cell type, mostly walkable.
pub fn arb_cell_type() -> impl Strategy<Value = CellType> {
    prop_oneof![
        6 => Just(CellType::Walkable),
        2 => Just(CellType::Blocked),
        1 => Just(CellType::SlowTerrain),
        1 => Just(CellType::Water),
    ]
}

/// Generate a map between 2x2 and `max_side` x `max_side`.
pub fn arb_grid(max_side: u32) -> impl Strategy<Value = NavGrid> {
    (2..=max_side.max(2), 2..=max_side.max(2)).prop_flat_map(|(width, height)| {
        let cells = (width * height) as usize;
        proptest::collection::vec(arb_cell_type(), cells).prop_map(move |types| {
            let mut grid = NavGrid::new(width, height);
            for (cell, cell_type) in grid.bounds().cells().zip(types) {
                grid.set_cell(cell, cell_type);
            }
            grid
        })
    })
}

/// Generate a position inside a `width` x `height` map.
pub fn arb_pos_in(width: u32, height: u32) -> impl Strategy<Value = GridPos> {
    let w = i32::try_from(width.max(1)).unwrap_or(i32::MAX);
    let h = i32::try_from(height.max(1)).unwrap_or(i32::MAX);
    (0..w, 0..h).prop_map(|(x, y)| GridPos::new(x, y))
}

/// Generate a position that may fall up to two cells outside the map.
pub fn arb_pos_near(width: u32, height: u32) -> impl Strategy<Value = GridPos> {
    let w = i32::try_from(width).unwrap_or(i32::MAX);
    let h = i32::try_from(height).unwrap_or(i32::MAX);
    (-2..w + 2, -2..h + 2).prop_map(|(x, y)| GridPos::new(x, y))
}

/// Generate a map with a source and destination inside it.
pub fn arb_request(max_side: u32) -> impl Strategy<Value = (NavGrid, GridPos, GridPos)> {
    arb_grid(max_side).prop_flat_map(|grid| {
        let (w, h) = (grid.width(), grid.height());
        (Just(grid), arb_pos_in(w, h), arb_pos_in(w, h))
    })
}

/// Generate an arbitrary pair of positions for heuristic and ray tests.
pub fn arb_pos_pair(extent: i32) -> impl Strategy<Value = (GridPos, GridPos)> {
    let coord = -extent..=extent;
    (coord.clone(), coord.clone(), coord.clone(), coord)
        .prop_map(|(ax, ay, bx, by)| (GridPos::new(ax, ay), GridPos::new(bx, by)))
}
