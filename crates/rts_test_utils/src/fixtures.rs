//! Test fixtures and helpers.
//!
//! Pre-built maps and request scenarios for consistent testing and
//! benchmarking.

use rts_pathfinding::grid::{CellType, GridPos, NavGrid};
use rts_pathfinding::mobility::{MoverClass, TerrainCosts, TerrainMobility};

/// Mover class used for ground units in fixtures.
pub const GROUND: MoverClass = MoverClass(0);

/// Mover class used for amphibious units in fixtures.
pub const AMPHIBIOUS: MoverClass = MoverClass(1);

/// Shorthand for [`GridPos::new`].
#[must_use]
pub const fn pos(x: i32, y: i32) -> GridPos {
    GridPos::new(x, y)
}

/// Ground mobility over a grid.
#[must_use]
pub fn ground(grid: &NavGrid) -> TerrainMobility<'_> {
    TerrainMobility::new(grid, GROUND)
}

/// Amphibious mobility over a grid (water is passable).
#[must_use]
pub fn amphibious(grid: &NavGrid) -> TerrainMobility<'_> {
    TerrainMobility::new(grid, AMPHIBIOUS).with_costs(TerrainCosts::amphibious())
}

/// A map plus one path request on it.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Short name for reports.
    pub name: &'static str,
    /// The map.
    pub grid: NavGrid,
    /// Request source.
    pub from: GridPos,
    /// Request destination.
    pub to: GridPos,
}

impl Scenario {
    /// 128x128 map without obstacles, (1,1) to (125,75).
    #[must_use]
    pub fn open_field() -> Self {
        Self {
            name: "open_field",
            grid: NavGrid::new(128, 128),
            from: pos(1, 1),
            to: pos(125, 75),
        }
    }

    /// 128x128 map with a wall at x=50 for y<100 and one at x=100 for y>50.
    ///
    /// The route from (1,1) to (125,75) has to pass below the first wall and
    /// above the second.
    #[must_use]
    pub fn two_walls() -> Self {
        let mut grid = NavGrid::new(128, 128);
        grid.fill_rect(pos(50, 0), pos(50, 99), CellType::Blocked);
        grid.fill_rect(pos(100, 51), pos(100, 127), CellType::Blocked);
        Self {
            name: "two_walls",
            grid,
            from: pos(1, 1),
            to: pos(125, 75),
        }
    }

    /// 64x64 map split in two by a full-height wall.
    #[must_use]
    pub fn walled_off() -> Self {
        let mut grid = NavGrid::new(64, 64);
        grid.fill_rect(pos(32, 0), pos(32, 63), CellType::Blocked);
        Self {
            name: "walled_off",
            grid,
            from: pos(4, 30),
            to: pos(60, 30),
        }
    }

    /// 128x128 map with seeded random obstacles, corner to corner.
    #[must_use]
    pub fn scattered(seed: u64) -> Self {
        let mut grid = random_obstacle_grid(128, 128, seed, 250);
        grid.set_cell(pos(0, 0), CellType::Walkable);
        grid.set_cell(pos(127, 127), CellType::Walkable);
        Self {
            name: "scattered",
            grid,
            from: pos(0, 0),
            to: pos(127, 127),
        }
    }

    /// Ground mobility over this scenario's map.
    #[must_use]
    pub fn ground(&self) -> TerrainMobility<'_> {
        ground(&self.grid)
    }
}

/// Simple deterministic RNG for map generation.
#[derive(Debug, Clone)]
pub struct MapRng {
    state: u64,
}

impl MapRng {
    /// Seed a generator.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    /// Next raw value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state >> 16
    }

    /// Uniform-ish value in `0..bound` (`0` if `bound` is zero).
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        u32::try_from(self.next_u64() % u64::from(bound)).unwrap_or(0)
    }
}

/// Grid where each cell is blocked with probability `blocked_permille`/1000
/// and slow with a quarter of that.
#[must_use]
pub fn random_obstacle_grid(width: u32, height: u32, seed: u64, blocked_permille: u32) -> NavGrid {
    let mut rng = MapRng::new(seed);
    let mut grid = NavGrid::new(width, height);
    for cell in grid.bounds().cells() {
        let roll = rng.below(1000);
        if roll < blocked_permille {
            grid.set_cell(cell, CellType::Blocked);
        } else if roll < blocked_permille + blocked_permille / 4 {
            grid.set_cell(cell, CellType::SlowTerrain);
        }
    }
    grid
}

/// Build a grid from rows of characters.
///
/// `.` walkable, `#` blocked, `~` water, `s` slow terrain. Rows run top to
/// bottom (`y = 0` first).
///
/// # Panics
///
/// Panics on ragged rows or unknown characters.
#[must_use]
pub fn grid_from_ascii(rows: &[&str]) -> NavGrid {
    let height = u32::try_from(rows.len()).expect("too many rows");
    let width = rows.first().map_or(0, |row| row.len());
    let mut grid = NavGrid::new(u32::try_from(width).expect("row too long"), height);
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), width, "ragged row {y}");
        for (x, ch) in row.chars().enumerate() {
            let cell = match ch {
                '.' => CellType::Walkable,
                '#' => CellType::Blocked,
                '~' => CellType::Water,
                's' => CellType::SlowTerrain,
                other => panic!("unknown map character {other:?}"),
            };
            let x = i32::try_from(x).expect("row too long");
            let y = i32::try_from(y).expect("too many rows");
            grid.set_cell(pos(x, y), cell);
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_walls_layout() {
        let scenario = Scenario::two_walls();
        assert!(!scenario.grid.is_walkable(pos(50, 0)));
        assert!(!scenario.grid.is_walkable(pos(50, 99)));
        assert!(scenario.grid.is_walkable(pos(50, 100)));
        assert!(scenario.grid.is_walkable(pos(100, 50)));
        assert!(!scenario.grid.is_walkable(pos(100, 51)));
    }

    #[test]
    fn test_random_grid_is_seeded() {
        let a = random_obstacle_grid(32, 32, 7, 300);
        let b = random_obstacle_grid(32, 32, 7, 300);
        let c = random_obstacle_grid(32, 32, 8, 300);
        let cells: Vec<_> = a.bounds().cells().collect();
        assert!(cells.iter().all(|&p| a.get_cell(p) == b.get_cell(p)));
        assert!(cells.iter().any(|&p| a.get_cell(p) != c.get_cell(p)));
        let blocked = cells.iter().filter(|&&p| !a.is_walkable(p)).count();
        assert!(blocked > 100 && blocked < 500, "{blocked}");
    }

    #[test]
    fn test_grid_from_ascii() {
        let grid = grid_from_ascii(&["..#", "~s."]);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get_cell(pos(2, 0)), Some(CellType::Blocked));
        assert_eq!(grid.get_cell(pos(0, 1)), Some(CellType::Water));
        assert_eq!(grid.get_cell(pos(1, 1)), Some(CellType::SlowTerrain));
    }
}
