//! Grid positions, bounds, and the navigation grid.
//!
//! [`NavGrid`] is the minimal terrain model the engine ships with: a
//! row-major array of [`CellType`] values. Richer terrain models plug in
//! through the [`Mobility`](crate::mobility::Mobility) trait instead.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Integer movement cost.
pub type Cost = u32;

/// Movement cost of one orthogonal step over normal terrain.
pub const BASE_CELL_COST: Cost = 100;

/// Integer cell coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPos {
    /// Create a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this position by a direction.
    #[must_use]
    pub const fn step(self, dir: Direction) -> Self {
        Self::new(self.x + dir.dx, self.y + dir.dy)
    }

    /// Chebyshev distance (number of king moves) to another position.
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// True if `other` is one of the 8 cells surrounding this one.
    #[must_use]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.chebyshev_distance(other) == 1
    }
}

impl Ord for GridPos {
    /// Row-major order: lower `y` first, then lower `x`.
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for GridPos {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// One of the 8 octile step directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    /// Column delta.
    pub dx: i32,
    /// Row delta.
    pub dy: i32,
}

impl Direction {
    /// East.
    pub const EAST: Self = Self { dx: 1, dy: 0 };
    /// Southeast.
    pub const SOUTH_EAST: Self = Self { dx: 1, dy: 1 };
    /// South.
    pub const SOUTH: Self = Self { dx: 0, dy: 1 };
    /// Southwest.
    pub const SOUTH_WEST: Self = Self { dx: -1, dy: 1 };
    /// West.
    pub const WEST: Self = Self { dx: -1, dy: 0 };
    /// Northwest.
    pub const NORTH_WEST: Self = Self { dx: -1, dy: -1 };
    /// North.
    pub const NORTH: Self = Self { dx: 0, dy: -1 };
    /// Northeast.
    pub const NORTH_EAST: Self = Self { dx: 1, dy: -1 };

    /// All directions in expansion order.
    ///
    /// The order is part of the determinism contract: neighbors are always
    /// produced in this sequence.
    pub const ALL: [Self; 8] = [
        Self::EAST,
        Self::SOUTH_EAST,
        Self::SOUTH,
        Self::SOUTH_WEST,
        Self::WEST,
        Self::NORTH_WEST,
        Self::NORTH,
        Self::NORTH_EAST,
    ];

    /// True for the four diagonal directions.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        self.dx != 0 && self.dy != 0
    }

    /// The opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}

/// Rectangular map bounds.
///
/// A bounds value with a zero dimension is a degenerate map that contains
/// no cells at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridBounds {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl GridBounds {
    /// Create new bounds.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of cells covered.
    #[must_use]
    pub const fn cell_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Check if a position lies within the bounds.
    #[must_use]
    pub fn contains(self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Row-major index of a position, or `None` when out of bounds.
    #[inline]
    #[must_use]
    pub fn index_of(self, pos: GridPos) -> Option<usize> {
        if self.contains(pos) {
            Some((pos.y as usize) * (self.width as usize) + (pos.x as usize))
        } else {
            None
        }
    }

    /// Enumerate every cell in row-major order.
    pub fn cells(self) -> impl Iterator<Item = GridPos> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| GridPos::new(x, y)))
    }
}

/// Cell types for the navigation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellType {
    /// Normal walkable terrain.
    #[default]
    Walkable,
    /// Impassable terrain.
    Blocked,
    /// Slow terrain with 2x movement cost.
    SlowTerrain,
    /// Open water. Only passable for movers that can swim or fly.
    Water,
}

impl CellType {
    /// Returns the ground movement cost for this cell type.
    /// Returns `None` for cells ground units cannot enter.
    #[must_use]
    pub const fn movement_cost(self) -> Option<Cost> {
        match self {
            Self::Walkable => Some(BASE_CELL_COST),
            Self::Blocked | Self::Water => None,
            Self::SlowTerrain => Some(2 * BASE_CELL_COST),
        }
    }

    /// Returns true if ground units can walk on this cell.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        self.movement_cost().is_some()
    }
}

/// Navigation grid: the terrain layer consulted by the default mobility rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavGrid {
    bounds: GridBounds,
    /// Cell data stored in row-major order.
    cells: Vec<CellType>,
}

impl NavGrid {
    /// Create a new navigation grid with all cells walkable.
    ///
    /// Zero dimensions are allowed and produce an empty map.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let bounds = GridBounds::new(width, height);
        Self {
            bounds,
            cells: vec![CellType::Walkable; bounds.cell_count()],
        }
    }

    /// Grid bounds.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.bounds.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.bounds.height
    }

    /// Check if a position is within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        self.bounds.contains(pos)
    }

    /// Get cell type at a position.
    /// Returns `None` if out of bounds.
    #[must_use]
    pub fn get_cell(&self, pos: GridPos) -> Option<CellType> {
        self.bounds.index_of(pos).map(|i| self.cells[i])
    }

    /// Set cell type at a position.
    /// Returns `false` if out of bounds.
    pub fn set_cell(&mut self, pos: GridPos, cell_type: CellType) -> bool {
        match self.bounds.index_of(pos) {
            Some(index) => {
                self.cells[index] = cell_type;
                true
            }
            None => false,
        }
    }

    /// Fill an inclusive rectangle with one cell type, clipped to the grid.
    pub fn fill_rect(&mut self, min: GridPos, max: GridPos, cell_type: CellType) {
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                self.set_cell(GridPos::new(x, y), cell_type);
            }
        }
    }

    /// Check if a cell is walkable for ground units.
    #[must_use]
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.get_cell(pos).is_some_and(CellType::is_walkable)
    }

    /// Ground movement cost for a cell.
    /// Returns `None` for blocked or out-of-bounds cells.
    #[must_use]
    pub fn movement_cost(&self, pos: GridPos) -> Option<Cost> {
        self.get_cell(pos).and_then(CellType::movement_cost)
    }
}

impl Default for NavGrid {
    /// Create a default NavGrid (64x64 cells).
    fn default() -> Self {
        Self::new(64, 64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_type_costs() {
        assert_eq!(CellType::Walkable.movement_cost(), Some(100));
        assert_eq!(CellType::Blocked.movement_cost(), None);
        assert_eq!(CellType::SlowTerrain.movement_cost(), Some(200));
        assert_eq!(CellType::Water.movement_cost(), None);
    }

    #[test]
    fn test_navgrid_creation() {
        let grid = NavGrid::new(10, 12);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 12);
        assert_eq!(grid.bounds().cell_count(), 120);
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = GridBounds::new(4, 3);
        assert!(bounds.contains(GridPos::new(0, 0)));
        assert!(bounds.contains(GridPos::new(3, 2)));
        assert!(!bounds.contains(GridPos::new(4, 0)));
        assert!(!bounds.contains(GridPos::new(0, 3)));
        assert!(!bounds.contains(GridPos::new(-1, 0)));
        assert_eq!(bounds.index_of(GridPos::new(1, 2)), Some(9));
    }

    #[test]
    fn test_degenerate_bounds_contain_nothing() {
        let bounds = GridBounds::new(0, 5);
        assert!(!bounds.contains(GridPos::new(0, 0)));
        assert_eq!(bounds.cells().count(), 0);
    }

    #[test]
    fn test_cells_enumerate_row_major() {
        let cells: Vec<_> = GridBounds::new(2, 2).cells().collect();
        assert_eq!(
            cells,
            vec![
                GridPos::new(0, 0),
                GridPos::new(1, 0),
                GridPos::new(0, 1),
                GridPos::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_set_and_get_cell() {
        let mut grid = NavGrid::new(5, 5);
        let pos = GridPos::new(2, 2);

        assert!(grid.is_walkable(pos));

        grid.set_cell(pos, CellType::Blocked);
        assert!(!grid.is_walkable(pos));

        grid.set_cell(pos, CellType::SlowTerrain);
        assert!(grid.is_walkable(pos));
        assert_eq!(grid.movement_cost(pos), Some(200));

        assert!(!grid.set_cell(GridPos::new(5, 0), CellType::Blocked));
        assert_eq!(grid.get_cell(GridPos::new(-1, 0)), None);
    }

    #[test]
    fn test_fill_rect_clips_to_grid() {
        let mut grid = NavGrid::new(4, 4);
        grid.fill_rect(GridPos::new(2, -1), GridPos::new(9, 1), CellType::Blocked);
        assert!(!grid.is_walkable(GridPos::new(2, 0)));
        assert!(!grid.is_walkable(GridPos::new(3, 1)));
        assert!(grid.is_walkable(GridPos::new(1, 1)));
        assert!(grid.is_walkable(GridPos::new(2, 2)));
    }

    #[test]
    fn test_grid_pos_ordering_is_row_major() {
        assert!(GridPos::new(5, 0) < GridPos::new(0, 1));
        assert!(GridPos::new(0, 1) < GridPos::new(1, 1));
    }

    #[test]
    fn test_direction_table() {
        assert_eq!(Direction::ALL.iter().filter(|d| d.is_diagonal()).count(), 4);
        assert_eq!(Direction::NORTH_EAST.reverse(), Direction::SOUTH_WEST);
        assert_eq!(GridPos::new(3, 3).step(Direction::NORTH_WEST), GridPos::new(2, 2));
    }
}
