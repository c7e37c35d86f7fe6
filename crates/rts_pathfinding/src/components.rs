//! Connected-component labels per mover class.
//!
//! Two passable cells share a label when a mover can walk between them over
//! terrain alone. Finders consult the labels before searching, so a request
//! across a wall or a shoreline is answered without expanding a node.
//!
//! Labels ignore transient obstacles. Occupied cells only ever remove edges,
//! so "different labels" still proves a request unreachable; "same label"
//! only means a search is worth running.
//!
//! Labels go stale when passability changes. Owners drop them with
//! [`ComponentIndex::invalidate`] or [`ComponentIndex::clear`].

use std::collections::HashMap;

use crate::connectivity::{Edge, GridConnectivity};
use crate::grid::{GridBounds, GridPos};
use crate::mobility::{Mobility, MoverClass};

const UNLABELLED: u32 = u32::MAX;

/// Component labels of every cell for one mover class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMap {
    bounds: GridBounds,
    labels: Vec<u32>,
    count: u32,
}

impl ComponentMap {
    /// Label every passable cell reachable under `connectivity`.
    ///
    /// Edges between passable cells are symmetric, so a depth-first flood
    /// from each unlabelled passable cell covers exactly its component.
    pub fn build<M: Mobility>(connectivity: &GridConnectivity<M>) -> Self {
        let bounds = connectivity.bounds();
        let mut labels = vec![UNLABELLED; bounds.cell_count()];
        let mut stack: Vec<GridPos> = Vec::new();
        let mut edges: Vec<Edge> = Vec::with_capacity(8);
        let mut count = 0u32;

        for start in bounds.cells() {
            let Some(index) = bounds.index_of(start) else {
                continue;
            };
            if labels[index] != UNLABELLED || !connectivity.is_passable(start) {
                continue;
            }
            // Past u32::MAX - 1 components, labels merge. Merged labels can
            // only make the check answer "maybe reachable".
            let label = count.min(UNLABELLED - 1);
            count = count.saturating_add(1);

            labels[index] = label;
            stack.push(start);
            while let Some(pos) = stack.pop() {
                connectivity.neighbors_into(pos, &mut edges);
                for &(next, _) in &edges {
                    if let Some(i) = bounds.index_of(next) {
                        if labels[i] == UNLABELLED {
                            labels[i] = label;
                            stack.push(next);
                        }
                    }
                }
            }
        }

        tracing::debug!(components = count, cells = labels.len(), "Labelled map components");
        Self {
            bounds,
            labels,
            count,
        }
    }

    /// Bounds the labels were built for.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Number of components found.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Label of a cell, `None` if it is out of bounds or impassable.
    #[must_use]
    pub fn label(&self, pos: GridPos) -> Option<u32> {
        let label = *self.labels.get(self.bounds.index_of(pos)?)?;
        (label != UNLABELLED).then_some(label)
    }

    /// False only if no route from `from` to `to` can exist.
    ///
    /// An impassable `from` is allowed (a unit may step off its cell); it
    /// may reach whatever its first step can reach.
    pub fn may_reach<M: Mobility>(
        &self,
        connectivity: &GridConnectivity<M>,
        from: GridPos,
        to: GridPos,
    ) -> bool {
        let Some(target) = self.label(to) else {
            return false;
        };
        match self.label(from) {
            Some(source) => source == target,
            None => connectivity
                .neighbors(from)
                .iter()
                .any(|&(next, _)| self.label(next) == Some(target)),
        }
    }
}

/// Lazily built [`ComponentMap`]s, one per mover class.
#[derive(Debug, Clone)]
pub struct ComponentIndex {
    bounds: GridBounds,
    maps: HashMap<MoverClass, ComponentMap>,
}

impl ComponentIndex {
    /// Create an empty index for a map of the given bounds.
    #[must_use]
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            maps: HashMap::new(),
        }
    }

    /// Labels for the mover behind `connectivity`, built on first use.
    ///
    /// Pass terrain-only connectivity; see the module docs.
    pub fn labels_for<M: Mobility>(&mut self, connectivity: &GridConnectivity<M>) -> &ComponentMap {
        let class = connectivity.mobility().class();
        self.maps
            .entry(class)
            .or_insert_with(|| ComponentMap::build(connectivity))
    }

    /// Whether labels for a class are currently held.
    #[must_use]
    pub fn is_built(&self, class: MoverClass) -> bool {
        self.maps.contains_key(&class)
    }

    /// Drop the labels of one class. Returns whether any were held.
    pub fn invalidate(&mut self, class: MoverClass) -> bool {
        self.maps.remove(&class).is_some()
    }

    /// Drop all labels.
    pub fn clear(&mut self) {
        self.maps.clear();
    }

    /// Point the index at a resized map, dropping all labels.
    pub fn rebind(&mut self, bounds: GridBounds) {
        self.bounds = bounds;
        self.maps.clear();
    }

    /// Bounds served.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::CornerPolicy;
    use crate::grid::{CellType, NavGrid};
    use crate::mobility::{TerrainCosts, TerrainMobility};

    fn pos(x: i32, y: i32) -> GridPos {
        GridPos::new(x, y)
    }

    fn connectivity(grid: &NavGrid) -> GridConnectivity<TerrainMobility<'_>> {
        GridConnectivity::new(grid.bounds(), TerrainMobility::new(grid, MoverClass(0)))
    }

    #[test]
    fn test_open_map_is_one_component() {
        let grid = NavGrid::new(6, 4);
        let map = ComponentMap::build(&connectivity(&grid));
        assert_eq!(map.count(), 1);
        assert_eq!(map.label(pos(0, 0)), map.label(pos(5, 3)));
        assert_eq!(map.label(pos(6, 0)), None);
    }

    #[test]
    fn test_wall_splits_components() {
        let mut grid = NavGrid::new(7, 5);
        grid.fill_rect(pos(3, 0), pos(3, 4), CellType::Blocked);
        let conn = connectivity(&grid);
        let map = ComponentMap::build(&conn);

        assert_eq!(map.count(), 2);
        assert_eq!(map.label(pos(3, 2)), None);
        assert!(map.may_reach(&conn, pos(0, 0), pos(2, 4)));
        assert!(!map.may_reach(&conn, pos(0, 0), pos(6, 4)));
    }

    #[test]
    fn test_diagonal_squeeze_does_not_connect() {
        let mut grid = NavGrid::new(2, 2);
        grid.set_cell(pos(1, 0), CellType::Blocked);
        grid.set_cell(pos(0, 1), CellType::Blocked);

        for policy in [CornerPolicy::Lenient, CornerPolicy::Strict] {
            let conn = connectivity(&grid).with_corner_policy(policy);
            let map = ComponentMap::build(&conn);
            assert_eq!(map.count(), 2, "{policy:?}");
            assert!(!map.may_reach(&conn, pos(0, 0), pos(1, 1)));
        }
    }

    #[test]
    fn test_blocked_source_reaches_through_its_neighbors() {
        let mut grid = NavGrid::new(7, 3);
        grid.fill_rect(pos(3, 0), pos(3, 2), CellType::Blocked);
        let conn = connectivity(&grid);
        let map = ComponentMap::build(&conn);

        // Standing on the wall, both sides are one step away.
        assert!(map.may_reach(&conn, pos(3, 1), pos(0, 1)));
        assert!(map.may_reach(&conn, pos(3, 1), pos(6, 1)));
        assert!(!map.may_reach(&conn, pos(0, 1), pos(3, 1)));
    }

    #[test]
    fn test_index_builds_per_class_and_invalidates() {
        let grid = grid_with_lake();
        let ground = TerrainMobility::new(&grid, MoverClass(0));
        let boat = TerrainMobility::new(&grid, MoverClass(1)).with_costs(TerrainCosts::amphibious());
        let mut index = ComponentIndex::new(grid.bounds());

        let ground_conn = GridConnectivity::new(grid.bounds(), &ground);
        let boat_conn = GridConnectivity::new(grid.bounds(), &boat);
        assert_eq!(index.labels_for(&ground_conn).count(), 2);
        assert_eq!(index.labels_for(&boat_conn).count(), 1);
        assert!(index.is_built(MoverClass(0)));

        assert!(index.invalidate(MoverClass(0)));
        assert!(!index.invalidate(MoverClass(0)));
        assert!(index.is_built(MoverClass(1)));
        index.rebind(GridBounds::new(3, 3));
        assert!(!index.is_built(MoverClass(1)));
        assert_eq!(index.bounds(), GridBounds::new(3, 3));
    }

    fn grid_with_lake() -> NavGrid {
        let mut grid = NavGrid::new(5, 3);
        grid.fill_rect(pos(2, 0), pos(2, 2), CellType::Water);
        grid
    }
}
