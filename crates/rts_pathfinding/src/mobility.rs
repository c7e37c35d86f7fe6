//! Per-mover passability and cost rules.
//!
//! The engine knows nothing about unit types. Each request carries a
//! [`Mobility`] value: a capability object answering "can this mover enter
//! that cell" and "what does entering it cost". Amphibious, hovering, or
//! scripted movers are just different implementations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::grid::{CellType, Cost, GridPos, NavGrid};

/// Traversal class of a mover.
///
/// Movers sharing a class share passability rules, so paths computed for one
/// are valid for all of them. Used as part of the path cache key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct MoverClass(pub u32);

/// Which transient obstacles the oracle should honour for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellConditions {
    /// Terrain only.
    #[default]
    None,
    /// Terrain plus cells currently occupied by other units.
    TransientActors,
}

/// Passability/cost oracle for one mover.
pub trait Mobility {
    /// Traversal class of this mover.
    fn class(&self) -> MoverClass;

    /// Whether the mover may enter `pos` under the given conditions.
    ///
    /// [`CellConditions::TransientActors`] may only refuse cells that
    /// [`CellConditions::None`] accepts, never the reverse.
    fn can_enter(&self, pos: GridPos, conditions: CellConditions) -> bool;

    /// Cost of entering `pos` with an orthogonal step, `None` if it is
    /// impassable terrain for this mover.
    fn movement_cost(&self, pos: GridPos) -> Option<Cost>;

    /// Combined check used by the connectivity provider: the cost of entering
    /// `pos`, or `None` if it cannot be entered at all.
    ///
    /// A reported cost of zero is raised to one so every edge stays positive.
    fn entry_cost(&self, pos: GridPos, conditions: CellConditions) -> Option<Cost> {
        if !self.can_enter(pos, conditions) {
            return None;
        }
        self.movement_cost(pos).map(|cost| cost.max(1))
    }
}

impl<M: Mobility + ?Sized> Mobility for &M {
    fn class(&self) -> MoverClass {
        (**self).class()
    }

    fn can_enter(&self, pos: GridPos, conditions: CellConditions) -> bool {
        (**self).can_enter(pos, conditions)
    }

    fn movement_cost(&self, pos: GridPos) -> Option<Cost> {
        (**self).movement_cost(pos)
    }
}

/// Terrain cost table for one kind of locomotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainCosts {
    /// Cost of [`CellType::Walkable`] cells.
    pub walkable: Option<Cost>,
    /// Cost of [`CellType::SlowTerrain`] cells.
    pub slow: Option<Cost>,
    /// Cost of [`CellType::Water`] cells.
    pub water: Option<Cost>,
}

impl TerrainCosts {
    /// Ground units: walk, slowed by rough terrain, no water.
    #[must_use]
    pub const fn ground() -> Self {
        Self {
            walkable: CellType::Walkable.movement_cost(),
            slow: CellType::SlowTerrain.movement_cost(),
            water: None,
        }
    }

    /// Amphibious units: treat water like open ground.
    #[must_use]
    pub const fn amphibious() -> Self {
        Self {
            walkable: CellType::Walkable.movement_cost(),
            slow: CellType::SlowTerrain.movement_cost(),
            water: CellType::Walkable.movement_cost(),
        }
    }

    /// Cost for a cell type. Blocked cells are never passable.
    #[must_use]
    pub const fn cost_of(self, cell: CellType) -> Option<Cost> {
        match cell {
            CellType::Walkable => self.walkable,
            CellType::SlowTerrain => self.slow,
            CellType::Water => self.water,
            CellType::Blocked => None,
        }
    }
}

impl Default for TerrainCosts {
    fn default() -> Self {
        Self::ground()
    }
}

/// Default mobility rules backed by a [`NavGrid`].
#[derive(Debug, Clone)]
pub struct TerrainMobility<'a> {
    grid: &'a NavGrid,
    class: MoverClass,
    costs: TerrainCosts,
    occupied: Option<&'a BTreeSet<GridPos>>,
}

impl<'a> TerrainMobility<'a> {
    /// Ground mobility over a navigation grid.
    #[must_use]
    pub fn new(grid: &'a NavGrid, class: MoverClass) -> Self {
        Self {
            grid,
            class,
            costs: TerrainCosts::ground(),
            occupied: None,
        }
    }

    /// Use a custom terrain cost table.
    #[must_use]
    pub fn with_costs(mut self, costs: TerrainCosts) -> Self {
        self.costs = costs;
        self
    }

    /// Cells occupied by other units, honoured under
    /// [`CellConditions::TransientActors`].
    #[must_use]
    pub fn with_occupied(mut self, occupied: &'a BTreeSet<GridPos>) -> Self {
        self.occupied = Some(occupied);
        self
    }
}

impl Mobility for TerrainMobility<'_> {
    fn class(&self) -> MoverClass {
        self.class
    }

    fn can_enter(&self, pos: GridPos, conditions: CellConditions) -> bool {
        let Some(cell) = self.grid.get_cell(pos) else {
            return false;
        };
        if self.costs.cost_of(cell).is_none() {
            return false;
        }
        match (conditions, self.occupied) {
            (CellConditions::TransientActors, Some(occupied)) => !occupied.contains(&pos),
            _ => true,
        }
    }

    fn movement_cost(&self, pos: GridPos) -> Option<Cost> {
        self.grid
            .get_cell(pos)
            .and_then(|cell| self.costs.cost_of(cell))
    }
}

/// Mobility rules built from two closures.
///
/// Handy for scripted movers and tests:
///
/// ```
/// use rts_pathfinding::grid::GridPos;
/// use rts_pathfinding::mobility::{CellConditions, FnMobility, Mobility, MoverClass};
///
/// let hover = FnMobility::new(
///     MoverClass(7),
///     |pos: GridPos, _: CellConditions| pos.x != 3,
///     |_: GridPos| Some(100),
/// );
/// assert!(!hover.can_enter(GridPos::new(3, 0), CellConditions::None));
/// assert_eq!(hover.entry_cost(GridPos::new(2, 0), CellConditions::None), Some(100));
/// ```
#[derive(Clone)]
pub struct FnMobility<E, C> {
    class: MoverClass,
    can_enter: E,
    cost: C,
}

impl<E, C> FnMobility<E, C>
where
    E: Fn(GridPos, CellConditions) -> bool,
    C: Fn(GridPos) -> Option<Cost>,
{
    /// Create mobility rules from a passability predicate and a cost function.
    pub fn new(class: MoverClass, can_enter: E, cost: C) -> Self {
        Self {
            class,
            can_enter,
            cost,
        }
    }
}

impl<E, C> std::fmt::Debug for FnMobility<E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMobility")
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

impl<E, C> Mobility for FnMobility<E, C>
where
    E: Fn(GridPos, CellConditions) -> bool,
    C: Fn(GridPos) -> Option<Cost>,
{
    fn class(&self) -> MoverClass {
        self.class
    }

    fn can_enter(&self, pos: GridPos, conditions: CellConditions) -> bool {
        (self.can_enter)(pos, conditions)
    }

    fn movement_cost(&self, pos: GridPos) -> Option<Cost> {
        (self.cost)(pos)
    }
}
