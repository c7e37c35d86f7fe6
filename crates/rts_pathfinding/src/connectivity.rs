//! Grid connectivity: which cells a mover can step to, and at what cost.
//!
//! Movement is 8-directional. Orthogonal steps cost the entered cell's
//! movement cost; diagonal steps cost that times `sqrt(2)` (see
//! [`multiply_by_sqrt2`]). Diagonals may additionally be refused when the
//! corner they cut is blocked, according to a [`CornerPolicy`].

use serde::{Deserialize, Serialize};

use crate::grid::{Cost, Direction, GridBounds, GridPos};
use crate::math::multiply_by_sqrt2;
use crate::mobility::{CellConditions, Mobility};

/// A traversable edge: destination cell and step cost.
pub type Edge = (GridPos, Cost);

/// Rule for diagonal moves past blocked corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CornerPolicy {
    /// Refuse a diagonal only when both orthogonal cells beside it are
    /// impassable.
    #[default]
    Lenient,
    /// Refuse a diagonal when either orthogonal cell beside it is impassable.
    Strict,
}

/// Connectivity provider over a bounded grid and a mobility oracle.
#[derive(Debug, Clone)]
pub struct GridConnectivity<M> {
    bounds: GridBounds,
    mobility: M,
    corner_policy: CornerPolicy,
    conditions: CellConditions,
}

impl<M: Mobility> GridConnectivity<M> {
    /// Create a provider with lenient corners and terrain-only conditions.
    pub fn new(bounds: GridBounds, mobility: M) -> Self {
        Self {
            bounds,
            mobility,
            corner_policy: CornerPolicy::default(),
            conditions: CellConditions::default(),
        }
    }

    /// Set the diagonal corner policy.
    #[must_use]
    pub fn with_corner_policy(mut self, corner_policy: CornerPolicy) -> Self {
        self.corner_policy = corner_policy;
        self
    }

    /// Set the conditions forwarded to the mobility oracle.
    #[must_use]
    pub fn with_conditions(mut self, conditions: CellConditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Map bounds.
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// The mobility oracle.
    pub fn mobility(&self) -> &M {
        &self.mobility
    }

    /// Active corner policy.
    pub fn corner_policy(&self) -> CornerPolicy {
        self.corner_policy
    }

    /// Cost to enter a cell, `None` if out of bounds or impassable.
    #[inline]
    pub fn entry_cost(&self, pos: GridPos) -> Option<Cost> {
        if !self.bounds.contains(pos) {
            return None;
        }
        self.mobility.entry_cost(pos, self.conditions)
    }

    /// True if the cell is in bounds and the mover may enter it.
    #[inline]
    pub fn is_passable(&self, pos: GridPos) -> bool {
        self.entry_cost(pos).is_some()
    }

    /// Check the corner policy for a step from `from` in direction `dir`.
    ///
    /// The two cells beside a diagonal are the same whichever way the
    /// diagonal is walked, so this is symmetric.
    fn corner_allows(&self, from: GridPos, dir: Direction) -> bool {
        if !dir.is_diagonal() {
            return true;
        }
        let side_a = self.is_passable(GridPos::new(from.x + dir.dx, from.y));
        let side_b = self.is_passable(GridPos::new(from.x, from.y + dir.dy));
        match self.corner_policy {
            CornerPolicy::Lenient => side_a || side_b,
            CornerPolicy::Strict => side_a && side_b,
        }
    }

    #[inline]
    fn step_cost(entry: Cost, dir: Direction) -> Cost {
        if dir.is_diagonal() {
            multiply_by_sqrt2(entry)
        } else {
            entry
        }
    }

    /// Traversable neighbors of `pos` with their step costs.
    ///
    /// `pos` itself need not be passable: a unit may always step off the
    /// cell it stands on.
    pub fn neighbors(&self, pos: GridPos) -> Vec<Edge> {
        let mut out = Vec::with_capacity(Direction::ALL.len());
        self.neighbors_into(pos, &mut out);
        out
    }

    /// Like [`neighbors`](Self::neighbors), writing into a reusable buffer.
    /// The buffer is cleared first.
    pub fn neighbors_into(&self, pos: GridPos, out: &mut Vec<Edge>) {
        out.clear();
        if !self.bounds.contains(pos) {
            return;
        }
        for dir in Direction::ALL {
            let next = pos.step(dir);
            let Some(entry) = self.entry_cost(next) else {
                continue;
            };
            if !self.corner_allows(pos, dir) {
                continue;
            }
            out.push((next, Self::step_cost(entry, dir)));
        }
    }

    /// Edges for a search running backwards from the destination.
    ///
    /// Each returned `(n, cost)` is a forward edge `n -> pos` walked in
    /// reverse, so the cost is that of entering `pos`. The cell `exempt`
    /// (the forward source) is accepted even when impassable.
    pub fn reverse_neighbors_into(
        &self,
        pos: GridPos,
        exempt: Option<GridPos>,
        out: &mut Vec<Edge>,
    ) {
        out.clear();
        let Some(entry) = self.entry_cost(pos) else {
            return;
        };
        for dir in Direction::ALL {
            let prev = pos.step(dir);
            if !self.bounds.contains(prev) {
                continue;
            }
            if exempt != Some(prev) && !self.is_passable(prev) {
                continue;
            }
            if !self.corner_allows(pos, dir) {
                continue;
            }
            out.push((prev, Self::step_cost(entry, dir)));
        }
    }

    /// Allocating form of [`reverse_neighbors_into`](Self::reverse_neighbors_into).
    pub fn reverse_neighbors(&self, pos: GridPos, exempt: Option<GridPos>) -> Vec<Edge> {
        let mut out = Vec::with_capacity(Direction::ALL.len());
        self.reverse_neighbors_into(pos, exempt, &mut out);
        out
    }

    /// Cost of a single step between adjacent cells, `None` if not allowed.
    pub fn edge_cost(&self, from: GridPos, to: GridPos) -> Option<Cost> {
        if !self.bounds.contains(from) || !from.is_adjacent(to) {
            return None;
        }
        let dir = Direction {
            dx: to.x - from.x,
            dy: to.y - from.y,
        };
        let entry = self.entry_cost(to)?;
        if !self.corner_allows(from, dir) {
            return None;
        }
        Some(Self::step_cost(entry, dir))
    }

    /// Total cost of walking a path, `None` if any step is not a valid edge.
    pub fn path_cost(&self, path: &[GridPos]) -> Option<u64> {
        path.windows(2).try_fold(0u64, |total, step| {
            self.edge_cost(step[0], step[1])
                .map(|cost| total + u64::from(cost))
        })
    }
}
