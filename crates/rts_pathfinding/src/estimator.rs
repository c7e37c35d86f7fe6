//! Octile distance heuristic.
//!
//! With `dx`, `dy` the absolute deltas, a shortest unobstructed route takes
//! `min(dx, dy)` diagonal steps and `|dx - dy|` straight steps. Pricing
//! those at the cheapest possible orthogonal and diagonal edge costs gives a
//! lower bound on the true remaining cost.
//!
//! More information: <http://theory.stanford.edu/~amitp/GameProgramming/Heuristics.html>

use crate::grid::{Cost, GridPos, BASE_CELL_COST};
use crate::math::{multiply_by_sqrt2, scale_permille};

/// Admissible distance estimator for 8-directional grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CostEstimator {
    straight_cost: Cost,
    diagonal_cost: Cost,
    inflation_permille: u32,
}

impl CostEstimator {
    /// Estimator for a minimum orthogonal step cost.
    #[must_use]
    pub fn new(straight_cost: Cost) -> Self {
        Self {
            straight_cost,
            diagonal_cost: multiply_by_sqrt2(straight_cost),
            inflation_permille: 1000,
        }
    }

    /// Inflate estimates by a permille factor (`1001` = +0.1%).
    ///
    /// Anything above `1000` breaks ties toward paths with fewer turns, at the
    /// price of strict admissibility.
    #[must_use]
    pub fn with_inflation_permille(mut self, inflation_permille: u32) -> Self {
        self.inflation_permille = inflation_permille.max(1000);
        self
    }

    /// Cost of one orthogonal step.
    #[must_use]
    pub const fn straight_cost(&self) -> Cost {
        self.straight_cost
    }

    /// Cost of one diagonal step.
    #[must_use]
    pub const fn diagonal_cost(&self) -> Cost {
        self.diagonal_cost
    }

    #[inline]
    fn deltas(a: GridPos, b: GridPos) -> (u64, u64) {
        let dx = u64::from(a.x.abs_diff(b.x));
        let dy = u64::from(a.y.abs_diff(b.y));
        let diag = dx.min(dy);
        (diag, dx + dy)
    }

    /// Estimated cost from `a` to `b`.
    #[must_use]
    pub fn estimate(&self, a: GridPos, b: GridPos) -> u64 {
        let (diag, straight) = Self::deltas(a, b);
        let d = u64::from(self.straight_cost);
        let d2 = u64::from(self.diagonal_cost);
        let h = d * (straight - 2 * diag) + d2 * diag;
        scale_permille(h, self.inflation_permille)
    }

    /// The same estimate written as `D * straight + (D2 - 2D) * diag`.
    ///
    /// Kept as a regression check: both forms must agree for every input.
    #[must_use]
    pub fn estimate_factored(&self, a: GridPos, b: GridPos) -> u64 {
        let (diag, straight) = Self::deltas(a, b);
        let d = i128::from(self.straight_cost);
        let d2 = i128::from(self.diagonal_cost);
        let h = d * i128::from(straight) + (d2 - 2 * d) * i128::from(diag);
        scale_permille(u64::try_from(h).unwrap_or(0), self.inflation_permille)
    }
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new(BASE_CELL_COST)
    }
}
