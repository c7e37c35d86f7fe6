//! Brute-force reference solver.
//!
//! Plain Dijkstra over the same connectivity provider the engine uses. Slow
//! and allocation-heavy, but simple enough to trust as ground truth for
//! optimality checks on small maps.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rts_pathfinding::connectivity::GridConnectivity;
use rts_pathfinding::grid::GridPos;
use rts_pathfinding::mobility::Mobility;

/// Cheapest cost from `from` to every cell, indexed like
/// [`GridBounds::index_of`](rts_pathfinding::grid::GridBounds::index_of).
/// Unreachable cells hold `None`.
pub fn dijkstra_costs<M: Mobility>(conn: &GridConnectivity<M>, from: GridPos) -> Vec<Option<u64>> {
    let bounds = conn.bounds();
    let mut dist = vec![None; bounds.cell_count()];
    let Some(start) = bounds.index_of(from) else {
        return dist;
    };
    dist[start] = Some(0);

    let mut heap = BinaryHeap::new();
    heap.push(Reverse((0u64, from)));
    while let Some(Reverse((cost, pos))) = heap.pop() {
        let Some(index) = bounds.index_of(pos) else {
            continue;
        };
        if dist[index].is_some_and(|best| best < cost) {
            continue;
        }
        for (next, step) in conn.neighbors(pos) {
            let Some(next_index) = bounds.index_of(next) else {
                continue;
            };
            let candidate = cost + u64::from(step);
            if dist[next_index].map_or(true, |best| candidate < best) {
                dist[next_index] = Some(candidate);
                heap.push(Reverse((candidate, next)));
            }
        }
    }
    dist
}

/// Cheapest cost of a valid request, `None` where the engine must return an
/// empty path (out of bounds, impassable destination, or unreachable).
pub fn shortest_cost<M: Mobility>(conn: &GridConnectivity<M>, from: GridPos, to: GridPos) -> Option<u64> {
    let bounds = conn.bounds();
    if !bounds.contains(from) || !conn.is_passable(to) {
        return None;
    }
    let index = bounds.index_of(to)?;
    dijkstra_costs(conn, from)[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{ground, pos};
    use rts_pathfinding::grid::{CellType, NavGrid};

    #[test]
    fn test_open_grid_costs() {
        let grid = NavGrid::new(8, 8);
        let conn = GridConnectivity::new(grid.bounds(), ground(&grid));
        assert_eq!(shortest_cost(&conn, pos(0, 0), pos(0, 0)), Some(0));
        assert_eq!(shortest_cost(&conn, pos(0, 0), pos(7, 0)), Some(700));
        assert_eq!(shortest_cost(&conn, pos(0, 0), pos(7, 7)), Some(7 * 141));
    }

    #[test]
    fn test_unreachable_and_invalid() {
        let mut grid = NavGrid::new(8, 8);
        grid.fill_rect(pos(4, 0), pos(4, 7), CellType::Blocked);
        let conn = GridConnectivity::new(grid.bounds(), ground(&grid));
        assert_eq!(shortest_cost(&conn, pos(0, 0), pos(7, 7)), None);
        assert_eq!(shortest_cost(&conn, pos(0, 0), pos(4, 4)), None);
        assert_eq!(shortest_cost(&conn, pos(-1, 0), pos(1, 1)), None);
    }
}
