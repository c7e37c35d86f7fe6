//! Path validation helpers.

use rts_pathfinding::connectivity::GridConnectivity;
use rts_pathfinding::estimator::CostEstimator;
use rts_pathfinding::grid::GridPos;
use rts_pathfinding::mobility::Mobility;

/// Check that a non-empty path runs from `from` to `to` over valid edges and
/// return its cost.
///
/// # Panics
///
/// Panics with a description of the first problem found.
pub fn assert_valid_path<M: Mobility>(conn: &GridConnectivity<M>, path: &[GridPos], from: GridPos, to: GridPos) -> u64 {
    assert!(!path.is_empty(), "expected a path from {from} to {to}");
    assert_eq!(path.first(), Some(&from), "path does not start at source");
    assert_eq!(path.last(), Some(&to), "path does not end at destination");
    for step in path.windows(2) {
        assert!(step[0].is_adjacent(step[1]), "non-adjacent step {} -> {}", step[0], step[1]);
        assert!(
            conn.edge_cost(step[0], step[1]).is_some(),
            "step {} -> {} is not traversable",
            step[0],
            step[1]
        );
    }
    for (i, cell) in path.iter().enumerate().skip(1) {
        assert!(!path[..i].contains(cell), "path revisits {cell}");
    }
    conn.path_cost(path).unwrap_or(u64::MAX)
}

/// Cost of a path, `None` for an empty path or an invalid step.
pub fn path_cost<M: Mobility>(conn: &GridConnectivity<M>, path: &[GridPos]) -> Option<u64> {
    if path.is_empty() {
        return None;
    }
    conn.path_cost(path)
}

/// Cost of a path above the unobstructed octile estimate between its ends.
///
/// # Panics
///
/// Panics on an empty or invalid path.
pub fn detour_cost<M: Mobility>(conn: &GridConnectivity<M>, estimator: &CostEstimator, path: &[GridPos]) -> u64 {
    let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
        panic!("empty path has no detour");
    };
    let cost = conn.path_cost(path).expect("invalid path");
    cost.saturating_sub(estimator.estimate(first, last))
}
