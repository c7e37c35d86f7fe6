//! Search episodes: the open/closed state of one A* traversal.
//!
//! An episode expands cells in order of estimated total cost. It runs either
//! forward (from the source toward the destination) or reversed (from the
//! destination toward the source, walking edges backwards). Episodes are
//! plain values: they can be expanded a few nodes per tick and resumed
//! later, or dropped at any point.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::connectivity::{Edge, GridConnectivity};
use crate::estimator::CostEstimator;
use crate::grid::GridPos;
use crate::mobility::Mobility;
use crate::pool::{NodeLayer, NodeRecord, NodeStatus};

/// Which way an episode walks the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchDirection {
    /// Expand from the source toward the destination.
    Forward,
    /// Expand from the destination toward the source over reversed edges.
    Reversed,
}

/// Outcome of a bounded expansion slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchProgress {
    /// Budget spent; the episode can be resumed.
    Pending,
    /// The target cell was closed.
    Found(GridPos),
    /// The frontier emptied without reaching the target.
    Exhausted,
}

/// A frontier entry in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct FrontierEntry {
    estimated_total: u64,
    pos: GridPos,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so we reverse the comparison for min-heap behavior.
        match other.estimated_total.cmp(&self.estimated_total) {
            // Deterministic tie-breaking: prefer the lower row-major position
            Ordering::Equal => other.pos.cmp(&self.pos),
            ord => ord,
        }
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One directional A* traversal over a connectivity provider.
pub struct SearchEpisode<'c, M> {
    connectivity: &'c GridConnectivity<M>,
    estimator: CostEstimator,
    direction: SearchDirection,
    target: GridPos,
    origins: Vec<GridPos>,
    layer: NodeLayer,
    frontier: BinaryHeap<FrontierEntry>,
    edges: Vec<Edge>,
    expanded: usize,
    max_cost: u64,
    found: Option<GridPos>,
}

impl<M> std::fmt::Debug for SearchEpisode<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEpisode")
            .field("direction", &self.direction)
            .field("target", &self.target)
            .field("origins", &self.origins)
            .field("frontier", &self.frontier.len())
            .field("expanded", &self.expanded)
            .field("found", &self.found)
            .finish_non_exhaustive()
    }
}

impl<'c, M: Mobility> SearchEpisode<'c, M> {
    /// Create an episode with no origins.
    ///
    /// `target` is the cell the heuristic aims at and whose closing ends the
    /// search. For a reversed episode it is the forward source, which is
    /// allowed to be impassable.
    ///
    /// The layer is reset, so a dirty layer may be passed in.
    pub fn new(
        mut layer: NodeLayer,
        connectivity: &'c GridConnectivity<M>,
        estimator: CostEstimator,
        direction: SearchDirection,
        target: GridPos,
    ) -> Self {
        layer.reset();
        Self {
            connectivity,
            estimator,
            direction,
            target,
            origins: Vec::new(),
            layer,
            frontier: BinaryHeap::new(),
            edges: Vec::with_capacity(8),
            expanded: 0,
            max_cost: 0,
            found: None,
        }
    }

    /// Seed the frontier with a starting cell at zero cost.
    ///
    /// Returns `false` (and does nothing) for out-of-bounds cells or cells
    /// already seeded.
    pub fn add_origin(&mut self, pos: GridPos) -> bool {
        if !self.connectivity.bounds().contains(pos) || self.layer.get(pos).status != NodeStatus::Unvisited {
            return false;
        }
        let estimated_total = self.estimator.estimate(pos, self.target);
        self.layer.set(
            pos,
            NodeRecord {
                cost_so_far: 0,
                estimated_total,
                predecessor: pos,
                status: NodeStatus::Open,
            },
        );
        self.frontier.push(FrontierEntry {
            estimated_total,
            pos,
        });
        self.origins.push(pos);
        true
    }

    /// Search direction.
    pub fn direction(&self) -> SearchDirection {
        self.direction
    }

    /// The cell this episode is heading for.
    pub fn target(&self) -> GridPos {
        self.target
    }

    /// Cells seeded with [`add_origin`](Self::add_origin).
    pub fn origins(&self) -> &[GridPos] {
        &self.origins
    }

    /// Number of cells expanded so far.
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Largest cost-so-far assigned to any cell.
    pub fn max_cost(&self) -> u64 {
        self.max_cost
    }

    /// The connectivity provider being searched.
    pub fn connectivity(&self) -> &'c GridConnectivity<M> {
        self.connectivity
    }

    /// Scratch record for a cell.
    pub fn record(&self, pos: GridPos) -> NodeRecord {
        self.layer.get(pos)
    }

    /// Lifecycle state of a cell.
    pub fn status(&self, pos: GridPos) -> NodeStatus {
        self.layer.get(pos).status
    }

    /// Cheapest known cost to a cell, `None` if never reached.
    pub fn cost_so_far(&self, pos: GridPos) -> Option<u64> {
        let record = self.layer.get(pos);
        match record.status {
            NodeStatus::Unvisited => None,
            NodeStatus::Open | NodeStatus::Closed => Some(record.cost_so_far),
        }
    }

    /// Whether any open cell remains.
    ///
    /// A cell may sit in the frontier more than once after a cheaper route to
    /// it was found. The cheaper entry is popped first and closes the cell;
    /// the leftovers are discarded here so the top of the frontier is always
    /// a live open cell.
    pub fn can_expand(&mut self) -> bool {
        while let Some(top) = self.frontier.peek() {
            if self.layer.get(top.pos).status == NodeStatus::Closed {
                self.frontier.pop();
            } else {
                return true;
            }
        }
        false
    }

    /// Smallest estimated total among open cells.
    pub fn peek_estimate(&mut self) -> Option<u64> {
        if self.can_expand() {
            self.frontier.peek().map(|entry| entry.estimated_total)
        } else {
            None
        }
    }

    /// Close the most promising open cell and relax its edges.
    pub fn expand(&mut self) -> Option<GridPos> {
        self.expand_with(|_, _| {})
    }

    /// Like [`expand`](Self::expand), reporting every successful relaxation
    /// as `(cell, new cost_so_far)`.
    pub fn expand_with<F>(&mut self, mut on_relax: F) -> Option<GridPos>
    where
        F: FnMut(GridPos, u64),
    {
        if !self.can_expand() {
            return None;
        }
        let current = self.frontier.pop()?.pos;

        let mut current_info = self.layer.get(current);
        current_info.status = NodeStatus::Closed;
        self.layer.set(current, current_info);
        self.expanded += 1;

        let mut edges = std::mem::take(&mut self.edges);
        match self.direction {
            SearchDirection::Forward => self.connectivity.neighbors_into(current, &mut edges),
            SearchDirection::Reversed => {
                self.connectivity
                    .reverse_neighbors_into(current, Some(self.target), &mut edges);
            }
        }

        for &(neighbor, step_cost) in &edges {
            let cost_so_far = current_info.cost_so_far + u64::from(step_cost);
            let neighbor_info = self.layer.get(neighbor);

            // Cost is even higher; next direction
            let estimated_remaining = match neighbor_info.status {
                NodeStatus::Closed => continue,
                NodeStatus::Open if cost_so_far >= neighbor_info.cost_so_far => continue,
                NodeStatus::Open => neighbor_info.estimated_total - neighbor_info.cost_so_far,
                NodeStatus::Unvisited => self.estimator.estimate(neighbor, self.target),
            };

            let estimated_total = cost_so_far + estimated_remaining;
            self.layer.set(
                neighbor,
                NodeRecord {
                    cost_so_far,
                    estimated_total,
                    predecessor: current,
                    status: NodeStatus::Open,
                },
            );
            self.frontier.push(FrontierEntry {
                estimated_total,
                pos: neighbor,
            });
            self.max_cost = self.max_cost.max(cost_so_far);
            on_relax(neighbor, cost_so_far);
        }
        self.edges = edges;

        if current == self.target {
            self.found = Some(current);
        }
        Some(current)
    }

    /// Expand up to `budget` cells, stopping early when the target closes or
    /// the frontier empties.
    pub fn expand_slice(&mut self, budget: usize) -> SearchProgress {
        if let Some(found) = self.found {
            return SearchProgress::Found(found);
        }
        for _ in 0..budget {
            match self.expand() {
                None => return SearchProgress::Exhausted,
                Some(pos) if pos == self.target => return SearchProgress::Found(pos),
                Some(_) => {}
            }
        }
        if self.can_expand() {
            SearchProgress::Pending
        } else {
            SearchProgress::Exhausted
        }
    }

    /// The target cell, if it has been closed.
    pub fn found(&self) -> Option<GridPos> {
        self.found
    }

    /// Predecessor chain from `pos` back to an origin, `pos` first.
    ///
    /// Empty if `pos` was never reached.
    pub fn walk_back(&self, pos: GridPos) -> Vec<GridPos> {
        if self.cost_so_far(pos).is_none() {
            return Vec::new();
        }
        let limit = self.connectivity.bounds().cell_count();
        let mut chain = vec![pos];
        let mut current = pos;
        loop {
            let previous = self.layer.get(current).predecessor;
            if previous == current {
                break;
            }
            chain.push(previous);
            current = previous;
            if chain.len() > limit {
                debug_assert!(false, "predecessor cycle at {current}");
                return Vec::new();
            }
        }
        chain
    }

    /// Route through `pos`, ordered from the forward source.
    ///
    /// For a forward episode this runs origin..=pos; for a reversed episode
    /// it runs pos..=origin, since a reversed origin is a forward destination.
    pub fn route_to(&self, pos: GridPos) -> Vec<GridPos> {
        let mut chain = self.walk_back(pos);
        if self.direction == SearchDirection::Forward {
            chain.reverse();
        }
        chain
    }

    /// Give the node layer back, ending the episode.
    pub fn into_layer(self) -> NodeLayer {
        self.layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellType, NavGrid};
    use crate::mobility::{MoverClass, TerrainMobility};

    fn pos(x: i32, y: i32) -> GridPos {
        GridPos::new(x, y)
    }

    fn episode<'c>(
        conn: &'c GridConnectivity<TerrainMobility<'c>>,
        from: GridPos,
        to: GridPos,
        direction: SearchDirection,
    ) -> SearchEpisode<'c, TerrainMobility<'c>> {
        let mut ep = SearchEpisode::new(
            NodeLayer::new(conn.bounds()),
            conn,
            CostEstimator::default(),
            direction,
            to,
        );
        ep.add_origin(from);
        ep
    }

    #[test]
    fn test_frontier_orders_by_estimate_then_position() {
        let mut heap = BinaryHeap::new();
        heap.push(FrontierEntry { estimated_total: 5, pos: pos(3, 0) });
        heap.push(FrontierEntry { estimated_total: 3, pos: pos(9, 9) });
        heap.push(FrontierEntry { estimated_total: 5, pos: pos(1, 0) });
        assert_eq!(heap.pop().map(|e| e.pos), Some(pos(9, 9)));
        assert_eq!(heap.pop().map(|e| e.pos), Some(pos(1, 0)));
        assert_eq!(heap.pop().map(|e| e.pos), Some(pos(3, 0)));
    }

    #[test]
    fn test_origin_is_open_and_points_at_itself() {
        let grid = NavGrid::new(5, 5);
        let conn = GridConnectivity::new(grid.bounds(), TerrainMobility::new(&grid, MoverClass(0)));
        let ep = episode(&conn, pos(1, 1), pos(3, 3), SearchDirection::Forward);

        let record = ep.record(pos(1, 1));
        assert_eq!(record.status, NodeStatus::Open);
        assert_eq!(record.cost_so_far, 0);
        assert_eq!(record.predecessor, pos(1, 1));
        assert_eq!(record.estimated_total, 282);
    }

    #[test]
    fn test_out_of_bounds_origin_is_ignored() {
        let grid = NavGrid::new(5, 5);
        let conn = GridConnectivity::new(grid.bounds(), TerrainMobility::new(&grid, MoverClass(0)));
        let mut ep = episode(&conn, pos(-1, 1), pos(3, 3), SearchDirection::Forward);
        assert!(ep.origins().is_empty());
        assert!(!ep.can_expand());
        assert_eq!(ep.expand_slice(10), SearchProgress::Exhausted);
    }

    #[test]
    fn test_expand_closes_and_opens_cells() {
        let grid = NavGrid::new(5, 5);
        let conn = GridConnectivity::new(grid.bounds(), TerrainMobility::new(&grid, MoverClass(0)));
        let mut ep = episode(&conn, pos(2, 2), pos(4, 2), SearchDirection::Forward);

        assert_eq!(ep.expand(), Some(pos(2, 2)));
        assert_eq!(ep.status(pos(2, 2)), NodeStatus::Closed);
        assert_eq!(ep.status(pos(3, 2)), NodeStatus::Open);
        assert_eq!(ep.cost_so_far(pos(3, 3)), Some(141));
        assert_eq!(ep.cost_so_far(pos(4, 4)), None);
        assert_eq!(ep.expanded(), 1);
    }

    #[test]
    fn test_cheaper_route_reopens_with_new_predecessor() {
        // Slow cell directly east; the diagonal detour is found first via
        // the north-east cell only if it is cheaper.
        let mut grid = NavGrid::new(3, 3);
        grid.set_cell(pos(1, 1), CellType::SlowTerrain);
        let conn = GridConnectivity::new(grid.bounds(), TerrainMobility::new(&grid, MoverClass(0)));
        let mut ep = episode(&conn, pos(0, 1), pos(2, 1), SearchDirection::Forward);

        assert_eq!(ep.expand_slice(100), SearchProgress::Found(pos(2, 1)));
        assert_eq!(ep.cost_so_far(pos(2, 1)), Some(282));
        let route = ep.route_to(pos(2, 1));
        assert_eq!(route.first(), Some(&pos(0, 1)));
        assert_eq!(route.last(), Some(&pos(2, 1)));
        assert_eq!(route.len(), 3);
        assert_ne!(route[1], pos(1, 1));
    }

    #[test]
    fn test_slice_budget_suspends_and_resumes() {
        let grid = NavGrid::new(20, 20);
        let conn = GridConnectivity::new(grid.bounds(), TerrainMobility::new(&grid, MoverClass(0)));
        let mut ep = episode(&conn, pos(0, 0), pos(19, 19), SearchDirection::Forward);

        assert_eq!(ep.expand_slice(3), SearchProgress::Pending);
        assert_eq!(ep.expanded(), 3);
        let mut progress = SearchProgress::Pending;
        while progress == SearchProgress::Pending {
            progress = ep.expand_slice(3);
        }
        assert_eq!(progress, SearchProgress::Found(pos(19, 19)));
        assert_eq!(ep.expand_slice(3), SearchProgress::Found(pos(19, 19)));
    }

    #[test]
    fn test_walled_off_target_exhausts() {
        let mut grid = NavGrid::new(6, 6);
        for y in 0..6 {
            grid.set_cell(pos(3, y), CellType::Blocked);
        }
        let conn = GridConnectivity::new(grid.bounds(), TerrainMobility::new(&grid, MoverClass(0)));
        let mut ep = episode(&conn, pos(0, 0), pos(5, 5), SearchDirection::Forward);
        assert_eq!(ep.expand_slice(usize::MAX), SearchProgress::Exhausted);
        assert_eq!(ep.expanded(), 18);
        assert!(ep.walk_back(pos(5, 5)).is_empty());
    }

    #[test]
    fn test_reversed_route_is_source_first() {
        let grid = NavGrid::new(6, 6);
        let conn = GridConnectivity::new(grid.bounds(), TerrainMobility::new(&grid, MoverClass(0)));
        // Reversed: origin is the destination, target is the source.
        let mut ep = episode(&conn, pos(5, 0), pos(0, 0), SearchDirection::Reversed);
        assert_eq!(ep.expand_slice(usize::MAX), SearchProgress::Found(pos(0, 0)));

        let route = ep.route_to(pos(0, 0));
        assert_eq!(route.first(), Some(&pos(0, 0)));
        assert_eq!(route.last(), Some(&pos(5, 0)));
        assert_eq!(conn.path_cost(&route), Some(500));
    }

    #[test]
    fn test_reversed_episode_reaches_impassable_source() {
        let mut grid = NavGrid::new(4, 1);
        grid.set_cell(pos(0, 0), CellType::Blocked);
        let conn = GridConnectivity::new(grid.bounds(), TerrainMobility::new(&grid, MoverClass(0)));
        let mut ep = episode(&conn, pos(3, 0), pos(0, 0), SearchDirection::Reversed);
        assert_eq!(ep.expand_slice(usize::MAX), SearchProgress::Found(pos(0, 0)));
        assert_eq!(ep.route_to(pos(0, 0)).len(), 4);
    }

    #[test]
    fn test_into_layer_returns_storage() {
        let grid = NavGrid::new(4, 4);
        let conn = GridConnectivity::new(grid.bounds(), TerrainMobility::new(&grid, MoverClass(0)));
        let ep = episode(&conn, pos(0, 0), pos(3, 3), SearchDirection::Forward);
        assert_eq!(ep.into_layer().bounds(), grid.bounds());
    }
}
