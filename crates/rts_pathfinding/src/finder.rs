//! Path finder: drives search episodes and reconstructs routes.
//!
//! The free functions [`find_path`] and [`find_bidirectional_path`] run
//! caller-built episodes to completion. [`PathFinder`] is the request-level
//! API used by the simulation: it validates endpoints, rules out requests
//! between disconnected regions through its [`ComponentIndex`], recycles
//! node layers through its [`LayerPool`], and picks the search strategy.
//!
//! All failures are encoded in the returned path: an empty path means no
//! route exists or the request was invalid.
//!
//! # Determinism
//!
//! Results depend only on the map, the mobility oracle, and the request.
//! Each episode owns its node layer, frontier ties are broken by position,
//! and neighbors are produced in a fixed order, so interleaving other
//! requests or time-slicing an episode never changes its answer.

use crate::components::ComponentIndex;
use crate::config::PathfinderConfig;
use crate::connectivity::GridConnectivity;
use crate::estimator::CostEstimator;
use crate::grid::{GridBounds, GridPos};
use crate::mobility::{Mobility, MoverClass};
use crate::pool::LayerPool;
use crate::search::{SearchDirection, SearchEpisode, SearchProgress};

/// Ordered cells from source to destination inclusive. Empty = no route.
pub type Path = Vec<GridPos>;

/// Run an episode until its target closes and return the route.
///
/// Returns an empty path if the frontier empties first, and a single-cell
/// path when an origin is the target.
pub fn find_path<M: Mobility>(episode: &mut SearchEpisode<'_, M>) -> Path {
    match episode.expand_slice(usize::MAX) {
        SearchProgress::Found(target) => episode.route_to(target),
        SearchProgress::Pending | SearchProgress::Exhausted => Path::new(),
    }
}

/// Best meeting point seen so far by a bidirectional search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Meeting {
    best: Option<(u64, GridPos)>,
}

impl Meeting {
    fn offer(&mut self, total: u64, pos: GridPos) {
        if self.best.map_or(true, |(best, _)| total < best) {
            self.best = Some((total, pos));
        }
    }

    /// Seed with cells that are already reached by both episodes (shared
    /// origins, e.g. source == destination).
    fn seed<M: Mobility>(forward: &SearchEpisode<'_, M>, reversed: &SearchEpisode<'_, M>) -> Self {
        let mut meeting = Self::default();
        for &origin in forward.origins().iter().chain(reversed.origins()) {
            if let (Some(f), Some(r)) = (forward.cost_so_far(origin), reversed.cost_so_far(origin)) {
                meeting.offer(f + r, origin);
            }
        }
        meeting
    }
}

/// Step the two episodes of a bidirectional search.
///
/// Termination is the lower-bound meeting check: the best combined cost
/// `g_f(n) + g_r(n)` found so far is only accepted once one frontier's
/// smallest estimated total reaches it. Every route not yet seen would pass
/// through an open cell of that frontier and so costs at least as much.
fn step_bidirectional<M: Mobility>(
    forward: &mut SearchEpisode<'_, M>,
    reversed: &mut SearchEpisode<'_, M>,
    meeting: &mut Meeting,
    budget: usize,
) -> SearchProgress {
    let mut spent = 0;
    loop {
        for turn in [SearchDirection::Forward, SearchDirection::Reversed] {
            if let Some((bound, meet)) = meeting.best {
                let forward_done = forward.peek_estimate().map_or(true, |f| f >= bound);
                let reversed_done = reversed.peek_estimate().map_or(true, |r| r >= bound);
                if forward_done || reversed_done {
                    return SearchProgress::Found(meet);
                }
            } else if !forward.can_expand() || !reversed.can_expand() {
                return SearchProgress::Exhausted;
            }

            if spent >= budget {
                return SearchProgress::Pending;
            }
            spent += 1;

            match turn {
                SearchDirection::Forward => {
                    forward.expand_with(|pos, cost| {
                        if let Some(other) = reversed.cost_so_far(pos) {
                            meeting.offer(cost + other, pos);
                        }
                    });
                }
                SearchDirection::Reversed => {
                    reversed.expand_with(|pos, cost| {
                        if let Some(other) = forward.cost_so_far(pos) {
                            meeting.offer(cost + other, pos);
                        }
                    });
                }
            }
        }
    }
}

/// Join the forward half (source..=meet) with the reversed half
/// (meet..=destination).
fn splice<M: Mobility>(
    forward: &SearchEpisode<'_, M>,
    reversed: &SearchEpisode<'_, M>,
    meet: GridPos,
) -> Path {
    let mut path = forward.route_to(meet);
    let tail = reversed.route_to(meet);
    if path.is_empty() || tail.is_empty() {
        return Path::new();
    }
    path.extend_from_slice(&tail[1..]);
    path
}

/// Run a forward and a reversed episode toward each other, alternating one
/// expansion each, and splice their halves at the optimal meeting cell.
///
/// The forward episode must be seeded at the source and target the
/// destination; the reversed one seeded at the destination and target the
/// source. Returns an empty path if either frontier empties before the two
/// searches meet.
pub fn find_bidirectional_path<M: Mobility>(
    forward: &mut SearchEpisode<'_, M>,
    reversed: &mut SearchEpisode<'_, M>,
) -> Path {
    let mut meeting = Meeting::seed(forward, reversed);
    match step_bidirectional(forward, reversed, &mut meeting, usize::MAX) {
        SearchProgress::Found(meet) => splice(forward, reversed, meet),
        SearchProgress::Pending | SearchProgress::Exhausted => Path::new(),
    }
}

/// A bidirectional search that can be advanced a few expansions at a time.
#[derive(Debug)]
pub struct BidirectionalSearch<'c, M> {
    forward: SearchEpisode<'c, M>,
    reversed: SearchEpisode<'c, M>,
    meeting: Meeting,
    outcome: Option<SearchProgress>,
}

impl<'c, M: Mobility> BidirectionalSearch<'c, M> {
    /// Pair a forward and a reversed episode.
    pub fn new(forward: SearchEpisode<'c, M>, reversed: SearchEpisode<'c, M>) -> Self {
        let meeting = Meeting::seed(&forward, &reversed);
        Self {
            forward,
            reversed,
            meeting,
            outcome: None,
        }
    }

    /// Spend up to `budget` expansions (shared by both directions).
    pub fn step(&mut self, budget: usize) -> SearchProgress {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let progress = step_bidirectional(&mut self.forward, &mut self.reversed, &mut self.meeting, budget);
        if progress != SearchProgress::Pending {
            self.outcome = Some(progress);
        }
        progress
    }

    /// Total expansions performed by both episodes.
    pub fn expanded(&self) -> usize {
        self.forward.expanded() + self.reversed.expanded()
    }

    /// The spliced route once the search has finished, empty otherwise.
    pub fn path(&self) -> Path {
        match self.outcome {
            Some(SearchProgress::Found(meet)) => splice(&self.forward, &self.reversed, meet),
            _ => Path::new(),
        }
    }

    /// Split back into the two episodes (to return their layers).
    pub fn into_episodes(self) -> (SearchEpisode<'c, M>, SearchEpisode<'c, M>) {
        (self.forward, self.reversed)
    }
}

/// Validated shape of a request.
enum Request {
    /// Answer known without searching.
    Immediate(Path),
    /// Needs a search.
    Search,
}

/// Request-level path finder for one map.
#[derive(Debug, Clone)]
pub struct PathFinder {
    config: PathfinderConfig,
    estimator: CostEstimator,
    pool: LayerPool,
    components: ComponentIndex,
}

impl PathFinder {
    /// Create a finder for a map of the given bounds.
    #[must_use]
    pub fn new(bounds: GridBounds, config: PathfinderConfig) -> Self {
        Self {
            estimator: config.estimator(),
            config,
            pool: LayerPool::new(bounds),
            components: ComponentIndex::new(bounds),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    /// Bounds of the map served.
    #[must_use]
    pub fn bounds(&self) -> GridBounds {
        self.pool.bounds()
    }

    /// Heuristic used for new episodes.
    #[must_use]
    pub fn estimator(&self) -> CostEstimator {
        self.estimator
    }

    /// Node layer arena.
    #[must_use]
    pub fn pool(&self) -> &LayerPool {
        &self.pool
    }

    /// Reachability labels built so far.
    #[must_use]
    pub fn components(&self) -> &ComponentIndex {
        &self.components
    }

    /// Point the finder at a resized map.
    pub fn rebind(&mut self, bounds: GridBounds) {
        self.pool.rebind(bounds);
        self.components.rebind(bounds);
    }

    /// Forget the reachability labels of one mover class. Call this when
    /// its passable terrain changes.
    pub fn invalidate_components(&mut self, mover: MoverClass) -> bool {
        self.components.invalidate(mover)
    }

    /// Forget all reachability labels.
    pub fn clear_components(&mut self) {
        self.components.clear();
    }

    /// Connectivity provider for a mover, using the configured corner policy
    /// and cell conditions.
    pub fn connectivity<M: Mobility>(&self, mobility: M) -> GridConnectivity<M> {
        GridConnectivity::new(self.bounds(), mobility)
            .with_corner_policy(self.config.corner_policy)
            .with_conditions(self.config.conditions)
    }

    /// Build an episode with a pooled layer.
    pub fn episode<'c, M: Mobility>(
        &mut self,
        connectivity: &'c GridConnectivity<M>,
        origins: &[GridPos],
        target: GridPos,
        direction: SearchDirection,
    ) -> SearchEpisode<'c, M> {
        let mut episode = SearchEpisode::new(self.pool.checkout(), connectivity, self.estimator, direction, target);
        for &origin in origins {
            episode.add_origin(origin);
        }
        episode
    }

    /// Return an episode's layer to the pool. Call this for abandoned
    /// episodes too; dropping them instead is harmless but wastes the layer.
    pub fn release<M: Mobility>(&mut self, episode: SearchEpisode<'_, M>) {
        self.pool.checkin(episode.into_layer());
    }

    fn classify<M: Mobility>(
        &mut self,
        connectivity: &GridConnectivity<M>,
        from: GridPos,
        to: GridPos,
    ) -> Request {
        let bounds = connectivity.bounds();
        if !bounds.contains(from) || !bounds.contains(to) {
            tracing::debug!(%from, %to, "Path request outside map bounds");
            return Request::Immediate(Path::new());
        }
        if from == to {
            return Request::Immediate(vec![from]);
        }
        if !connectivity.is_passable(to) {
            tracing::debug!(%from, %to, "Path request to impassable cell");
            return Request::Immediate(Path::new());
        }
        if let Some(path) = self.adjacent_shortcut(connectivity, from, to) {
            return Request::Immediate(path);
        }
        if !self.may_reach(connectivity, from, to) {
            tracing::debug!(%from, %to, "Path request between disconnected regions");
            return Request::Immediate(Path::new());
        }
        Request::Search
    }

    /// Component check over terrain-only connectivity for the same mover.
    fn may_reach<M: Mobility>(&mut self, connectivity: &GridConnectivity<M>, from: GridPos, to: GridPos) -> bool {
        let terrain = GridConnectivity::new(connectivity.bounds(), connectivity.mobility())
            .with_corner_policy(connectivity.corner_policy());
        self.components.labels_for(&terrain).may_reach(&terrain, from, to)
    }

    /// Direct step between neighbors when no detour could be cheaper.
    ///
    /// Any other route needs at least two steps, the last entering `to` and
    /// the first costing at least the minimum orthogonal cost.
    fn adjacent_shortcut<M: Mobility>(
        &self,
        connectivity: &GridConnectivity<M>,
        from: GridPos,
        to: GridPos,
    ) -> Option<Path> {
        let direct = connectivity.edge_cost(from, to)?;
        let entry = connectivity.entry_cost(to)?;
        let cheapest_detour = u64::from(entry) + u64::from(self.estimator.straight_cost());
        (u64::from(direct) <= cheapest_detour).then(|| vec![from, to])
    }

    fn finish(path: Path, from: GridPos, to: GridPos, expanded: usize) -> Path {
        if path.is_empty() {
            tracing::debug!(%from, %to, expanded, "No path found");
        } else {
            tracing::trace!(%from, %to, expanded, length = path.len(), "Path found");
        }
        path
    }

    /// Unidirectional A* route from `from` to `to`.
    pub fn find_path_between<M: Mobility>(&mut self, from: GridPos, to: GridPos, mobility: M) -> Path {
        let connectivity = self.connectivity(mobility);
        if let Request::Immediate(path) = self.classify(&connectivity, from, to) {
            return path;
        }
        let mut episode = self.episode(&connectivity, &[from], to, SearchDirection::Forward);
        let path = find_path(&mut episode);
        let expanded = episode.expanded();
        self.release(episode);
        let path = Self::finish(path, from, to, expanded);
        check_sane_path(&connectivity, &path, from, to);
        path
    }

    /// Default unit route: bidirectional search from both endpoints.
    pub fn find_unit_path<M: Mobility>(&mut self, from: GridPos, to: GridPos, mobility: M) -> Path {
        let connectivity = self.connectivity(mobility);
        if let Request::Immediate(path) = self.classify(&connectivity, from, to) {
            return path;
        }
        let path = self.bidirectional(&connectivity, from, to);
        check_sane_path(&connectivity, &path, from, to);
        path
    }

    fn bidirectional<M: Mobility>(
        &mut self,
        connectivity: &GridConnectivity<M>,
        from: GridPos,
        to: GridPos,
    ) -> Path {
        let mut forward = self.episode(connectivity, &[from], to, SearchDirection::Forward);
        let mut reversed = self.episode(connectivity, &[to], from, SearchDirection::Reversed);
        let path = find_bidirectional_path(&mut forward, &mut reversed);
        let expanded = forward.expanded() + reversed.expanded();
        self.release(forward);
        self.release(reversed);
        Self::finish(path, from, to, expanded)
    }

    /// Route to `to`, or, if `to` cannot be reached, to the nearest reachable
    /// cell within `radius` (Chebyshev rings, nearest ring first; within a
    /// ring the cheapest route wins).
    ///
    /// Out-of-bounds endpoints give an empty path.
    pub fn find_path_within_radius<M: Mobility>(
        &mut self,
        from: GridPos,
        to: GridPos,
        radius: u32,
        mobility: M,
    ) -> Path {
        let connectivity = self.connectivity(mobility);
        match self.classify(&connectivity, from, to) {
            Request::Immediate(path) if !path.is_empty() => return path,
            Request::Immediate(_) => {
                if !connectivity.bounds().contains(from) || !connectivity.bounds().contains(to) {
                    return Path::new();
                }
            }
            Request::Search => {
                let path = self.bidirectional(&connectivity, from, to);
                if !path.is_empty() {
                    return path;
                }
            }
        }

        for ring in 1..=radius {
            if from.chebyshev_distance(to) == ring {
                return vec![from];
            }
            let mut candidates = Vec::new();
            for cell in ring_cells(to, ring) {
                if connectivity.is_passable(cell) && self.may_reach(&connectivity, from, cell) {
                    candidates.push(cell);
                }
            }
            if candidates.is_empty() {
                continue;
            }
            let mut episode = self.episode(&connectivity, &candidates, from, SearchDirection::Reversed);
            let path = find_path(&mut episode);
            self.release(episode);
            if !path.is_empty() {
                tracing::trace!(%from, %to, ring, substitute = ?path.last(), "Relaxed path found");
                return path;
            }
        }

        tracing::debug!(%from, %to, radius, "No reachable cell within radius");
        Path::new()
    }

    /// [`find_path_within_radius`](Self::find_path_within_radius) with the
    /// configured `search_radius`.
    pub fn find_path_near<M: Mobility>(&mut self, from: GridPos, to: GridPos, mobility: M) -> Path {
        self.find_path_within_radius(from, to, self.config.search_radius, mobility)
    }

    /// Start a time-sliced unidirectional search.
    ///
    /// Returns `Err(path)` when the answer is known without searching
    /// (invalid endpoints, same cell, or adjacent cells).
    pub fn begin_search<'c, M: Mobility>(
        &mut self,
        connectivity: &'c GridConnectivity<M>,
        from: GridPos,
        to: GridPos,
    ) -> Result<SearchEpisode<'c, M>, Path> {
        match self.classify(connectivity, from, to) {
            Request::Immediate(path) => Err(path),
            Request::Search => Ok(self.episode(connectivity, &[from], to, SearchDirection::Forward)),
        }
    }

    /// Advance a time-sliced search by the configured slice budget.
    pub fn resume<M: Mobility>(&self, episode: &mut SearchEpisode<'_, M>) -> SearchProgress {
        episode.expand_slice(self.config.slice_budget)
    }
}

/// Cells at exactly Chebyshev distance `ring` from `center`, row-major.
/// Cells whose coordinates would overflow `i32` are skipped.
fn ring_cells(center: GridPos, ring: u32) -> impl Iterator<Item = GridPos> {
    let r = i32::try_from(ring).unwrap_or(i32::MAX);
    (-r..=r).flat_map(move |dy| {
        (-r..=r).filter_map(move |dx| {
            if dx.abs() != r && dy.abs() != r {
                return None;
            }
            Some(GridPos::new(center.x.checked_add(dx)?, center.y.checked_add(dy)?))
        })
    })
}

#[cfg(feature = "debug-validation")]
fn check_sane_path<M: Mobility>(connectivity: &GridConnectivity<M>, path: &[GridPos], from: GridPos, to: GridPos) {
    if path.is_empty() {
        return;
    }
    assert_eq!(path.first(), Some(&from), "path sanity check failed: doesn't come from src");
    assert_eq!(path.last(), Some(&to), "path sanity check failed: doesn't go to dest");
    assert!(
        connectivity.path_cost(path).is_some(),
        "path sanity check failed: non-adjacent step"
    );
}

#[cfg(not(feature = "debug-validation"))]
#[inline]
fn check_sane_path<M: Mobility>(_: &GridConnectivity<M>, _: &[GridPos], _: GridPos, _: GridPos) {}
