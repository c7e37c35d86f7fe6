//! Short-lived path memoization.
//!
//! Units issued the same order tend to request the same path within a few
//! ticks of each other. The cache keeps results (including "no path") for a
//! bounded number of ticks and a bounded number of entries. Eviction is by
//! insertion order, not by use.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::{PathCacheConfig, PathfinderConfig};
use crate::finder::{Path, PathFinder};
use crate::grid::{GridBounds, GridPos};
use crate::mobility::{Mobility, MoverClass};

/// Which finder operation produced a cached path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathQuery {
    /// Unidirectional search.
    Direct,
    /// Bidirectional search (the default unit route).
    Bidirectional,
    /// Relaxed search accepting a substitute within the given radius.
    WithinRadius(u32),
}

/// Identity of a path request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathCacheKey {
    /// Traversal class of the requesting mover.
    pub mover: MoverClass,
    /// Source cell.
    pub from: GridPos,
    /// Requested destination.
    pub to: GridPos,
    /// Operation used.
    pub query: PathQuery,
}

#[derive(Debug, Clone)]
struct CachedPath {
    path: Path,
    tick: u64,
    serial: u64,
}

/// Bounded, age-limited path store.
#[derive(Debug, Clone)]
pub struct PathCache {
    config: PathCacheConfig,
    entries: HashMap<PathCacheKey, CachedPath>,
    /// Insertion order. Entries replaced or removed since leave stale
    /// markers here, recognised by a serial mismatch.
    order: VecDeque<(PathCacheKey, u64)>,
    next_serial: u64,
}

impl PathCache {
    /// Create an empty cache. A capacity of zero is treated as one.
    #[must_use]
    pub fn new(config: PathCacheConfig) -> Self {
        Self {
            config: PathCacheConfig {
                capacity: config.capacity.max(1),
                ..config
            },
            entries: HashMap::new(),
            order: VecDeque::new(),
            next_serial: 0,
        }
    }

    /// Active limits.
    #[must_use]
    pub fn config(&self) -> PathCacheConfig {
        self.config
    }

    /// Number of stored paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_stale(&self, stored: u64, tick: u64) -> bool {
        tick.saturating_sub(stored) > self.config.max_age_ticks
    }

    /// Fetch a stored path. A stale entry is dropped and reported as a miss.
    pub fn lookup(&mut self, key: &PathCacheKey, tick: u64) -> Option<&[GridPos]> {
        let stored = self.entries.get(key)?.tick;
        if self.is_stale(stored, tick) {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.path.as_slice())
    }

    /// Store a path computed at `tick`.
    ///
    /// Stale entries are purged first; then, while over capacity, the oldest
    /// insertions are evicted.
    pub fn store(&mut self, key: PathCacheKey, path: Path, tick: u64) {
        self.evict_expired(tick);

        let serial = self.next_serial;
        self.next_serial += 1;
        self.entries.insert(key, CachedPath { path, tick, serial });
        self.order.push_back((key, serial));

        let mut evicted = 0usize;
        while self.entries.len() > self.config.capacity {
            let Some((oldest, serial)) = self.order.pop_front() else {
                break;
            };
            if self.entries.get(&oldest).is_some_and(|e| e.serial == serial) {
                self.entries.remove(&oldest);
                evicted += 1;
            }
        }
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.entries.len(), "Path cache over capacity");
        }
        self.compact_order();
    }

    /// Drop every entry older than the age limit.
    pub fn evict_expired(&mut self, tick: u64) -> usize {
        let max_age = self.config.max_age_ticks;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| tick.saturating_sub(entry.tick) <= max_age);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, tick, "Expired cached paths");
        }
        evicted
    }

    /// Drop every entry for one mover class, e.g. after its rules changed.
    pub fn invalidate_mover(&mut self, mover: MoverClass) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.mover != mover);
        before - self.entries.len()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn compact_order(&mut self) {
        if self.order.len() <= 2 * self.config.capacity + 16 {
            return;
        }
        let entries = &self.entries;
        self.order
            .retain(|(key, serial)| entries.get(key).is_some_and(|e| e.serial == *serial));
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(PathCacheConfig::default())
    }
}

/// A [`PathFinder`] that memoizes results per mover class.
///
/// Cached answers and the finder's reachability labels are only valid while
/// the map and the class's rules are unchanged; call
/// [`invalidate_mover`](Self::invalidate_mover) or
/// [`clear_cache`](Self::clear_cache) when they change.
#[derive(Debug, Clone)]
pub struct CachedPathFinder {
    finder: PathFinder,
    cache: PathCache,
}

impl CachedPathFinder {
    /// Create a finder and cache from one configuration.
    #[must_use]
    pub fn new(bounds: GridBounds, config: PathfinderConfig) -> Self {
        Self {
            cache: PathCache::new(config.cache),
            finder: PathFinder::new(bounds, config),
        }
    }

    /// The wrapped finder.
    #[must_use]
    pub fn finder(&self) -> &PathFinder {
        &self.finder
    }

    /// Mutable access to the wrapped finder (uncached requests, time slicing).
    pub fn finder_mut(&mut self) -> &mut PathFinder {
        &mut self.finder
    }

    /// The cache.
    #[must_use]
    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    /// Drop cached paths and reachability labels for one mover class.
    /// Returns the number of paths dropped.
    pub fn invalidate_mover(&mut self, mover: MoverClass) -> usize {
        self.finder.invalidate_components(mover);
        self.cache.invalidate_mover(mover)
    }

    /// Drop all cached paths and reachability labels.
    pub fn clear_cache(&mut self) {
        self.finder.clear_components();
        self.cache.clear();
    }

    fn memoized<M, F>(&mut self, key: PathCacheKey, tick: u64, mobility: M, compute: F) -> Path
    where
        M: Mobility,
        F: FnOnce(&mut PathFinder, M) -> Path,
    {
        if let Some(path) = self.cache.lookup(&key, tick) {
            tracing::trace!(from = %key.from, to = %key.to, "Path cache hit");
            return path.to_vec();
        }
        let path = compute(&mut self.finder, mobility);
        self.cache.store(key, path.clone(), tick);
        path
    }

    /// Cached [`PathFinder::find_unit_path`].
    pub fn find_unit_path<M: Mobility>(
        &mut self,
        from: GridPos,
        to: GridPos,
        mobility: M,
        tick: u64,
    ) -> Path {
        let key = PathCacheKey {
            mover: mobility.class(),
            from,
            to,
            query: PathQuery::Bidirectional,
        };
        self.memoized(key, tick, mobility, |finder, m| finder.find_unit_path(from, to, m))
    }

    /// Cached [`PathFinder::find_path_between`].
    pub fn find_path_between<M: Mobility>(
        &mut self,
        from: GridPos,
        to: GridPos,
        mobility: M,
        tick: u64,
    ) -> Path {
        let key = PathCacheKey {
            mover: mobility.class(),
            from,
            to,
            query: PathQuery::Direct,
        };
        self.memoized(key, tick, mobility, |finder, m| finder.find_path_between(from, to, m))
    }

    /// Cached [`PathFinder::find_path_within_radius`].
    pub fn find_path_within_radius<M: Mobility>(
        &mut self,
        from: GridPos,
        to: GridPos,
        radius: u32,
        mobility: M,
        tick: u64,
    ) -> Path {
        let key = PathCacheKey {
            mover: mobility.class(),
            from,
            to,
            query: PathQuery::WithinRadius(radius),
        };
        self.memoized(key, tick, mobility, |finder, m| {
            finder.find_path_within_radius(from, to, radius, m)
        })
    }

    /// Cached [`PathFinder::find_path_near`].
    pub fn find_path_near<M: Mobility>(&mut self, from: GridPos, to: GridPos, mobility: M, tick: u64) -> Path {
        let radius = self.finder.config().search_radius;
        self.find_path_within_radius(from, to, radius, mobility, tick)
    }
}
