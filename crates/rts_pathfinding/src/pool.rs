//! Node-record layers and the arena that recycles them.
//!
//! Every search episode needs one record per map cell. Allocating and
//! clearing a full layer for each request is the dominant cost of short
//! searches, so layers are checked out of a [`LayerPool`] and handed back
//! when the episode ends. Resetting a layer is O(1): each slot carries the
//! generation stamp it was written under, and stale slots read as
//! unvisited.

use crate::grid::{GridBounds, GridPos};

/// Search state of one cell within an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeStatus {
    /// Not reached yet.
    #[default]
    Unvisited,
    /// Discovered, waiting in the frontier.
    Open,
    /// Expanded; its cost-so-far is final.
    Closed,
}

/// Per-cell scratch state for one search episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRecord {
    /// Cheapest known cost from the episode's origin.
    pub cost_so_far: u64,
    /// `cost_so_far` plus the heuristic estimate to the target.
    pub estimated_total: u64,
    /// Previous cell on the cheapest known route. Origins point at themselves.
    pub predecessor: GridPos,
    /// Lifecycle state.
    pub status: NodeStatus,
}

impl NodeRecord {
    /// Record of a cell the episode has not touched.
    pub const UNVISITED: Self = Self {
        cost_so_far: u64::MAX,
        estimated_total: u64::MAX,
        predecessor: GridPos::new(i32::MIN, i32::MIN),
        status: NodeStatus::Unvisited,
    };
}

impl Default for NodeRecord {
    fn default() -> Self {
        Self::UNVISITED
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    stamp: u32,
    record: NodeRecord,
}

/// Dense per-cell record storage sized to one map.
#[derive(Debug, Clone)]
pub struct NodeLayer {
    bounds: GridBounds,
    stamp: u32,
    slots: Vec<Slot>,
}

impl NodeLayer {
    /// Allocate a layer with every cell unvisited.
    #[must_use]
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            stamp: 1,
            slots: vec![
                Slot {
                    stamp: 0,
                    record: NodeRecord::UNVISITED,
                };
                bounds.cell_count()
            ],
        }
    }

    /// Bounds of the map this layer was sized for.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Mark every cell unvisited.
    pub fn reset(&mut self) {
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            // Stamp wrapped: old slots could alias the new generation.
            for slot in &mut self.slots {
                slot.stamp = 0;
            }
            self.stamp = 1;
        }
    }

    /// Record for a cell. Out-of-bounds cells read as unvisited.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: GridPos) -> NodeRecord {
        match self.bounds.index_of(pos) {
            Some(i) if self.slots[i].stamp == self.stamp => self.slots[i].record,
            _ => NodeRecord::UNVISITED,
        }
    }

    /// Overwrite the record for a cell. Returns `false` if out of bounds.
    #[inline]
    pub fn set(&mut self, pos: GridPos, record: NodeRecord) -> bool {
        match self.bounds.index_of(pos) {
            Some(i) => {
                self.slots[i] = Slot {
                    stamp: self.stamp,
                    record,
                };
                true
            }
            None => false,
        }
    }
}

/// Recycles node layers for one map.
///
/// The pool is an explicit value owned by whoever issues path requests
/// (normally a [`PathFinder`](crate::finder::PathFinder)). Layers sized for a
/// different map are dropped on check-in.
#[derive(Debug, Clone)]
pub struct LayerPool {
    bounds: GridBounds,
    free: Vec<NodeLayer>,
    max_pooled: usize,
}

impl LayerPool {
    /// Default number of idle layers kept around. Bidirectional searches use
    /// two at a time.
    pub const DEFAULT_MAX_POOLED: usize = 4;

    /// Create an empty pool for a map.
    #[must_use]
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            free: Vec::new(),
            max_pooled: Self::DEFAULT_MAX_POOLED,
        }
    }

    /// Bounds of the map served by this pool.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Number of idle layers.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    /// Take a clean layer, allocating if none is idle.
    pub fn checkout(&mut self) -> NodeLayer {
        match self.free.pop() {
            Some(mut layer) => {
                layer.reset();
                layer
            }
            None => NodeLayer::new(self.bounds),
        }
    }

    /// Return a layer for reuse.
    pub fn checkin(&mut self, layer: NodeLayer) {
        if layer.bounds() != self.bounds {
            tracing::debug!(
                layer_width = layer.bounds().width,
                layer_height = layer.bounds().height,
                "Discarding pooled node layer of wrong size"
            );
            return;
        }
        if self.free.len() < self.max_pooled {
            self.free.push(layer);
        }
    }

    /// Switch the pool to a different map, dropping all idle layers.
    pub fn rebind(&mut self, bounds: GridBounds) {
        if bounds != self.bounds {
            self.bounds = bounds;
            self.free.clear();
        }
    }
}
