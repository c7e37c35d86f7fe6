//! # RTS Pathfinding
//!
//! Deterministic grid pathfinding for lockstep RTS simulations.
//!
//! This crate contains **only** deterministic logic:
//! - No IO
//! - No system randomness
//! - No floating-point math (costs are integers, `sqrt(2)` is fixed-point)
//!
//! Given the same map, mobility rules, and request, every operation returns
//! the same result on every client.
//!
//! ## Crate Structure
//!
//! - [`grid`] - Cell coordinates, map bounds, terrain grid
//! - [`mobility`] - Per-mover passability and cost oracles
//! - [`connectivity`] - 8-directional neighbours and edge costs
//! - [`components`] - Per-mover reachability labels
//! - [`estimator`] - Octile distance heuristic
//! - [`search`] - Resumable A* episodes (forward and reversed)
//! - [`finder`] - Path requests: A*, bidirectional, relaxed radius
//! - [`cache`] - Age-limited path memoization
//! - [`raycast`] - Grid ray tracing and path smoothing
//! - [`pool`] - Node layer arena
//! - [`config`] - RON configuration
//! - [`math`] - Fixed-point math utilities
//!
//! ## Example
//!
//! ```
//! use rts_pathfinding::prelude::*;
//!
//! let mut grid = NavGrid::new(16, 16);
//! grid.fill_rect(GridPos::new(8, 0), GridPos::new(8, 12), CellType::Blocked);
//!
//! let mut finder = PathFinder::new(grid.bounds(), PathfinderConfig::default());
//! let path = finder.find_unit_path(
//!     GridPos::new(2, 2),
//!     GridPos::new(14, 2),
//!     TerrainMobility::new(&grid, MoverClass(0)),
//! );
//! assert_eq!(path.first(), Some(&GridPos::new(2, 2)));
//! assert_eq!(path.last(), Some(&GridPos::new(14, 2)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod cache;
pub mod components;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod estimator;
pub mod finder;
pub mod grid;
pub mod math;
pub mod mobility;
pub mod pool;
pub mod raycast;
pub mod search;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CachedPathFinder, PathCache, PathCacheKey, PathQuery};
    pub use crate::components::{ComponentIndex, ComponentMap};
    pub use crate::config::{PathCacheConfig, PathfinderConfig};
    pub use crate::connectivity::{CornerPolicy, GridConnectivity};
    pub use crate::error::{PathfindingError, Result};
    pub use crate::estimator::CostEstimator;
    pub use crate::finder::{
        find_bidirectional_path, find_path, BidirectionalSearch, Path, PathFinder,
    };
    pub use crate::grid::{CellType, Cost, Direction, GridBounds, GridPos, NavGrid};
    pub use crate::math::Fixed;
    pub use crate::mobility::{
        CellConditions, FnMobility, Mobility, MoverClass, TerrainCosts, TerrainMobility,
    };
    pub use crate::pool::LayerPool;
    pub use crate::raycast::{has_line_of_sight, smooth_path, trace, RayTrace};
    pub use crate::search::{SearchDirection, SearchEpisode, SearchProgress};
}
