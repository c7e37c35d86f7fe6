//! Engine configuration.
//!
//! Configuration is plain data, loadable from RON like the rest of the game
//! data. Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```
//! use rts_pathfinding::config::PathfinderConfig;
//!
//! let config = PathfinderConfig::from_ron_str("(slice_budget: 64)").unwrap();
//! assert_eq!(config.slice_budget, 64);
//! assert_eq!(config.cache.capacity, 1000);
//! ```

use serde::{Deserialize, Serialize};

use crate::connectivity::CornerPolicy;
use crate::error::{PathfindingError, Result};
use crate::estimator::CostEstimator;
use crate::grid::{Cost, BASE_CELL_COST};
use crate::mobility::CellConditions;

/// Path cache limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PathCacheConfig {
    /// Maximum number of stored paths.
    pub capacity: usize,
    /// Ticks after which a stored path is stale.
    pub max_age_ticks: u64,
}

impl Default for PathCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            max_age_ticks: 50,
        }
    }
}

/// Pathfinder tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfinderConfig {
    /// Rule for diagonal moves past blocked corners.
    pub corner_policy: CornerPolicy,
    /// Transient obstacles honoured by the mobility oracle.
    pub conditions: CellConditions,
    /// Cheapest orthogonal step cost on any map this finder serves. Used by
    /// the heuristic, so it must not exceed any real step cost.
    pub orthogonal_cost: Cost,
    /// Heuristic inflation in permille. `1000` keeps results optimal.
    pub heuristic_inflation_permille: u32,
    /// Expansions per [`resume`](crate::finder::PathFinder::resume) call.
    pub slice_budget: usize,
    /// Default radius for relaxed requests.
    pub search_radius: u32,
    /// Path cache limits.
    pub cache: PathCacheConfig,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            corner_policy: CornerPolicy::Lenient,
            conditions: CellConditions::None,
            orthogonal_cost: BASE_CELL_COST,
            heuristic_inflation_permille: 1000,
            slice_budget: 256,
            search_radius: 5,
            cache: PathCacheConfig::default(),
        }
    }
}

impl PathfinderConfig {
    /// Parse and validate a RON config.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron).map_err(|e| PathfindingError::ConfigParse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Encode as pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| {
            PathfindingError::ConfigSerialize {
                message: e.to_string(),
            }
        })
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.orthogonal_cost == 0 {
            return Err(PathfindingError::InvalidConfig(
                "orthogonal_cost must be positive".to_string(),
            ));
        }
        if self.heuristic_inflation_permille < 1000 {
            return Err(PathfindingError::InvalidConfig(format!(
                "heuristic_inflation_permille must be at least 1000, got {}",
                self.heuristic_inflation_permille
            )));
        }
        if self.slice_budget == 0 {
            return Err(PathfindingError::InvalidConfig(
                "slice_budget must be positive".to_string(),
            ));
        }
        if self.cache.capacity == 0 {
            return Err(PathfindingError::InvalidConfig(
                "cache.capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Heuristic matching this configuration.
    #[must_use]
    pub fn estimator(&self) -> CostEstimator {
        CostEstimator::new(self.orthogonal_cost)
            .with_inflation_permille(self.heuristic_inflation_permille)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PathfinderConfig::default();
        assert_eq!(config.corner_policy, CornerPolicy::Lenient);
        assert_eq!(config.orthogonal_cost, 100);
        assert_eq!(config.heuristic_inflation_permille, 1000);
        assert_eq!(config.cache.capacity, 1000);
        assert_eq!(config.cache.max_age_ticks, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = PathfinderConfig::from_ron_str(
            "(corner_policy: Strict, cache: (max_age_ticks: 10), search_radius: 3)",
        )
        .unwrap();
        assert_eq!(config.corner_policy, CornerPolicy::Strict);
        assert_eq!(config.cache.max_age_ticks, 10);
        assert_eq!(config.cache.capacity, 1000);
        assert_eq!(config.search_radius, 3);
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = PathfinderConfig {
            conditions: CellConditions::TransientActors,
            heuristic_inflation_permille: 1001,
            ..PathfinderConfig::default()
        };
        let text = config.to_ron_string().unwrap();
        assert_eq!(PathfinderConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let err = PathfinderConfig::from_ron_str("(slice_budget: \"lots\")").unwrap_err();
        assert!(matches!(err, PathfindingError::ConfigParse { .. }));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for ron in [
            "(orthogonal_cost: 0)",
            "(heuristic_inflation_permille: 999)",
            "(slice_budget: 0)",
            "(cache: (capacity: 0))",
        ] {
            let err = PathfinderConfig::from_ron_str(ron).unwrap_err();
            assert!(matches!(err, PathfindingError::InvalidConfig(_)), "{ron}");
        }
    }

    #[test]
    fn test_estimator_follows_config() {
        let config = PathfinderConfig {
            orthogonal_cost: 10,
            ..PathfinderConfig::default()
        };
        let est = config.estimator();
        assert_eq!(est.straight_cost(), 10);
        assert_eq!(est.diagonal_cost(), 14);
    }
}
