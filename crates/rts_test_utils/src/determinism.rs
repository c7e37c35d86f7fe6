//! Determinism testing utilities.
//!
//! Provides a harness for verifying that path requests produce identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Paths feed lockstep unit movement, so every client must compute the same
//! route. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   Costs are integers and the diagonal factor is fixed-point.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Search order never depends on hash map iteration.
//!
//! - **Leaked scratch state**: pooled node layers and cached results must
//!   not make a request's answer depend on the requests before it.
//!
//! # Test Levels
//!
//! 1. **Repeat runs**: the same request on fresh finders
//! 2. **Sequences**: the same request stream on finders with warm pools
//! 3. **Parallel runs**: independent finders on several threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use rts_pathfinding::finder::Path;
use rts_pathfinding::grid::GridPos;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps performed per run.
    pub steps: u64,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>, steps: u64) -> Self {
        Self {
            is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
            hashes,
            steps,
        }
    }

    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Pathfinding is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stateful process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the process
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```
/// use rts_pathfinding::prelude::*;
/// use rts_test_utils::determinism::{compute_hash, verify_determinism};
///
/// let grid = NavGrid::new(16, 16);
/// let result = verify_determinism(
///     3,
///     10,
///     || (PathFinder::new(grid.bounds(), PathfinderConfig::default()), Vec::new()),
///     |(finder, paths)| {
///         let n = i32::try_from(paths.len()).unwrap();
///         let mobility = TerrainMobility::new(&grid, MoverClass(0));
///         paths.push(finder.find_unit_path(GridPos::new(0, n), GridPos::new(15, 15 - n), mobility));
///     },
///     |(_, paths)| compute_hash(paths),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    DeterminismResult::from_hashes(hashes, steps)
}

/// Run one query repeatedly and verify it always returns the same path.
///
/// `query` should build whatever it needs from scratch, so each run sees a
/// fresh finder.
pub fn verify_query_determinism<F>(runs: usize, query: F) -> DeterminismResult
where
    F: Fn() -> Path,
{
    let hashes = (0..runs).map(|_| compute_hash(&query())).collect();
    DeterminismResult::from_hashes(hashes, 1)
}

/// Run one query on `threads` threads at once and collect the path hashes.
///
/// This is useful for catching non-determinism that only manifests under
/// thread scheduling variations, memory layout differences, etc.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_queries<F>(threads: usize, query: F) -> DeterminismResult
where
    F: Fn() -> Path + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| s.spawn(|| compute_hash(&query())))
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    DeterminismResult::from_hashes(hashes, 1)
}

/// Feed the same request stream to two independently built solvers and
/// report the index of the first request whose answers differ.
///
/// `make_solver` is called twice; each solver keeps its own state (pools,
/// caches) across the stream.
pub fn find_first_divergence<Make, Solver>(
    requests: &[(GridPos, GridPos)],
    make_solver: Make,
) -> Option<usize>
where
    Make: Fn() -> Solver,
    Solver: FnMut(GridPos, GridPos) -> Path,
{
    let mut first = make_solver();
    let mut second = make_solver();

    requests
        .iter()
        .position(|&(from, to)| first(from, to) != second(from, to))
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
