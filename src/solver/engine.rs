use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::{Result, SolverError},
    solver::{
        consistency,
        grid::{Problem, SolvedGrid},
        strategy::SearchStrategy,
    },
};

pub type VariableId = usize;
pub type ConstraintId = usize;

/// Counters accumulated over one solve.
#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    /// Trial assignments made.
    pub nodes_visited: u64,
    /// Times the cursor moved backwards.
    pub backtracks: u64,
    /// Backtracks that skipped over at least one intermediate variable
    /// (conflict-directed backjumping only).
    pub backjumps: u64,
    /// Full propagation sweeps over the frontier.
    pub propagations: u64,
    /// Per-constraint pruning counters, where the strategy tracks them.
    pub constraint_stats: HashMap<ConstraintId, PerConstraintStats>,
}

#[derive(Clone, Debug, Default)]
pub struct PerConstraintStats {
    pub revisions: u64,
    pub prunings: u64,
    pub time_spent_micros: u64,
}

/// The front door for a solve.
///
/// Wraps a [`SearchStrategy`] and re-checks any grid it returns against the
/// consistency oracle before handing it out: a strategy that produces a grid
/// failing its own constraints is a solver bug, not a bad instance.
pub struct SolverEngine {
    strategy: Box<dyn SearchStrategy>,
}

impl SolverEngine {
    pub fn new(strategy: Box<dyn SearchStrategy>) -> Self {
        Self { strategy }
    }

    /// Attempts to complete the grid.
    ///
    /// # Returns
    ///
    /// * `Ok((Some(grid), stats))` if a completion satisfying every row,
    ///   column, and diagonal target was found.
    /// * `Ok((None, stats))` if the instance is proven unsatisfiable.
    /// * `Err(error)` if a solver invariant was violated.
    pub fn solve(&self, problem: &Problem) -> Result<(Option<SolvedGrid>, SearchStats)> {
        let (outcome, stats) = self.strategy.solve(problem)?;
        if let Some(solved) = &outcome {
            if !consistency::verify_solution(problem, solved) {
                return Err(SolverError::InternalInconsistency(format!(
                    "strategy {:?} returned a grid that fails its constraints",
                    self.strategy
                ))
                .into());
            }
        }
        debug!(
            nodes = stats.nodes_visited,
            backtracks = stats.backtracks,
            solved = outcome.is_some(),
            "search finished"
        );
        Ok((outcome, stats))
    }
}
