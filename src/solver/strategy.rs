//! The strategy seam shared by the two search engines.

use crate::{
    error::Result,
    solver::{
        engine::SearchStats,
        grid::{Problem, SolvedGrid},
    },
};

/// A complete search procedure over one problem.
///
/// Both implementations share the grid model, the consistency oracle, and
/// the bounds propagation; they differ in how the cursor moves on failure.
pub trait SearchStrategy: std::fmt::Debug {
    /// Runs the search to exhaustion.
    ///
    /// # Returns
    ///
    /// * `Ok((Some(grid), stats))` when a completion exists.
    /// * `Ok((None, stats))` when the instance is unsatisfiable. An
    ///   unsatisfiable instance is an ordinary outcome, never an error.
    /// * `Err(error)` only for violated solver invariants.
    fn solve(&self, problem: &Problem) -> Result<(Option<SolvedGrid>, SearchStats)>;
}
