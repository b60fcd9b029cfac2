//! Chronological backtracking over a dynamically re-sorted frontier.

use tracing::{debug, trace};

use crate::{
    error::{Result, SolverError},
    solver::{
        consistency,
        engine::SearchStats,
        grid::{Board, Placement, Problem, SolvedGrid},
        heuristics::variable::{entanglement, FrontierVar, MostConstrainedOrdering},
        propagate,
        strategy::SearchStrategy,
    },
};

/// Depth-first search with a single cursor into an ordered variable list.
///
/// After every placement or retraction the not-yet-assigned suffix of the
/// frontier is re-propagated and re-sorted: propagation changes domain
/// sizes, so a most-constrained-first order computed once would go stale
/// immediately. The assigned prefix keeps its identity, position, and
/// partially consumed domains.
#[derive(Debug, Default)]
pub struct OrderedBacktracking {
    ordering: MostConstrainedOrdering,
}

impl OrderedBacktracking {
    pub fn new(ordering: MostConstrainedOrdering) -> Self {
        Self { ordering }
    }

    /// Rebuilds frontier positions `keep..` from freshly propagated domains.
    /// Positions below `keep` are left exactly as they are.
    fn refresh_suffix(
        &self,
        problem: &Problem,
        board: &Board,
        frontier: &mut Vec<FrontierVar>,
        keep: usize,
        stats: &mut SearchStats,
    ) {
        stats.propagations += 1;
        let domains = propagate::pruned_domains(problem, board);
        let weights = entanglement(problem, board);

        let mut in_prefix = vec![false; problem.variables().len()];
        for entry in frontier.iter().take(keep) {
            in_prefix[entry.var] = true;
        }

        let mut suffix: Vec<FrontierVar> = problem
            .variables()
            .iter()
            .enumerate()
            .filter(|&(var, &(row, col))| !in_prefix[var] && board.value(row, col).is_none())
            .map(|(var, _)| FrontierVar {
                var,
                domain: domains[var],
                entangled: weights[var],
            })
            .collect();
        self.ordering.sort(&mut suffix);

        frontier.truncate(keep);
        frontier.extend(suffix);
    }
}

impl SearchStrategy for OrderedBacktracking {
    fn solve(&self, problem: &Problem) -> Result<(Option<SolvedGrid>, SearchStats)> {
        let mut stats = SearchStats::default();
        let mut board = Board::new(problem);

        if consistency::is_complete(problem, &board) {
            let solved = completed(&board)?;
            return Ok((Some(solved), stats));
        }

        let mut frontier: Vec<FrontierVar> = Vec::new();
        self.refresh_suffix(problem, &board, &mut frontier, 0, &mut stats);
        let mut trail: Vec<Placement> = Vec::with_capacity(frontier.len());
        let mut cursor = 0usize;

        while cursor < frontier.len() {
            let mut advanced = false;
            while let Some(value) = frontier[cursor].domain.pop_min() {
                stats.nodes_visited += 1;
                let (row, col) = problem.variables()[frontier[cursor].var];
                let placement = board.place(row, col, value as u8);
                trace!(row, col, value, "trying value");

                if consistency::is_complete(problem, &board) {
                    let solved = completed(&board)?;
                    return Ok((Some(solved), stats));
                }
                if consistency::is_consistent(problem, &board) {
                    trail.push(placement);
                    self.refresh_suffix(problem, &board, &mut frontier, cursor + 1, &mut stats);
                    cursor += 1;
                    advanced = true;
                    break;
                }
                board.retract(placement);
            }

            if !advanced {
                // Domain exhausted without a workable value.
                if cursor == 0 {
                    return Ok((None, stats));
                }
                stats.backtracks += 1;
                cursor -= 1;
                let placement = trail.pop().ok_or(SolverError::InternalInconsistency(
                    "backtracked past the start of the assignment trail".into(),
                ))?;
                board.retract(placement);
                debug!(cursor, "backtracking");
                self.refresh_suffix(problem, &board, &mut frontier, cursor + 1, &mut stats);
            }
        }

        // Ran past the last variable without ever completing the grid.
        Ok((None, stats))
    }
}

fn completed(board: &Board) -> Result<SolvedGrid> {
    board
        .to_completed()
        .ok_or(SolverError::InternalInconsistency("complete board still has empty cells".into()).into())
}
