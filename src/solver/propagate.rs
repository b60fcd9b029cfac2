//! Two-pass bounds propagation over the sum constraints.
//!
//! Pass A reasons from each constraint's target and already-placed values
//! alone; pass B folds in what the *other* free cells of a constraint can
//! actually contribute given their pass-A intervals. Both passes are sound:
//! no value belonging to a valid completion of the current partial board is
//! ever excluded. Emptiness is a legitimate result and means the branch is
//! dead.

use crate::solver::{
    domain::{Domain, VALUE_MAX},
    grid::{Board, Problem},
};

/// Pass A: per-constraint interval bounds assuming the worst about the other
/// free cells in the line: each could sit at 0 (for this cell's ceiling) or
/// at 9 (for its floor).
///
/// The result is indexed by variable id; variables already placed on the
/// board collapse to the singleton of their value.
pub fn target_bounds(problem: &Problem, board: &Board) -> Vec<Domain> {
    let constraints = problem.constraints();
    let mut fixed_sums = vec![0i32; constraints.len()];
    let mut free_counts = vec![0i32; constraints.len()];
    for (constraint_id, constraint) in constraints.iter().enumerate() {
        for &(row, col) in &constraint.cells {
            match board.value(row, col) {
                Some(digit) => fixed_sums[constraint_id] += i32::from(digit),
                None => free_counts[constraint_id] += 1,
            }
        }
    }

    problem
        .variables()
        .iter()
        .enumerate()
        .map(|(var, &(row, col))| {
            if let Some(digit) = board.value(row, col) {
                return Domain::singleton(i32::from(digit));
            }
            let mut domain = Domain::full();
            for &constraint_id in problem.covering(var) {
                let hi = constraints[constraint_id].target - fixed_sums[constraint_id];
                let lo = hi - VALUE_MAX * (free_counts[constraint_id] - 1);
                domain = domain.intersect(&Domain::new(lo, hi));
            }
            domain
        })
        .collect()
}

/// Pass B: per-constraint bounds recomputed against what the other free
/// cells can actually achieve, i.e. the sums of their pass-A minima and
/// maxima instead of the blanket 0/9 assumption.
///
/// A tightened interval replaces the pass-A one only when it is strictly
/// smaller and non-empty, so the result never widens and an already-empty
/// pass-A domain survives untouched.
pub fn cross_bounds(problem: &Problem, board: &Board, coarse: &[Domain]) -> Vec<Domain> {
    let constraints = problem.constraints();
    let mut fixed_sums = vec![0i32; constraints.len()];
    let mut min_totals = vec![0i32; constraints.len()];
    let mut max_totals = vec![0i32; constraints.len()];
    for (constraint_id, constraint) in constraints.iter().enumerate() {
        for &(row, col) in &constraint.cells {
            match board.value(row, col) {
                Some(digit) => fixed_sums[constraint_id] += i32::from(digit),
                None => {
                    let var = problem
                        .variable_at(row, col)
                        .expect("empty board cell is always a variable");
                    // Free cells whose pass-A domain is already empty
                    // contribute nothing to either total.
                    if let (Some(lo), Some(hi)) = (coarse[var].min(), coarse[var].max()) {
                        min_totals[constraint_id] += lo;
                        max_totals[constraint_id] += hi;
                    }
                }
            }
        }
    }

    let mut result = coarse.to_vec();
    for (var, &(row, col)) in problem.variables().iter().enumerate() {
        if board.value(row, col).is_some() {
            continue;
        }
        let current = coarse[var];
        let (Some(own_min), Some(own_max)) = (current.min(), current.max()) else {
            continue;
        };
        let mut tightened = Domain::full();
        for &constraint_id in problem.covering(var) {
            let others_min = min_totals[constraint_id] - own_min;
            let others_max = max_totals[constraint_id] - own_max;
            let remaining = constraints[constraint_id].target - fixed_sums[constraint_id];
            tightened = tightened.intersect(&Domain::new(
                remaining - others_max,
                remaining - others_min,
            ));
        }
        if !tightened.is_empty() && tightened.len() < current.len() {
            result[var] = tightened;
        }
    }
    result
}

/// Sound per-variable domains for the current partial assignment: pass A
/// followed by pass B.
pub fn pruned_domains(problem: &Problem, board: &Board) -> Vec<Domain> {
    let coarse = target_bounds(problem, board);
    cross_bounds(problem, board, &coarse)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn extreme_targets_pin_whole_lines() {
        // Row 0 must sum to 0 and row 1 to 18, so every domain collapses.
        let problem = Problem::from_parts(
            vec![vec![-1, -1], vec![-1, -1]],
            vec![0, 18],
            vec![9, 9],
            [9, 9],
        )
        .unwrap();
        let board = Board::new(&problem);
        let coarse = target_bounds(&problem, &board);
        assert_eq!(coarse[0], Domain::singleton(0));
        assert_eq!(coarse[1], Domain::singleton(0));
        assert_eq!(coarse[2], Domain::singleton(9));
        assert_eq!(coarse[3], Domain::singleton(9));
    }

    #[test]
    fn fixed_cells_shrink_their_lines() {
        let problem = Problem::from_parts(
            vec![vec![-1, -1, 0], vec![5, -1, 2], vec![-1, -1, -1]],
            vec![10, 8, 9],
            vec![12, 10, 5],
            [9, 3],
        )
        .unwrap();
        let board = Board::new(&problem);
        let coarse = target_bounds(&problem, &board);
        // (1, 1) sits in row 1 (5 + 2 placed, one free cell left: exactly 1),
        // col 1, and both diagonals.
        let centre = problem.variable_at(1, 1).unwrap();
        assert_eq!(coarse[centre], Domain::singleton(1));
        // (0, 0): col 0 allows at most 12 - 5 = 7, and row 0 (target 10, two
        // free cells, a 0 already placed) forces at least 10 - 9 = 1.
        let corner = problem.variable_at(0, 0).unwrap();
        assert_eq!(coarse[corner], Domain::new(1, 7));
    }

    #[test]
    fn cross_pass_only_tightens() {
        let problem = Problem::from_parts(
            vec![vec![-1, -1, 0], vec![5, -1, 2], vec![-1, -1, -1]],
            vec![10, 8, 9],
            vec![12, 10, 5],
            [9, 3],
        )
        .unwrap();
        let board = Board::new(&problem);
        let coarse = target_bounds(&problem, &board);
        let tight = cross_bounds(&problem, &board, &coarse);
        for (var, domain) in tight.iter().enumerate() {
            assert!(domain.is_subset_of(&coarse[var]), "variable {var} widened");
            assert!(coarse[var].is_subset_of(&Domain::full()));
            assert!(!domain.is_empty());
        }
    }

    #[test]
    fn cross_pass_uses_other_cells_reach() {
        // Solvable as [[4, 0], [9, 9]]. Pass A leaves (0, 1) at [0, 4] since
        // only its row constrains it; pass B sees its row partner pinned to
        // exactly 4 and collapses (0, 1) to 0.
        let problem = Problem::from_parts(
            vec![vec![-1, -1], vec![-1, -1]],
            vec![4, 18],
            vec![13, 9],
            [13, 9],
        )
        .unwrap();
        let board = Board::new(&problem);
        let coarse = target_bounds(&problem, &board);
        let tight = cross_bounds(&problem, &board, &coarse);
        let a = problem.variable_at(0, 0).unwrap();
        assert_eq!(coarse[a], Domain::singleton(4));
        let b = problem.variable_at(0, 1).unwrap();
        assert_eq!(coarse[b], Domain::new(0, 4));
        assert_eq!(tight[b], Domain::singleton(0));
    }

    #[test]
    fn unsatisfiable_lines_yield_empty_domains() {
        // Row 0 needs 25 from two cells; nothing in [0, 9] works.
        let problem = Problem::from_parts(
            vec![vec![-1, -1], vec![-1, -1]],
            vec![25, 2],
            vec![13, 14],
            [10, 10],
        )
        .unwrap();
        let board = Board::new(&problem);
        let domains = pruned_domains(&problem, &board);
        let a = problem.variable_at(0, 0).unwrap();
        assert!(domains[a].is_empty());
    }
}
