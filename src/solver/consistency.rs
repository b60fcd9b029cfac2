//! The correctness oracle for partial and complete boards.
//!
//! Bounds propagation and ordering heuristics only steer the search; these
//! checks are what actually admits or rejects an assignment.

use crate::solver::grid::{Board, Cell, Problem, SolvedGrid};

/// `true` if no constraint is already violated by the partial assignment:
/// every constraint's accumulated sum stays at or below its target. A full
/// board delegates to [`is_complete`].
pub fn is_consistent(problem: &Problem, board: &Board) -> bool {
    if board.free_cells() == 0 {
        return is_complete(problem, board);
    }
    for constraint in problem.constraints() {
        let mut sum = 0i32;
        let mut open = false;
        for &(row, col) in &constraint.cells {
            match board.value(row, col) {
                Some(digit) => sum += i32::from(digit),
                None => open = true,
            }
        }
        if sum > constraint.target {
            return false;
        }
        if !open && sum != constraint.target {
            return false;
        }
    }
    true
}

/// `true` if the board has no empty cells and every constraint's sum equals
/// its target exactly.
pub fn is_complete(problem: &Problem, board: &Board) -> bool {
    for constraint in problem.constraints() {
        let mut sum = 0i32;
        for &(row, col) in &constraint.cells {
            match board.value(row, col) {
                Some(digit) => sum += i32::from(digit),
                None => return false,
            }
        }
        if sum != constraint.target {
            return false;
        }
    }
    true
}

/// Mirrors the external checker: the completed grid keeps every fixed cell,
/// stays within the digit range, and meets every target exactly.
pub fn verify_solution(problem: &Problem, solved: &SolvedGrid) -> bool {
    let n = problem.n();
    if solved.n() != n {
        return false;
    }
    for row in 0..n {
        for col in 0..n {
            if let Cell::Fixed(digit) = problem.grid().cell(row, col) {
                if solved.value(row, col) != digit {
                    return false;
                }
            }
            if solved.value(row, col) > 9 {
                return false;
            }
        }
    }
    for constraint in problem.constraints() {
        let sum: i32 = constraint
            .cells
            .iter()
            .map(|&(row, col)| i32::from(solved.value(row, col)))
            .sum();
        if sum != constraint.target {
            return false;
        }
    }
    true
}
