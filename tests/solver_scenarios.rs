//! End-to-end scenarios through the engine front door, exercised with both
//! search strategies.

use pretty_assertions::assert_eq;
use serde::Deserialize;
use summa::solver::{
    consistency::verify_solution,
    engine::{SearchStats, SolverEngine},
    grid::{Problem, SolvedGrid},
    stats::render_stats_table,
    strategies::{backjumping::ConflictDirectedBackjumping, backtracking::OrderedBacktracking},
    strategy::SearchStrategy,
};

fn engines() -> Vec<SolverEngine> {
    let _ = tracing_subscriber::fmt::try_init();
    vec![
        SolverEngine::new(Box::new(OrderedBacktracking::default())),
        SolverEngine::new(Box::new(ConflictDirectedBackjumping::default())),
    ]
}

fn solve_with_each(problem: &Problem) -> Vec<(Option<SolvedGrid>, SearchStats)> {
    engines()
        .iter()
        .map(|engine| engine.solve(problem).expect("no invariant violations"))
        .collect()
}

#[test]
fn fully_free_three_by_three_is_completed_by_both_strategies() {
    let problem = Problem::from_parts(
        vec![vec![-1; 3]; 3],
        vec![10, 8, 9],
        vec![12, 10, 5],
        [9, 3],
    )
    .unwrap();
    for (outcome, _stats) in solve_with_each(&problem) {
        let solved = outcome.expect("instance is satisfiable");
        assert!(verify_solution(&problem, &solved));
        for row in 0..3 {
            for col in 0..3 {
                assert!(solved.value(row, col) <= 9);
            }
        }
    }
}

#[test]
fn partially_fixed_grid_keeps_its_givens() {
    let problem = Problem::from_parts(
        vec![vec![-1, -1, 0], vec![5, -1, 2], vec![-1, -1, -1]],
        vec![10, 8, 9],
        vec![12, 10, 5],
        [9, 3],
    )
    .unwrap();
    for (outcome, _stats) in solve_with_each(&problem) {
        let solved = outcome.expect("instance is satisfiable");
        assert!(verify_solution(&problem, &solved));
        assert_eq!(solved.value(0, 2), 0);
        assert_eq!(solved.value(1, 0), 5);
        assert_eq!(solved.value(1, 2), 2);
    }
}

#[test]
fn contradictory_totals_are_unsatisfiable_for_both_strategies() {
    // Row targets total 27, column targets total 28: no grid can do both.
    let problem = Problem::from_parts(
        vec![vec![-1, -1, 0], vec![5, -1, 2], vec![-1, -1, -1]],
        vec![10, 8, 9],
        vec![12, 10, 6],
        [9, 3],
    )
    .unwrap();
    for (outcome, _stats) in solve_with_each(&problem) {
        assert_eq!(outcome, None);
    }
}

#[test]
fn single_fixed_cell_grid_is_trivially_solvable() {
    let problem = Problem::from_parts(vec![vec![7]], vec![7], vec![7], [7, 7]).unwrap();
    for (outcome, _stats) in solve_with_each(&problem) {
        assert_eq!(outcome.unwrap().rows(), vec![vec![7]]);
    }
}

#[test]
fn strategies_agree_and_solutions_interchange() {
    let problem = Problem::from_parts(
        vec![vec![-1, -1, -1], vec![-1, 1, -1], vec![-1, -1, -1]],
        vec![10, 8, 9],
        vec![12, 10, 5],
        [9, 3],
    )
    .unwrap();
    let results = solve_with_each(&problem);
    let solvable: Vec<bool> = results
        .iter()
        .map(|(outcome, _stats)| outcome.is_some())
        .collect();
    assert_eq!(solvable, vec![true, true]);
    // Different strategies may return different completions; each must pass
    // the same oracle.
    for (outcome, _stats) in &results {
        assert!(verify_solution(&problem, outcome.as_ref().unwrap()));
    }
}

#[test]
fn backjumping_stats_render_as_a_table() {
    let problem = Problem::from_parts(
        vec![vec![-1, -1, 0], vec![5, -1, 2], vec![-1, -1, -1]],
        vec![10, 8, 9],
        vec![12, 10, 5],
        [9, 3],
    )
    .unwrap();
    let (outcome, stats) = ConflictDirectedBackjumping::default()
        .solve(&problem)
        .unwrap();
    assert!(outcome.is_some());
    let table = render_stats_table(&stats, problem.constraints());
    assert!(table.contains("row 0"));
    assert!(table.contains("main diagonal"));
}

/// The shape an external reader would hand over, here decoded from JSON.
#[derive(Debug, Deserialize)]
struct ReaderPayload {
    rows: Vec<Vec<i32>>,
    row_sums: Vec<i32>,
    col_sums: Vec<i32>,
    diag_sums: [i32; 2],
}

#[test]
fn reader_payload_round_trips_into_a_solve() {
    let payload: ReaderPayload = serde_json::from_str(
        r#"{
            "rows": [[-1, -1, 0], [5, -1, 2], [-1, -1, -1]],
            "row_sums": [10, 8, 9],
            "col_sums": [12, 10, 5],
            "diag_sums": [9, 3]
        }"#,
    )
    .unwrap();
    let problem = Problem::from_parts(
        payload.rows,
        payload.row_sums,
        payload.col_sums,
        payload.diag_sums,
    )
    .unwrap();
    for (outcome, _stats) in solve_with_each(&problem) {
        assert!(outcome.is_some());
    }
    // The solved grid serializes for the external writer.
    let (outcome, _stats) = engines()[0].solve(&problem).unwrap();
    let serialized = serde_json::to_string(&outcome.unwrap()).unwrap();
    assert!(serialized.contains("values"));
}

#[test]
fn malformed_payloads_fail_before_any_search() {
    let ragged = Problem::from_parts(
        vec![vec![-1, -1, 0], vec![5, -1], vec![-1, -1, -1]],
        vec![10, 8, 9],
        vec![12, 10, 5],
        [9, 3],
    );
    assert!(ragged.is_err());
    let missing_sum = Problem::from_parts(
        vec![vec![-1, -1, 0], vec![5, -1, 2], vec![-1, -1, -1]],
        vec![10, 8],
        vec![12, 10, 5],
        [9, 3],
    );
    assert!(missing_sum.is_err());
}
