//! Summa is a constraint solver for the magic square completion problem:
//! an N×N grid with some cells pre-filled and others free (digits 0–9),
//! plus exact target sums for every row, every column, and both main
//! diagonals. It finds an assignment of digits to the free cells meeting
//! every target, or proves that none exists.
//!
//! # Core Concepts
//!
//! - **[`Problem`]**: the validated, immutable definition: grid, targets,
//!   and a dense index for every free cell.
//! - **[`SearchStrategy`]**: a complete search procedure. Two are provided:
//!   [`OrderedBacktracking`] (chronological backtracking over a dynamically
//!   re-sorted frontier) and [`ConflictDirectedBackjumping`] (CBJ with
//!   per-variable conflict sets).
//! - **[`SolverEngine`]**: the front door; runs a strategy and re-checks
//!   its answer against the consistency oracle.
//!
//! Unsatisfiability is an ordinary outcome (`Ok((None, stats))`), never an
//! error.
//!
//! # Example: completing a partially filled square
//!
//! ```
//! use summa::solver::{
//!     engine::SolverEngine,
//!     grid::Problem,
//!     strategies::backtracking::OrderedBacktracking,
//! };
//!
//! // -1 marks a free cell.
//! let rows = vec![
//!     vec![-1, -1, 0],
//!     vec![5, -1, 2],
//!     vec![-1, -1, -1],
//! ];
//! let problem = Problem::from_parts(
//!     rows,
//!     vec![10, 8, 9],  // row targets
//!     vec![12, 10, 5], // column targets
//!     [9, 3],          // main diagonal, anti-diagonal
//! )
//! .unwrap();
//!
//! let engine = SolverEngine::new(Box::new(OrderedBacktracking::default()));
//! let (outcome, _stats) = engine.solve(&problem).unwrap();
//!
//! let solved = outcome.expect("this square has a completion");
//! assert_eq!(solved.value(0, 2), 0); // fixed cells are preserved
//! let top_row: i32 = (0..3).map(|col| i32::from(solved.value(0, col))).sum();
//! assert_eq!(top_row, 10);
//! ```
//!
//! [`Problem`]: solver::grid::Problem
//! [`SearchStrategy`]: solver::strategy::SearchStrategy
//! [`OrderedBacktracking`]: solver::strategies::backtracking::OrderedBacktracking
//! [`ConflictDirectedBackjumping`]: solver::strategies::backjumping::ConflictDirectedBackjumping
//! [`SolverEngine`]: solver::engine::SolverEngine

pub mod error;
pub mod solver;
