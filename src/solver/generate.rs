//! Random instance generation for tests and benchmarks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::solver::grid::{Problem, SolvedGrid, FREE_CELL};

/// A generated problem together with the completion it was punched out of.
///
/// The witness proves the problem satisfiable; the solvers may well return
/// a different completion.
#[derive(Clone, Debug)]
pub struct Instance {
    pub problem: Problem,
    pub witness: SolvedGrid,
}

/// Fills an `n`×`n` grid with random digits, derives the row, column, and
/// diagonal targets from it, then punches out up to `holes` cells. Holes
/// are sampled with replacement, so fewer distinct cells may end up free.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn random_instance<R: Rng>(n: usize, holes: usize, rng: &mut R) -> Instance {
    assert!(n > 0, "grid must have at least one cell");

    let mut values = vec![0u8; n * n];
    for value in &mut values {
        *value = rng.gen_range(0..=9);
    }

    let mut row_sums = vec![0i32; n];
    let mut col_sums = vec![0i32; n];
    let mut diag_sums = [0i32; 2];
    for row in 0..n {
        for col in 0..n {
            let digit = i32::from(values[row * n + col]);
            row_sums[row] += digit;
            col_sums[col] += digit;
            if row == col {
                diag_sums[0] += digit;
            }
            if row + col == n - 1 {
                diag_sums[1] += digit;
            }
        }
    }

    let mut rows: Vec<Vec<i32>> = values
        .chunks(n)
        .map(|chunk| chunk.iter().map(|&digit| i32::from(digit)).collect())
        .collect();
    for _ in 0..holes {
        let row = rng.gen_range(0..n);
        let col = rng.gen_range(0..n);
        rows[row][col] = FREE_CELL;
    }

    let problem = Problem::from_parts(rows, row_sums, col_sums, diag_sums)
        .expect("generated grid dimensions are consistent");
    Instance {
        problem,
        witness: SolvedGrid::from_values(n, values),
    }
}

/// [`random_instance`] driven by a ChaCha8 stream, so the same seed always
/// produces the same instance.
pub fn seeded_instance(n: usize, holes: usize, seed: u64) -> Instance {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_instance(n, holes, &mut rng)
}
