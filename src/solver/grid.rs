//! The immutable problem definition and the mutable board the engines
//! write into.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SolverError},
    solver::{
        domain::{VALUE_MAX, VALUE_MIN},
        engine::{ConstraintId, VariableId},
    },
};

/// Sentinel external readers use to mark a free cell.
pub const FREE_CELL: i32 = -1;

/// A single grid cell as loaded from the problem definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// A pre-filled digit. Never changes after load.
    Fixed(u8),
    /// A search variable.
    Free,
}

/// The N×N cell matrix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    n: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.n + col]
    }
}

/// Which line of the grid a constraint covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    Row(usize),
    Col(usize),
    MainDiag,
    AntiDiag,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Row(row) => write!(f, "row {row}"),
            ConstraintKind::Col(col) => write!(f, "col {col}"),
            ConstraintKind::MainDiag => write!(f, "main diagonal"),
            ConstraintKind::AntiDiag => write!(f, "anti-diagonal"),
        }
    }
}

/// One sum constraint and the cells it covers, in grid order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub target: i32,
    pub cells: Vec<(usize, usize)>,
}

/// The validated, immutable problem definition.
///
/// Free cells are handed dense indices at build time so that domains,
/// conflict sets, and assignments can live in flat arrays instead of maps
/// keyed by coordinates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Problem {
    grid: Grid,
    constraints: Vec<Constraint>,
    variables: Vec<(usize, usize)>,
    var_index: Vec<Option<VariableId>>,
    covering: Vec<Vec<ConstraintId>>,
}

impl Problem {
    /// Builds a problem from the shape an external reader produces: `n`
    /// rows of `n` integers each ([`FREE_CELL`] marking free cells), `n`
    /// row targets, `n` column targets, and the two diagonal targets (main
    /// diagonal first).
    pub fn from_parts(
        rows: Vec<Vec<i32>>,
        row_sums: Vec<i32>,
        col_sums: Vec<i32>,
        diag_sums: [i32; 2],
    ) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(SolverError::MalformedInput("grid has no rows".into()).into());
        }
        for (row, values) in rows.iter().enumerate() {
            if values.len() != n {
                return Err(SolverError::MalformedInput(format!(
                    "row {row} has {} cells, expected {n}",
                    values.len()
                ))
                .into());
            }
        }
        if row_sums.len() != n {
            return Err(SolverError::MalformedInput(format!(
                "expected {n} row sums, got {}",
                row_sums.len()
            ))
            .into());
        }
        if col_sums.len() != n {
            return Err(SolverError::MalformedInput(format!(
                "expected {n} column sums, got {}",
                col_sums.len()
            ))
            .into());
        }

        let mut cells = Vec::with_capacity(n * n);
        for (row, values) in rows.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                let cell = match value {
                    FREE_CELL => Cell::Free,
                    digit if (VALUE_MIN..=VALUE_MAX).contains(&digit) => Cell::Fixed(digit as u8),
                    bad => {
                        return Err(SolverError::MalformedInput(format!(
                            "cell ({row}, {col}) holds {bad}, outside {VALUE_MIN}..={VALUE_MAX}"
                        ))
                        .into())
                    }
                };
                cells.push(cell);
            }
        }
        let grid = Grid { n, cells };

        let mut constraints = Vec::with_capacity(2 * n + 2);
        for (row, &target) in row_sums.iter().enumerate() {
            constraints.push(Constraint {
                kind: ConstraintKind::Row(row),
                target,
                cells: (0..n).map(|col| (row, col)).collect(),
            });
        }
        for (col, &target) in col_sums.iter().enumerate() {
            constraints.push(Constraint {
                kind: ConstraintKind::Col(col),
                target,
                cells: (0..n).map(|row| (row, col)).collect(),
            });
        }
        constraints.push(Constraint {
            kind: ConstraintKind::MainDiag,
            target: diag_sums[0],
            cells: (0..n).map(|i| (i, i)).collect(),
        });
        constraints.push(Constraint {
            kind: ConstraintKind::AntiDiag,
            target: diag_sums[1],
            cells: (0..n).map(|i| (i, n - 1 - i)).collect(),
        });

        let mut variables = Vec::new();
        let mut var_index = vec![None; n * n];
        for row in 0..n {
            for col in 0..n {
                if grid.cell(row, col) == Cell::Free {
                    var_index[row * n + col] = Some(variables.len());
                    variables.push((row, col));
                }
            }
        }
        let mut covering = vec![Vec::new(); variables.len()];
        for (constraint_id, constraint) in constraints.iter().enumerate() {
            for &(row, col) in &constraint.cells {
                if let Some(var) = var_index[row * n + col] {
                    covering[var].push(constraint_id);
                }
            }
        }

        Ok(Self {
            grid,
            constraints,
            variables,
            var_index,
            covering,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn n(&self) -> usize {
        self.grid.n
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Arena order: `variables()[id]` is the coordinate of variable `id`.
    pub fn variables(&self) -> &[(usize, usize)] {
        &self.variables
    }

    /// The variable occupying `(row, col)`, if that cell is free.
    pub fn variable_at(&self, row: usize, col: usize) -> Option<VariableId> {
        self.var_index[row * self.grid.n + col]
    }

    /// Ids of the constraints covering the given variable's cell.
    pub fn covering(&self, var: VariableId) -> &[ConstraintId] {
        &self.covering[var]
    }
}

/// Undo token returned by [`Board::place`].
#[must_use = "a placement that is never retracted leaves the cell filled"]
#[derive(Debug)]
pub struct Placement {
    index: usize,
}

/// Mutable assignment state over a problem's grid.
///
/// Fixed cells are filled at construction; the search engines write free
/// cells through [`Board::place`] and restore them by handing the returned
/// token back to [`Board::retract`], so backtracking never deep-copies.
#[derive(Clone, Debug)]
pub struct Board {
    n: usize,
    values: Vec<Option<u8>>,
}

impl Board {
    pub fn new(problem: &Problem) -> Self {
        let n = problem.n();
        let mut values = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                values.push(match problem.grid().cell(row, col) {
                    Cell::Fixed(digit) => Some(digit),
                    Cell::Free => None,
                });
            }
        }
        Self { n, values }
    }

    pub fn value(&self, row: usize, col: usize) -> Option<u8> {
        self.values[row * self.n + col]
    }

    /// Writes `digit` into a currently empty cell.
    pub fn place(&mut self, row: usize, col: usize, digit: u8) -> Placement {
        let index = row * self.n + col;
        debug_assert!(
            self.values[index].is_none(),
            "cell ({row}, {col}) is already filled"
        );
        self.values[index] = Some(digit);
        Placement { index }
    }

    /// Reverts the placement, leaving the cell empty again.
    pub fn retract(&mut self, placement: Placement) {
        self.values[placement.index] = None;
    }

    pub fn free_cells(&self) -> usize {
        self.values.iter().filter(|value| value.is_none()).count()
    }

    /// The completed grid, or `None` if any cell is still empty.
    pub fn to_completed(&self) -> Option<SolvedGrid> {
        let values = self
            .values
            .iter()
            .copied()
            .collect::<Option<Vec<u8>>>()?;
        Some(SolvedGrid::from_values(self.n, values))
    }
}

/// A fully assigned grid produced by a successful solve, consumed by the
/// external writer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvedGrid {
    n: usize,
    values: Vec<u8>,
}

impl SolvedGrid {
    pub(crate) fn from_values(n: usize, values: Vec<u8>) -> Self {
        debug_assert_eq!(values.len(), n * n);
        Self { n, values }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn value(&self, row: usize, col: usize) -> u8 {
        self.values[row * self.n + col]
    }

    /// Row-major copy of the grid, one `Vec` per row.
    pub fn rows(&self) -> Vec<Vec<u8>> {
        self.values.chunks(self.n).map(<[u8]>::to_vec).collect()
    }
}
