//! Conflict-directed backjumping with MRV re-ordering.

use std::time::Instant;

use tracing::{debug, trace};

use crate::{
    error::{Result, SolverError},
    solver::{
        conflict::ConflictSet,
        consistency,
        domain::Domain,
        engine::{SearchStats, VariableId},
        grid::{Board, Constraint, Placement, Problem, SolvedGrid},
        heuristics::variable::MinimumRemainingValues,
        strategy::SearchStrategy,
    },
};

/// Backtracking that jumps straight to the most recent variable implicated
/// in a failure instead of undoing one step at a time.
///
/// Domains start at the full digit range and are narrowed incrementally by
/// [`prune_step`] after each trial assignment. Whenever a domain shrinks,
/// the blame is folded into that variable's conflict set; when a domain is
/// exhausted, the conflict set names the jump target. Everything strictly
/// after the target is re-derived from scratch.
///
/// Domains, conflict sets, and placements are keyed by the stable arena
/// [`VariableId`]; only the `order`/`positions` permutation moves during
/// MRV swaps. Conflict sets only ever name variables in the assigned
/// prefix, which is never reordered, so recency comparisons through
/// `positions` stay valid.
#[derive(Debug, Default)]
pub struct ConflictDirectedBackjumping {
    selector: MinimumRemainingValues,
}

impl SearchStrategy for ConflictDirectedBackjumping {
    fn solve(&self, problem: &Problem) -> Result<(Option<SolvedGrid>, SearchStats)> {
        let mut stats = SearchStats::default();
        let mut board = Board::new(problem);
        let var_count = problem.variables().len();

        if var_count == 0 {
            return if consistency::is_complete(problem, &board) {
                Ok((Some(completed(&board)?), stats))
            } else {
                Ok((None, stats))
            };
        }

        let mut domains = vec![Domain::full(); var_count];
        let mut conflicts = vec![ConflictSet::new(var_count); var_count];
        let mut order: Vec<VariableId> = (0..var_count).collect();
        let mut positions: Vec<usize> = (0..var_count).collect();
        let mut trail: Vec<Option<Placement>> = (0..var_count).map(|_| None).collect();
        let mut cursor: isize = 0;

        loop {
            if cursor < 0 {
                return Ok((None, stats));
            }
            if cursor as usize >= var_count {
                // Defensive: the loop below only advances past consistent
                // full boards, so this must hold.
                if !consistency::is_complete(problem, &board) {
                    return Err(SolverError::InternalInconsistency(
                        "cursor ran past the last variable on an incomplete board".into(),
                    )
                    .into());
                }
                return Ok((Some(completed(&board)?), stats));
            }

            let at = cursor as usize;
            let var = order[at];

            if domains[var].is_empty() {
                stats.backtracks += 1;
                if conflicts[var].is_empty() {
                    cursor -= 1;
                } else {
                    let culprit = conflicts[var]
                        .iter()
                        .max_by_key(|&peer| positions[peer])
                        .ok_or(SolverError::InternalInconsistency(
                            "non-empty conflict set yielded no culprit".into(),
                        ))?;
                    let abandoned = conflicts[var].clone();
                    conflicts[culprit].union_with(&abandoned);
                    conflicts[culprit].remove(culprit);
                    if at - positions[culprit] > 1 {
                        stats.backjumps += 1;
                    }
                    debug!(from = at, to = positions[culprit], "backjumping");
                    cursor = positions[culprit] as isize;
                }
                reset_beyond(
                    cursor, &order, &mut domains, &mut conflicts, &mut trail, &mut board,
                );
                if cursor >= 0 {
                    let target = order[cursor as usize];
                    // Discard the value that led here and leave the target
                    // unassigned for the next round.
                    domains[target].pop_min();
                    if let Some(placement) = trail[target].take() {
                        board.retract(placement);
                    }
                }
                continue;
            }

            let value = domains[var].min().ok_or(SolverError::InternalInconsistency(
                "non-empty domain without a minimum".into(),
            ))?;
            let (row, col) = problem.variables()[var];
            trail[var] = Some(board.place(row, col, value as u8));
            stats.nodes_visited += 1;
            trace!(row, col, value, "trying value");

            if let Some((wiped, blame)) =
                prune_step(problem, &board, &mut domains, &mut conflicts, &order, &mut stats)
            {
                trace!(wiped, "propagation emptied a domain");
                domains[var].pop_min();
                conflicts[var].union_with(&blame);
                conflicts[var].remove(var);
                reset_beyond(
                    cursor, &order, &mut domains, &mut conflicts, &mut trail, &mut board,
                );
                if let Some(placement) = trail[var].take() {
                    board.retract(placement);
                }
                continue;
            }

            if !consistency::is_consistent(problem, &board) {
                domains[var].pop_min();
                reset_beyond(
                    cursor, &order, &mut domains, &mut conflicts, &mut trail, &mut board,
                );
                if let Some(placement) = trail[var].take() {
                    board.retract(placement);
                }
                continue;
            }

            cursor += 1;
            // Swap the tightest remaining variable into the next slot; the
            // assigned prefix is never reordered.
            let next = cursor as usize;
            if let Some(best) = self
                .selector
                .select((next..var_count).map(|position| (position, domains[order[position]].len())))
            {
                order.swap(next, best);
                positions[order[next]] = next;
                positions[order[best]] = best;
            }
        }
    }
}

/// Clears every variable strictly after the cursor position: assignment
/// retracted, domain back to the full range, conflict set emptied.
fn reset_beyond(
    cursor: isize,
    order: &[VariableId],
    domains: &mut [Domain],
    conflicts: &mut [ConflictSet],
    trail: &mut [Option<Placement>],
    board: &mut Board,
) {
    let start = if cursor < 0 { 0 } else { cursor as usize + 1 };
    for &var in &order[start..] {
        domains[var] = Domain::full();
        conflicts[var].clear();
        if let Some(placement) = trail[var].take() {
            board.retract(placement);
        }
    }
}

/// One pruning sweep over all constraints after a trial assignment.
///
/// A constraint with exactly one open cell collapses that cell's domain to
/// the single value forced by the remaining sum; a constraint with two or
/// more open cells bounds each of them by what the others can still reach.
/// Returns the first variable (in search order) whose domain is now empty,
/// together with a snapshot of its conflict set.
fn prune_step(
    problem: &Problem,
    board: &Board,
    domains: &mut [Domain],
    conflicts: &mut [ConflictSet],
    order: &[VariableId],
    stats: &mut SearchStats,
) -> Option<(VariableId, ConflictSet)> {
    for (constraint_id, constraint) in problem.constraints().iter().enumerate() {
        let started = Instant::now();
        let per_constraint = stats.constraint_stats.entry(constraint_id).or_default();
        per_constraint.revisions += 1;

        let mut placed_sum = 0i32;
        let mut open: Vec<VariableId> = Vec::new();
        for &(row, col) in &constraint.cells {
            match board.value(row, col) {
                Some(digit) => placed_sum += i32::from(digit),
                None => open.push(
                    problem
                        .variable_at(row, col)
                        .expect("empty board cell is always a variable"),
                ),
            }
        }

        match open.len() {
            0 => {}
            1 => {
                let var = open[0];
                let forced = constraint.target - placed_sum;
                let before = domains[var].len();
                domains[var] = domains[var].intersect(&Domain::singleton(forced));
                if domains[var].len() < before {
                    per_constraint.prunings += 1;
                    absorb_blame(problem, board, conflicts, constraint, var);
                }
            }
            _ => {
                let mut min_total = 0i32;
                let mut max_total = 0i32;
                for &open_var in &open {
                    // Variables with already-empty domains contribute
                    // nothing to either total.
                    if let (Some(lo), Some(hi)) = (domains[open_var].min(), domains[open_var].max())
                    {
                        min_total += lo;
                        max_total += hi;
                    }
                }
                for &var in &open {
                    let (own_min, own_max) = match (domains[var].min(), domains[var].max()) {
                        (Some(lo), Some(hi)) => (lo, hi),
                        _ => (0, 0),
                    };
                    let remaining = constraint.target - placed_sum;
                    let upper = remaining - (min_total - own_min);
                    let lower = remaining - (max_total - own_max);
                    let before = domains[var].len();
                    let mut next = domains[var].clamp_max(upper);
                    if lower >= 0 {
                        next = next.clamp_min(lower);
                    }
                    domains[var] = next;
                    if domains[var].len() < before {
                        per_constraint.prunings += 1;
                        absorb_blame(problem, board, conflicts, constraint, var);
                    }
                }
            }
        }
        per_constraint.time_spent_micros += started.elapsed().as_micros() as u64;
    }

    // The first wiped-out variable in search order decides the blame.
    for &var in order {
        if domains[var].is_empty() {
            return Some((var, conflicts[var].clone()));
        }
    }
    None
}

/// Folds the blame for a pruned domain into `var`'s conflict set: assigned
/// peers in the constraint are implicated directly, every other peer through
/// its own conflict set. `var` itself never ends up in its own set.
fn absorb_blame(
    problem: &Problem,
    board: &Board,
    conflicts: &mut [ConflictSet],
    constraint: &Constraint,
    var: VariableId,
) {
    for &(row, col) in &constraint.cells {
        let Some(peer) = problem.variable_at(row, col) else {
            continue;
        };
        if peer == var {
            continue;
        }
        if board.value(row, col).is_some() && !conflicts[var].contains(peer) {
            conflicts[var].insert(peer);
        } else {
            let absorbed = conflicts[peer].clone();
            conflicts[var].union_with(&absorbed);
            conflicts[var].remove(var);
        }
    }
}

fn completed(board: &Board) -> Result<SolvedGrid> {
    board.to_completed().ok_or(
        SolverError::InternalInconsistency("complete board still has empty cells".into()).into(),
    )
}
