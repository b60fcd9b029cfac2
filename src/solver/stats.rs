use prettytable::{Cell, Row, Table};

use crate::solver::{
    engine::{ConstraintId, PerConstraintStats, SearchStats},
    grid::Constraint,
};

/// Renders the per-constraint pruning counters as a text table.
pub fn render_stats_table(stats: &SearchStats, constraints: &[Constraint]) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Constraint"),
        Cell::new("Target"),
        Cell::new("Revisions"),
        Cell::new("Prunings"),
        Cell::new("Time / Call (µs)"),
        Cell::new("Total Time (ms)"),
    ]));

    let mut sorted_stats: Vec<(&ConstraintId, &PerConstraintStats)> =
        stats.constraint_stats.iter().collect();

    sorted_stats.sort_by_key(|entry| entry.1.time_spent_micros);

    for (constraint_id, constraint_stats) in sorted_stats {
        let constraint = &constraints[*constraint_id];
        let avg_time = if constraint_stats.revisions > 0 {
            constraint_stats.time_spent_micros as f64 / constraint_stats.revisions as f64
        } else {
            0.0
        };

        table.add_row(Row::new(vec![
            Cell::new(&constraint.kind.to_string()),
            Cell::new(&constraint.target.to_string()),
            Cell::new(&constraint_stats.revisions.to_string()),
            Cell::new(&constraint_stats.prunings.to_string()),
            Cell::new(&format!("{avg_time:.2}")),
            Cell::new(&format!(
                "{:.2}",
                constraint_stats.time_spent_micros as f64 / 1000.0
            )),
        ]));
    }

    table.to_string()
}
