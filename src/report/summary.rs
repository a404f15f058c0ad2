use crate::domain::{duration_of, TimeEntry};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Totals for one task name
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSummary {
    pub name: String,
    pub duration: Duration,
    pub entry_count: usize,
    /// Share of the timesheet total, 0-100
    pub percentage: f64,
}

/// Per-task breakdown of a timesheet
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Longest first; equal durations keep first-seen order
    pub rows: Vec<TaskSummary>,
    pub total: Duration,
    pub entry_count: usize,
}

/// Group entries by task name as of `now`.
///
/// Returns `None` for an empty entry list, since there is nothing to take a percentage
/// of.
pub fn summarize(entries: &[TimeEntry], now: DateTime<Utc>) -> Option<Summary> {
    if entries.is_empty() {
        return None;
    }

    let mut rows: Vec<TaskSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut total = Duration::zero();

    for entry in entries {
        let duration = duration_of(entry, now);
        total = total + duration;

        let slot = *index.entry(entry.name.as_str()).or_insert_with(|| {
            rows.push(TaskSummary {
                name: entry.name.clone(),
                duration: Duration::zero(),
                entry_count: 0,
                percentage: 0.0,
            });
            rows.len() - 1
        });
        let row = &mut rows[slot];
        row.duration = row.duration + duration;
        row.entry_count += 1;
    }

    let total_ms = total.num_milliseconds();
    for row in &mut rows {
        row.percentage = if total_ms > 0 {
            row.duration.num_milliseconds() as f64 / total_ms as f64 * 100.0
        } else {
            0.0
        };
    }

    // sort_by is stable, so ties keep group-construction order
    rows.sort_by(|a, b| b.duration.cmp(&a.duration));

    Some(Summary {
        rows,
        total,
        entry_count: entries.len(),
    })
}
