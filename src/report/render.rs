use super::summary::summarize;
use crate::domain::{
    duration_of, format_duration, format_percent, format_timesheet_date, Navigation, Timesheet,
    TimesheetData,
};
use chrono::{DateTime, Local, Utc};

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "entry"
    } else {
        "entries"
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Header line: name, creation date, entry count and position among all timesheets
pub fn render_header(
    timesheet: &Timesheet,
    navigation: Option<&Navigation>,
    now: DateTime<Utc>,
) -> String {
    let mut header = format!(
        "{} ({} • {} {})",
        timesheet.name,
        format_timesheet_date(timesheet.created_at, now),
        timesheet.entries.len(),
        plural(timesheet.entries.len())
    );
    if let Some(nav) = navigation {
        header.push_str(&format!("  [{} / {}]", nav.position, nav.total));
    }
    header
}

/// Entry table for a timesheet, in stored order
pub fn render_entries(timesheet: &Timesheet, now: DateTime<Utc>) -> String {
    if timesheet.entries.is_empty() {
        return "No entries yet. Start tracking with `punchcard start <task>`.\n".to_string();
    }

    let name_width = timesheet
        .entries
        .iter()
        .map(|entry| entry.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:>4}  {:<name_width$}  {:<19}  {:<19}  {:>8}\n",
        "ID",
        "Task",
        "Start",
        "Stop",
        "Duration",
        name_width = name_width
    ));

    for entry in &timesheet.entries {
        let stop = match entry.end() {
            Some(stop) => local_time(stop),
            None => "In progress".to_string(),
        };
        output.push_str(&format!(
            "{:>4}  {:<name_width$}  {:<19}  {:<19}  {:>8}\n",
            entry.id,
            entry.name,
            local_time(entry.start),
            stop,
            format_duration(duration_of(entry, now)),
            name_width = name_width
        ));
    }

    output
}

/// Per-task summary table with the overall total
pub fn render_summary(timesheet: &Timesheet, now: DateTime<Utc>) -> String {
    let Some(summary) = summarize(&timesheet.entries, now) else {
        return "No data to summarize. Start tracking time to see your summary.\n".to_string();
    };

    let name_width = summary
        .rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "Total time tracked: {} across {} {}\n\n",
        format_duration(summary.total),
        summary.entry_count,
        plural(summary.entry_count)
    ));
    output.push_str(&format!(
        "{:<name_width$}  {:>7}  {:>8}  {:>6}\n",
        "Task",
        "Entries",
        "Duration",
        "Share",
        name_width = name_width
    ));

    for row in &summary.rows {
        output.push_str(&format!(
            "{:<name_width$}  {:>7}  {:>8}  {:>6}\n",
            row.name,
            row.entry_count,
            format_duration(row.duration),
            format_percent(row.percentage),
            name_width = name_width
        ));
    }

    output
}

/// All timesheets, newest first, with the active one marked
pub fn render_timesheet_list(data: &TimesheetData, now: DateTime<Utc>) -> String {
    let mut output = String::new();
    for timesheet in data.newest_first() {
        let marker = if data.active_timesheet_id.as_ref() == Some(&timesheet.id) {
            '*'
        } else {
            ' '
        };
        output.push_str(&format!(
            "{} {}  {}  ({} • {} {})\n",
            marker,
            timesheet.id,
            timesheet.name,
            format_timesheet_date(timesheet.created_at, now),
            timesheet.entries.len(),
            plural(timesheet.entries.len())
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeEntry;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    fn sheet() -> Timesheet {
        let mut timesheet = Timesheet::new("abc".into(), "Work", now());
        timesheet.entries.push(
            TimeEntry::running(0, "Design", now() - Duration::minutes(30))
                .stopped_at(now() - Duration::minutes(10)),
        );
        timesheet
            .entries
            .push(TimeEntry::running(1, "Email", now() - Duration::seconds(65)));
        timesheet
    }

    #[test]
    fn test_render_entries() {
        let output = render_entries(&sheet(), now());

        assert!(output.contains("Design"));
        assert!(output.contains("00:20:00"));
        assert!(output.contains("In progress"));
        assert!(output.contains("00:01:05"));
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn test_render_empty_states() {
        let empty = Timesheet::new("x".into(), "Empty", now());
        assert!(render_entries(&empty, now()).starts_with("No entries yet"));
        assert!(render_summary(&empty, now()).starts_with("No data to summarize"));
    }

    #[test]
    fn test_render_summary() {
        let output = render_summary(&sheet(), now());

        assert!(output.starts_with("Total time tracked: 00:21:05 across 2 entries"));
        assert!(output.contains("94.9%"));
        assert!(output.contains("5.1%"));
    }

    #[test]
    fn test_render_timesheet_list_marks_active() {
        let data = TimesheetData::with_timesheet(sheet());
        let output = render_timesheet_list(&data, now());
        assert!(output.starts_with("* abc  Work"));
    }

    #[test]
    fn test_render_header() {
        let nav = Navigation {
            position: 1,
            total: 2,
            previous: None,
            next: None,
        };
        let header = render_header(&sheet(), Some(&nav), now());
        assert!(header.starts_with("Work ("));
        assert!(header.ends_with("2 entries)  [1 / 2]"));
    }
}
