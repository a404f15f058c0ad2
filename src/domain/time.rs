use super::entry::TimeEntry;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Utc};

/// Elapsed time of an entry as of `now`.
///
/// Stopped entries measure up to their stop time; running entries up to `now`. A running
/// entry that starts after `now` reports zero.
pub fn duration_of(entry: &TimeEntry, now: DateTime<Utc>) -> Duration {
    let end = entry.end().unwrap_or(now);
    (end - entry.start).max(Duration::zero())
}

/// Sum of `duration_of` over a set of entries
pub fn total_duration<'a>(
    entries: impl IntoIterator<Item = &'a TimeEntry>,
    now: DateTime<Utc>,
) -> Duration {
    entries
        .into_iter()
        .map(|entry| duration_of(entry, now))
        .fold(Duration::zero(), |acc, d| acc + d)
}

/// Format a duration as "HH:MM:SS" (hours are not wrapped into days)
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.num_seconds().max(0);
    let hours = total_secs / 3600;
    let minutes = (total_secs / 60) % 60;
    let seconds = total_secs % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format a duration as "1 hrs 5 mins 3 secs" (hours/minutes omitted when zero)
pub fn format_duration_verbose(duration: Duration) -> String {
    let total_secs = duration.num_seconds().max(0);
    let hours = total_secs / 3600;
    let minutes = (total_secs / 60) % 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{} hrs ", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{} mins ", minutes));
    }
    out.push_str(&format!("{} secs", seconds));
    out
}

/// Format percentage with 1 decimal place
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Calendar date of `at` in the local time zone
pub fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// "Today", "Yesterday", or "M/D/YYYY" for a timesheet's creation time
pub fn format_timesheet_date(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_timesheet_date_in(created_at, now, &Local)
}

pub fn format_timesheet_date_in<Tz: TimeZone>(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String {
    let created = created_at.with_timezone(tz).date_naive();
    let today = now.with_timezone(tz).date_naive();

    if created == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(created) {
        "Yesterday".to_string()
    } else {
        format!("{}/{}/{}", created.month(), created.day(), created.year())
    }
}
