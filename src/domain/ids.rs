use super::entry::{EntryId, TimeEntry};
use super::timesheet::TimesheetId;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// Generate a timesheet ID: base-36 millisecond timestamp followed by a base-36 random suffix
pub fn generate_timesheet_id(now: DateTime<Utc>) -> TimesheetId {
    let millis = now.timestamp_millis().max(0) as u128;
    // Low 64 bits of a v4 UUID are random apart from the two variant bits
    let random = Uuid::new_v4().as_u128() as u64;
    TimesheetId::new(format!("{}{}", to_base36(millis), to_base36(random as u128)))
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Next entry ID for a timesheet: one past the highest existing ID, or 0 when empty.
///
/// IDs of deleted entries can come back; they are only unique among current entries.
/// If the highest ID is already `EntryId::MAX` (only possible with loaded data), the
/// lowest unused ID is taken instead.
pub fn next_entry_id(entries: &[TimeEntry]) -> EntryId {
    match entries.iter().map(|entry| entry.id).max() {
        None => 0,
        Some(highest) => highest
            .checked_add(1)
            .unwrap_or_else(|| lowest_unused_id(entries)),
    }
}

fn lowest_unused_id(entries: &[TimeEntry]) -> EntryId {
    let used: HashSet<EntryId> = entries.iter().map(|entry| entry.id).collect();
    (0..EntryId::MAX).find(|id| !used.contains(id)).unwrap_or_default()
}

/// Default name for a new timesheet: "M-D-YYYY", then "M-D-YYYY 2", "M-D-YYYY 3", ...
pub fn timesheet_name<'a>(date: NaiveDate, existing: impl IntoIterator<Item = &'a str>) -> String {
    let existing: HashSet<&str> = existing.into_iter().collect();
    let base = format!("{}-{}-{}", date.month(), date.day(), date.year());

    if !existing.contains(base.as_str()) {
        return base;
    }

    let mut counter = 2;
    loop {
        let candidate = format!("{} {}", base, counter);
        if !existing.contains(candidate.as_str()) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_709_629_200_000), "lte531c0");
    }

    #[test]
    fn test_timesheet_id_starts_with_timestamp() {
        let now = Utc.timestamp_millis_opt(1_709_629_200_000).unwrap();
        let id = generate_timesheet_id(now);

        assert!(id.as_str().starts_with("lte531c0"));
        assert!(id.as_str().len() > "lte531c0".len());
    }

    #[test]
    fn test_timesheet_ids_are_unique() {
        let now = Utc.timestamp_millis_opt(1_709_629_200_000).unwrap();
        let ids: HashSet<TimesheetId> = (0..200).map(|_| generate_timesheet_id(now)).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_next_entry_id() {
        let start = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();
        assert_eq!(next_entry_id(&[]), 0);

        let entries = vec![
            TimeEntry::running(4, "A", start),
            TimeEntry::running(1, "B", start),
        ];
        assert_eq!(next_entry_id(&entries), 5);
    }

    #[test]
    fn test_next_entry_id_at_max_takes_lowest_free() {
        let start = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();
        let entries = vec![
            TimeEntry::running(0, "A", start),
            TimeEntry::running(EntryId::MAX, "B", start),
            TimeEntry::running(1, "C", start),
        ];
        assert_eq!(next_entry_id(&entries), 2);

        let only_max = vec![TimeEntry::running(EntryId::MAX, "B", start)];
        assert_eq!(next_entry_id(&only_max), 0);
    }

    #[test]
    fn test_timesheet_name_suffixes() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        assert_eq!(timesheet_name(date, []), "3-5-2024");
        assert_eq!(timesheet_name(date, ["3-5-2024"]), "3-5-2024 2");
        assert_eq!(
            timesheet_name(date, ["3-5-2024", "3-5-2024 2", "3-5-2024 3"]),
            "3-5-2024 4"
        );
        // Gaps are filled from 2 upward
        assert_eq!(timesheet_name(date, ["3-5-2024", "3-5-2024 3"]), "3-5-2024 2");
    }
}
