use super::error::StorageError;
use super::kv::KeyValueStore;
use super::schema::{
    parse_current, parse_legacy, CORRUPT_BACKUP_KEY, LEGACY_STORAGE_KEY, STORAGE_KEY,
};
use super::storage::{default_data, default_timesheet, try_save};
use crate::domain::{generate_timesheet_id, TimeEntry, Timesheet, TimesheetData, DEFAULT_TIMESHEET_NAME};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

/// What was found in storage at startup
#[derive(Debug)]
pub enum Stored {
    /// Current-format data
    Current(TimesheetData),
    /// No current data, but a legacy entry list
    Legacy(Vec<TimeEntry>),
    /// Nothing stored yet
    Missing,
    /// Storage could not be read or parsed. `raw` holds the unparsable current-format
    /// value, if that was the problem.
    Corrupt {
        error: StorageError,
        raw: Option<String>,
    },
}

/// Read storage without modifying it: current schema first, then legacy
pub fn read_stored<K: KeyValueStore + ?Sized>(kv: &K) -> Stored {
    match kv.get(STORAGE_KEY) {
        Ok(Some(raw)) => {
            return match parse_current(&raw) {
                Ok(data) => Stored::Current(data),
                Err(source) => Stored::Corrupt {
                    error: StorageError::Parse {
                        key: STORAGE_KEY.to_string(),
                        source,
                    },
                    raw: Some(raw),
                },
            };
        }
        Ok(None) => {}
        Err(error) => return Stored::Corrupt { error, raw: None },
    }

    match kv.get(LEGACY_STORAGE_KEY) {
        Ok(Some(raw)) => match parse_legacy(&raw) {
            Ok(entries) => Stored::Legacy(entries),
            Err(source) => Stored::Corrupt {
                error: StorageError::Parse {
                    key: LEGACY_STORAGE_KEY.to_string(),
                    source,
                },
                raw: None,
            },
        },
        Ok(None) => Stored::Missing,
        Err(error) => Stored::Corrupt { error, raw: None },
    }
}

/// Load state on startup. Never fails: anything unreadable degrades to default data.
///
/// 1. Current-format data is returned as is (after repairing broken invariants)
/// 2. Legacy entries are wrapped into one "My Timesheet", saved under the current key, and
///    the legacy key is removed
/// 3. Otherwise a fresh default timesheet is returned
pub fn load<K: KeyValueStore + ?Sized>(kv: &mut K, now: DateTime<Utc>) -> TimesheetData {
    match read_stored(kv) {
        Stored::Current(mut data) => {
            if data.repair(|| default_timesheet(now)) {
                warn!("Stored timesheet data had no valid active timesheet, repaired");
            }
            data
        }
        Stored::Legacy(entries) => migrate_legacy(kv, entries, now),
        Stored::Missing => {
            debug!("No stored timesheet data, starting fresh");
            default_data(now)
        }
        Stored::Corrupt { error, raw } => {
            error!("Failed to load from storage: {}", error);
            if let Some(raw) = raw {
                backup_corrupt(kv, &raw);
            }
            default_data(now)
        }
    }
}

/// Current-format data as stored right now, repaired like `load` repairs it. Nothing is
/// written; `None` when the current key is missing or unreadable.
pub fn read_current<K: KeyValueStore + ?Sized>(
    kv: &K,
    now: DateTime<Utc>,
) -> Option<TimesheetData> {
    match read_stored(kv) {
        Stored::Current(mut data) => {
            data.repair(|| default_timesheet(now));
            Some(data)
        }
        Stored::Corrupt { error, .. } => {
            debug!("Stored timesheet data not readable: {}", error);
            None
        }
        Stored::Legacy(_) | Stored::Missing => None,
    }
}

/// Wrap legacy entries into a single timesheet and persist it in the current format
pub fn migrate_legacy<K: KeyValueStore + ?Sized>(
    kv: &mut K,
    entries: Vec<TimeEntry>,
    now: DateTime<Utc>,
) -> TimesheetData {
    let count = entries.len();
    let mut timesheet = Timesheet::new(generate_timesheet_id(now), DEFAULT_TIMESHEET_NAME, now);
    timesheet.entries = entries;
    let data = TimesheetData::with_timesheet(timesheet);

    // The legacy key is only dropped once the migrated copy is safely stored
    match try_save(kv, &data) {
        Ok(()) => {
            if let Err(e) = kv.remove(LEGACY_STORAGE_KEY) {
                warn!("Migrated legacy data but could not remove old key: {}", e);
            }
            info!(entries = count, "Migrated legacy timesheet to multi-timesheet format");
        }
        Err(e) => error!("Failed to save migrated data, legacy data left in place: {}", e),
    }

    data
}

fn backup_corrupt<K: KeyValueStore + ?Sized>(kv: &mut K, raw: &str) {
    match kv.set(CORRUPT_BACKUP_KEY, raw) {
        Ok(()) => warn!("Unreadable timesheet data copied to {:?}", CORRUPT_BACKUP_KEY),
        Err(e) => error!("Failed to back up unreadable timesheet data: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::kv::MemoryStore;
    use crate::persistence::storage::save;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap()
    }

    const LEGACY: &str = r#"[
        { "id": 0, "name": "Design", "start": "2024-03-04T09:00:00.000Z",
          "stop": "2024-03-04T10:00:00.000Z", "isStopped": true },
        { "id": 1, "name": "Review", "start": "2024-03-04T11:00:00.000Z", "isStopped": false }
    ]"#;

    #[test]
    fn test_load_missing_returns_default() {
        let mut kv = MemoryStore::new();
        let data = load(&mut kv, now());

        assert_eq!(data.timesheets.len(), 1);
        assert_eq!(data.active().unwrap().name, DEFAULT_TIMESHEET_NAME);
        assert!(matches!(read_stored(&kv), Stored::Missing));
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let mut kv = MemoryStore::new();
        let mut data = default_data(now());
        let sheet = data.active_mut().unwrap();
        sheet.entries.push(
            TimeEntry::running(0, "Design", now()).stopped_at(now() + Duration::milliseconds(90_250)),
        );
        sheet.entries.push(TimeEntry::running(1, "Review", now() + Duration::minutes(2)));
        data.timesheets.push(Timesheet::new("second".into(), "3-5-2024", now()));

        save(&mut kv, &data);
        assert_eq!(load(&mut kv, now() + Duration::hours(1)), data);
    }

    #[test]
    fn test_legacy_migration() {
        let mut kv = MemoryStore::new();
        kv.set(LEGACY_STORAGE_KEY, LEGACY).unwrap();

        let data = load(&mut kv, now());
        let sheet = data.active().unwrap();

        assert_eq!(data.timesheets.len(), 1);
        assert_eq!(sheet.name, DEFAULT_TIMESHEET_NAME);
        assert_eq!(sheet.created_at, now());
        assert_eq!(sheet.entries.len(), 2);
        assert_eq!(sheet.entries[0].name, "Design");
        assert!(sheet.entries[0].is_stopped);
        assert!(sheet.entries[1].is_running());

        assert!(!kv.contains(LEGACY_STORAGE_KEY));
        assert!(kv.contains(STORAGE_KEY));
    }

    #[test]
    fn test_migration_happens_once() {
        let mut kv = MemoryStore::new();
        kv.set(LEGACY_STORAGE_KEY, LEGACY).unwrap();

        let first = load(&mut kv, now());
        let second = load(&mut kv, now() + Duration::days(1));

        assert_eq!(first, second);
    }

    #[test]
    fn test_wrapped_legacy_shape() {
        let mut kv = MemoryStore::new();
        kv.set(
            LEGACY_STORAGE_KEY,
            r#"{ "entries": [{ "id": 7, "name": "A", "start": 1709629200000, "isStopped": false }] }"#,
        )
        .unwrap();

        let data = load(&mut kv, now());
        assert_eq!(data.active().unwrap().entries[0].id, 7);
    }

    #[test]
    fn test_current_key_wins_over_legacy() {
        let mut kv = MemoryStore::new();
        let data = default_data(now());
        save(&mut kv, &data);
        kv.set(LEGACY_STORAGE_KEY, LEGACY).unwrap();

        assert_eq!(load(&mut kv, now()), data);
        assert!(kv.contains(LEGACY_STORAGE_KEY));
    }

    #[test]
    fn test_corrupt_current_falls_back_and_backs_up() {
        let mut kv = MemoryStore::new();
        kv.set(STORAGE_KEY, "{not json").unwrap();

        let data = load(&mut kv, now());

        assert_eq!(data.timesheets.len(), 1);
        assert!(data.active().unwrap().entries.is_empty());
        assert_eq!(kv.get(CORRUPT_BACKUP_KEY).unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_corrupt_legacy_falls_back() {
        let mut kv = MemoryStore::new();
        kv.set(LEGACY_STORAGE_KEY, "42").unwrap();

        let data = load(&mut kv, now());

        assert_eq!(data.active().unwrap().name, DEFAULT_TIMESHEET_NAME);
        assert!(kv.contains(LEGACY_STORAGE_KEY));
        assert!(!kv.contains(STORAGE_KEY));
    }

    #[test]
    fn test_dangling_active_is_repaired() {
        let mut kv = MemoryStore::new();
        kv.set(
            STORAGE_KEY,
            r#"{ "timesheets": [{ "id": "a", "name": "A", "createdAt": 0, "entries": [] }],
                 "activeTimesheetId": null }"#,
        )
        .unwrap();

        let data = load(&mut kv, now());
        assert_eq!(data.active_timesheet_id, Some("a".into()));
    }
}
