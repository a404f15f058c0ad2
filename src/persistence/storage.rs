use super::error::StorageResult;
use super::kv::KeyValueStore;
use super::schema::STORAGE_KEY;
use crate::domain::{generate_timesheet_id, Timesheet, TimesheetData, DEFAULT_TIMESHEET_NAME};
use chrono::{DateTime, Utc};
use tracing::{debug, error};

/// Serialize the full state under the current key
pub fn try_save<K: KeyValueStore + ?Sized>(kv: &mut K, data: &TimesheetData) -> StorageResult<()> {
    let json = serde_json::to_string(data)?;
    kv.set(STORAGE_KEY, &json)?;
    debug!(timesheets = data.timesheets.len(), "Saved timesheet data");
    Ok(())
}

/// Save, logging instead of failing. In-memory state stays authoritative and the next
/// successful save reconciles storage.
pub fn save<K: KeyValueStore + ?Sized>(kv: &mut K, data: &TimesheetData) -> bool {
    match try_save(kv, data) {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to save timesheet data: {}", e);
            false
        }
    }
}

/// An empty "My Timesheet" created at `now`
pub fn default_timesheet(now: DateTime<Utc>) -> Timesheet {
    Timesheet::new(generate_timesheet_id(now), DEFAULT_TIMESHEET_NAME, now)
}

/// First-run state: a single empty, active "My Timesheet"
pub fn default_data(now: DateTime<Utc>) -> TimesheetData {
    TimesheetData::with_timesheet(default_timesheet(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::error::StorageError;
    use crate::persistence::kv::MemoryStore;
    use chrono::TimeZone;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }

        fn set(&mut self, key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::InvalidKey(key.to_string()))
        }

        fn remove(&mut self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_default_data() {
        let data = default_data(now());
        assert_eq!(data.timesheets.len(), 1);
        assert_eq!(data.active().unwrap().name, DEFAULT_TIMESHEET_NAME);
        assert_eq!(data.active().unwrap().created_at, now());
        assert!(data.active().unwrap().entries.is_empty());
    }

    #[test]
    fn test_save_writes_current_key() {
        let mut kv = MemoryStore::new();
        assert!(save(&mut kv, &default_data(now())));
        assert!(kv.contains(STORAGE_KEY));
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let mut kv = FailingStore;
        assert!(!save(&mut kv, &default_data(now())));
        assert!(try_save(&mut kv, &default_data(now())).is_err());
    }
}
