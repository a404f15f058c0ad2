use crate::domain::{TimeEntry, TimesheetData};
use serde::Deserialize;

/// Key holding the current multi-timesheet format
pub const STORAGE_KEY: &str = "timetracker-data";

/// Key holding the pre-timesheet entry list (read once for migration, then removed)
pub const LEGACY_STORAGE_KEY: &str = "timesheet";

/// Key receiving a copy of current-format data that failed to parse
pub const CORRUPT_BACKUP_KEY: &str = "timetracker-data.corrupt";

/// Parse the current-format JSON document
pub fn parse_current(json: &str) -> serde_json::Result<TimesheetData> {
    serde_json::from_str(json)
}

/// The legacy document: either a bare entry list or `{ "entries": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LegacyData {
    Bare(Vec<TimeEntry>),
    Wrapped { entries: Vec<TimeEntry> },
}

impl LegacyData {
    pub fn into_entries(self) -> Vec<TimeEntry> {
        match self {
            LegacyData::Bare(entries) | LegacyData::Wrapped { entries } => entries,
        }
    }
}

pub fn parse_legacy(json: &str) -> serde_json::Result<Vec<TimeEntry>> {
    serde_json::from_str::<LegacyData>(json).map(LegacyData::into_entries)
}
