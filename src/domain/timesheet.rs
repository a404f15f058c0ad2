use super::entry::{EntryId, TimeEntry};
use super::time::total_duration;
use super::millis;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name given to the timesheet created on first run and by legacy migration
pub const DEFAULT_TIMESHEET_NAME: &str = "My Timesheet";

/// Opaque timesheet identifier.
///
/// Stored as a plain string; IDs written by older clients use a different alphabet, so
/// no format is enforced when reading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimesheetId(String);

impl TimesheetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimesheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TimesheetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A named collection of entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    pub id: TimesheetId,
    pub name: String,
    #[serde(with = "millis")]
    pub created_at: DateTime<Utc>,
    /// Insertion order; stopping an entry moves it to the end
    #[serde(default)]
    pub entries: Vec<TimeEntry>,
}

impl Timesheet {
    pub fn new(id: TimesheetId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
            entries: Vec::new(),
        }
    }

    pub fn entry(&self, id: EntryId) -> Option<&TimeEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn running_entries(&self) -> impl Iterator<Item = &TimeEntry> {
        self.entries.iter().filter(|entry| entry.is_running())
    }

    pub fn total_duration(&self, now: DateTime<Utc>) -> Duration {
        total_duration(&self.entries, now)
    }
}

/// Where the active timesheet sits among all timesheets, newest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// 1-based position of the active timesheet
    pub position: usize,
    pub total: usize,
    /// The next older timesheet
    pub previous: Option<TimesheetId>,
    /// The next newer timesheet
    pub next: Option<TimesheetId>,
}

/// The persisted root: all timesheets plus the active pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetData {
    pub timesheets: Vec<Timesheet>,
    #[serde(default)]
    pub active_timesheet_id: Option<TimesheetId>,
}

impl TimesheetData {
    /// Data holding a single timesheet, which is also active
    pub fn with_timesheet(timesheet: Timesheet) -> Self {
        let active = timesheet.id.clone();
        Self {
            timesheets: vec![timesheet],
            active_timesheet_id: Some(active),
        }
    }

    pub fn find(&self, id: &TimesheetId) -> Option<&Timesheet> {
        self.timesheets.iter().find(|ts| &ts.id == id)
    }

    pub fn find_mut(&mut self, id: &TimesheetId) -> Option<&mut Timesheet> {
        self.timesheets.iter_mut().find(|ts| &ts.id == id)
    }

    pub fn contains(&self, id: &TimesheetId) -> bool {
        self.find(id).is_some()
    }

    pub fn active(&self) -> Option<&Timesheet> {
        let id = self.active_timesheet_id.as_ref()?;
        self.find(id)
    }

    pub fn active_mut(&mut self) -> Option<&mut Timesheet> {
        let id = self.active_timesheet_id.clone()?;
        self.find_mut(&id)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.timesheets.iter().map(|ts| ts.name.as_str())
    }

    /// Timesheets sorted by creation time, newest first (stable for equal times)
    pub fn newest_first(&self) -> Vec<&Timesheet> {
        let mut sorted: Vec<&Timesheet> = self.timesheets.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }

    pub fn navigation(&self) -> Option<Navigation> {
        let active = self.active_timesheet_id.as_ref()?;
        let sorted = self.newest_first();
        let index = sorted.iter().position(|ts| &ts.id == active)?;

        Some(Navigation {
            position: index + 1,
            total: sorted.len(),
            previous: sorted.get(index + 1).map(|ts| ts.id.clone()),
            next: index
                .checked_sub(1)
                .and_then(|i| sorted.get(i))
                .map(|ts| ts.id.clone()),
        })
    }

    /// Restore the invariants after loading: at least one timesheet, and an active
    /// pointer that resolves. Returns true if anything was changed.
    pub fn repair(&mut self, fallback: impl FnOnce() -> Timesheet) -> bool {
        let mut repaired = false;

        if self.timesheets.is_empty() {
            self.timesheets.push(fallback());
            repaired = true;
        }

        if self.active().is_none() {
            self.active_timesheet_id = self.timesheets.first().map(|ts| ts.id.clone());
            repaired = true;
        }

        repaired
    }
}
