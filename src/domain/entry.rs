use super::millis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entry IDs are only unique within their timesheet
pub type EntryId = u64;

/// A single timing record for a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: EntryId,
    /// Task label, may repeat across entries
    pub name: String,
    #[serde(with = "millis")]
    pub start: DateTime<Utc>,
    /// Fixed end time, only meaningful when `is_stopped` is set
    #[serde(default, with = "millis::option", skip_serializing_if = "Option::is_none")]
    pub stop: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_stopped: bool,
}

impl TimeEntry {
    /// Create a running entry
    pub fn running(id: EntryId, name: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            start,
            stop: None,
            is_stopped: false,
        }
    }

    /// The fixed end time, if the entry has been stopped.
    ///
    /// An entry flagged as stopped without a stop time (or the reverse) still counts as
    /// running, so its end follows "now".
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.stop.filter(|_| self.is_stopped)
    }

    pub fn is_running(&self) -> bool {
        self.end().is_none()
    }

    /// Stop this entry at `at`, never earlier than its start
    pub fn stopped_at(self, at: DateTime<Utc>) -> Self {
        let stop = at.max(self.start);
        Self {
            stop: Some(stop),
            is_stopped: true,
            ..self
        }
    }
}
