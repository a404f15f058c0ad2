use crate::clock::Clock;
use crate::domain::{
    generate_timesheet_id, local_date, next_entry_id, timesheet_name, EntryId, Navigation,
    TimeEntry, Timesheet, TimesheetData, TimesheetId,
};
use crate::persistence::{self, KeyValueStore};
use chrono::{DateTime, SubsecRound, Utc};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Rejected user input. The operation that returned it changed nothing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("Name must not be empty")]
    EmptyName,
    #[error("No active timesheet")]
    NoActiveTimesheet,
}

/// Handle returned by [`TimesheetStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&TimesheetData)>;

/// Trim a user-supplied name, rejecting names that are empty after trimming
pub fn validate_name(name: &str) -> Result<&str, InputError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(InputError::EmptyName)
    } else {
        Ok(trimmed)
    }
}

/// Owner of all timesheets and the active pointer.
///
/// Every operation computes its complete new state before returning, then persists it
/// through the key-value store and notifies subscribers. Referential misses (unknown
/// timesheet or entry IDs) are no-ops reported through the `bool` return value.
pub struct TimesheetStore<K: KeyValueStore, C: Clock> {
    data: TimesheetData,
    kv: K,
    clock: C,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<K: KeyValueStore, C: Clock> TimesheetStore<K, C> {
    /// Load (or migrate, or default) the stored state and write it straight back so the
    /// store always starts from persisted data.
    pub fn open(mut kv: K, clock: C) -> Self {
        let now = clock.now().trunc_subsecs(3);
        let data = persistence::load(&mut kv, now);
        persistence::save(&mut kv, &data);

        Self {
            data,
            kv,
            clock,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current time at the millisecond precision that storage keeps
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    /// Read-only snapshot of the full state
    pub fn data(&self) -> &TimesheetData {
        &self.data
    }

    pub fn active_timesheet(&self) -> Option<&Timesheet> {
        self.data.active()
    }

    pub fn navigation(&self) -> Option<Navigation> {
        self.data.navigation()
    }

    pub fn storage(&self) -> &K {
        &self.kv
    }

    /// Register a listener called with the new state after every change
    pub fn subscribe(&mut self, listener: impl FnMut(&TimesheetData) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Pick up changes another process saved since this store last read or wrote.
    ///
    /// Nothing is written back. Unreadable or missing storage keeps the in-memory state.
    /// Returns true (and notifies subscribers) if the state changed.
    pub fn reload(&mut self) -> bool {
        let now = self.now();
        let Some(data) = persistence::read_current(&self.kv, now) else {
            return false;
        };
        if data == self.data {
            return false;
        }

        debug!("Reloaded timesheet data changed in storage");
        self.data = data;
        self.notify();
        true
    }

    // ---- Timesheets ----

    /// Append a new empty timesheet named after today's date and make it active
    pub fn create_new_timesheet(&mut self) -> TimesheetId {
        let now = self.now();
        let name = timesheet_name(local_date(now), self.data.names());

        let mut id = generate_timesheet_id(now);
        while self.data.contains(&id) {
            id = generate_timesheet_id(now);
        }

        debug!(%id, %name, "Creating timesheet");
        self.data.timesheets.push(Timesheet::new(id.clone(), name, now));
        self.data.active_timesheet_id = Some(id.clone());
        self.commit();
        id
    }

    /// Make `id` the active timesheet. Unknown IDs are ignored.
    pub fn select_timesheet(&mut self, id: &TimesheetId) -> bool {
        if !self.data.contains(id) {
            debug!(%id, "Select ignored, no such timesheet");
            return false;
        }
        if self.data.active_timesheet_id.as_ref() != Some(id) {
            self.data.active_timesheet_id = Some(id.clone());
            self.commit();
        }
        true
    }

    /// Select the next older timesheet
    pub fn select_previous(&mut self) -> bool {
        match self.data.navigation().and_then(|nav| nav.previous) {
            Some(id) => self.select_timesheet(&id),
            None => false,
        }
    }

    /// Select the next newer timesheet
    pub fn select_next(&mut self) -> bool {
        match self.data.navigation().and_then(|nav| nav.next) {
            Some(id) => self.select_timesheet(&id),
            None => false,
        }
    }

    /// Delete a timesheet. The last remaining timesheet can't be deleted; deleting the
    /// active one activates the first remaining timesheet in stored order.
    pub fn delete_timesheet(&mut self, id: &TimesheetId) -> bool {
        if self.data.timesheets.len() <= 1 {
            debug!(%id, "Delete ignored, last timesheet");
            return false;
        }
        let Some(pos) = self.data.timesheets.iter().position(|ts| &ts.id == id) else {
            debug!(%id, "Delete ignored, no such timesheet");
            return false;
        };

        self.data.timesheets.remove(pos);
        if self.data.active_timesheet_id.as_ref() == Some(id) {
            self.data.active_timesheet_id = self.data.timesheets.first().map(|ts| ts.id.clone());
        }
        self.commit();
        true
    }

    /// Rename a timesheet to the trimmed `name`
    pub fn rename_timesheet(&mut self, id: &TimesheetId, name: &str) -> Result<bool, InputError> {
        let name = validate_name(name)?;
        let Some(timesheet) = self.data.find_mut(id) else {
            debug!(%id, "Rename ignored, no such timesheet");
            return Ok(false);
        };

        timesheet.name = name.to_string();
        self.commit();
        Ok(true)
    }

    // ---- Entries (always on the active timesheet) ----

    /// Start a new running entry for task `name`
    pub fn create_new_entry(&mut self, name: &str) -> Result<EntryId, InputError> {
        let name = validate_name(name)?.to_string();
        self.append_running(name)
            .ok_or(InputError::NoActiveTimesheet)
    }

    /// Start a new running entry for the same task as `entry`
    pub fn new_entry_from(&mut self, entry: &TimeEntry) -> Option<EntryId> {
        self.append_running(entry.name.clone())
    }

    /// `new_entry_from` for an entry of the active timesheet, looked up by ID
    pub fn restart_entry(&mut self, id: EntryId) -> Option<EntryId> {
        let entry = self.active_timesheet()?.entry(id)?.clone();
        self.new_entry_from(&entry)
    }

    /// Stop a running entry. The stopped entry moves to the end of the list.
    pub fn stop_entry(&mut self, id: EntryId) -> bool {
        let now = self.now();
        let Some(timesheet) = self.data.active_mut() else {
            return false;
        };
        let Some(pos) = timesheet.entries.iter().position(|entry| entry.id == id) else {
            debug!(id, "Stop ignored, no such entry");
            return false;
        };
        if !timesheet.entries[pos].is_running() {
            debug!(id, "Stop ignored, entry already stopped");
            return false;
        }

        let entry = timesheet.entries.remove(pos);
        timesheet.entries.push(entry.stopped_at(now));
        self.commit();
        true
    }

    pub fn delete_entry(&mut self, id: EntryId) -> bool {
        let Some(timesheet) = self.data.active_mut() else {
            return false;
        };
        let before = timesheet.entries.len();
        timesheet.entries.retain(|entry| entry.id != id);
        if timesheet.entries.len() == before {
            debug!(id, "Delete ignored, no such entry");
            return false;
        }
        self.commit();
        true
    }

    /// Remove every entry of the active timesheet
    pub fn clear_timesheet(&mut self) -> bool {
        let Some(timesheet) = self.data.active_mut() else {
            return false;
        };
        timesheet.entries.clear();
        self.commit();
        true
    }

    fn append_running(&mut self, name: String) -> Option<EntryId> {
        let now = self.now();
        let timesheet = self.data.active_mut()?;
        let id = next_entry_id(&timesheet.entries);

        debug!(id, %name, "Starting entry");
        timesheet.entries.push(TimeEntry::running(id, name, now));
        self.commit();
        Some(id)
    }

    fn commit(&mut self) {
        persistence::save(&mut self.kv, &self.data);
        self.notify();
    }

    fn notify(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.data);
        }
    }
}

impl<K: KeyValueStore, C: Clock> fmt::Debug for TimesheetStore<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimesheetStore")
            .field("data", &self.data)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
