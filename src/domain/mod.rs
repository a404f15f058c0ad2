pub mod entry;
pub mod ids;
pub mod millis;
pub mod time;
pub mod timesheet;

pub use entry::{EntryId, TimeEntry};
pub use ids::{generate_timesheet_id, next_entry_id, timesheet_name};
pub use time::{
    duration_of, format_duration, format_duration_verbose, format_percent,
    format_timesheet_date, local_date, total_duration,
};
pub use timesheet::{Navigation, Timesheet, TimesheetData, TimesheetId, DEFAULT_TIMESHEET_NAME};
