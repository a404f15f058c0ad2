//! A local, multi-timesheet task timer.
//!
//! [`store::TimesheetStore`] owns every timesheet and applies the operations (start, stop,
//! restart, delete entries; create, rename, select, delete timesheets), persisting each
//! change through a [`persistence::KeyValueStore`]. Durations are always computed against
//! an explicit `now` from a [`clock::Clock`].

pub mod clock;
pub mod config;
pub mod domain;
pub mod logging;
pub mod persistence;
pub mod report;
pub mod store;
pub mod ticker;
