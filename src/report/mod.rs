pub mod render;
pub mod summary;

pub use render::{render_entries, render_header, render_summary, render_timesheet_list};
pub use summary::{summarize, Summary, TaskSummary};
