pub mod event;
pub mod stats;

pub use event::{Event, EventKindRow, NewEvent, RecentEvent};
pub use stats::StatsReport;
