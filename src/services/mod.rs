pub mod event_log;
pub mod recorder;
pub mod sink;
pub mod stats;

pub use event_log::EventLog;
pub use recorder::EventRecorder;
pub use sink::{DatabaseSink, EventSink};
