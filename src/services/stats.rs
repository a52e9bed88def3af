use serde_json::Value;

use crate::models::event::is_truthy;
use crate::models::stats::Counters;
use crate::models::{EventKindRow, StatsReport};

pub const OPTION_SELECTED: &str = "task.option_selected";
pub const OPTIONS_IGNORED: &str = "task.options_ignored";
pub const FEEDBACK: &str = "task.feedback";

/// Key under which rows without an event type are totalled.
const UNTYPED_KEY: &str = "null";

/// Folds rows into per-type totals and the accepted/rejected buckets in a
/// single pass.
pub fn aggregate<'a, I>(rows: I) -> StatsReport
where
    I: IntoIterator<Item = &'a EventKindRow>,
{
    let mut report = StatsReport::zeroed();

    for row in rows {
        let event_type = row.event_type.as_deref();
        *report
            .totals
            .entry(event_type.unwrap_or(UNTYPED_KEY).to_string())
            .or_insert(0) += 1;

        match event_type {
            Some(OPTION_SELECTED) => bump(&mut report.accepted, "option_selected"),
            Some(OPTIONS_IGNORED) => bump(&mut report.rejected, "options_ignored"),
            Some(FEEDBACK) => match feedback_kind(row.properties.as_ref()) {
                Some("thumbs_up") => bump(&mut report.accepted, "thumbs_up"),
                Some("thumbs_down") => bump(&mut report.rejected, "thumbs_down"),
                _ => {}
            },
            _ => {}
        }
    }

    report
}

fn bump(counters: &mut Counters, key: &str) {
    *counters.entry(key.to_string()).or_insert(0) += 1;
}

/// Reads `feedbackType`, falling back to `feedback_type` when the first is
/// missing or empty.
fn feedback_kind(properties: Option<&Value>) -> Option<&str> {
    let properties = properties?.as_object()?;
    properties
        .get("feedbackType")
        .filter(|value| is_truthy(value))
        .or_else(|| properties.get("feedback_type"))
        .and_then(Value::as_str)
}
