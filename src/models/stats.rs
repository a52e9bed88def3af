use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type Counters = BTreeMap<String, u64>;

/// Body of `GET /stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    pub totals: Counters,
    pub accepted: Counters,
    pub rejected: Counters,
}

impl StatsReport {
    /// Report served when no database is connected: every map empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Starting point of a fold: the fixed buckets present at zero.
    pub fn zeroed() -> Self {
        let accepted = [("option_selected", 0), ("thumbs_up", 0)];
        let rejected = [("options_ignored", 0), ("thumbs_down", 0)];

        Self {
            totals: Counters::new(),
            accepted: accepted.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            rejected: rejected.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }
}
