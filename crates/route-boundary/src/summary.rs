use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::average_interval;
use crate::ping::{GpsPing, IgnitionEvent};

/// Descriptive statistics for a ping sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub ignition_on: usize,
    pub ignition_off: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    /// Average gap between consecutive pings, in whole seconds.
    pub average_interval_secs: Option<u64>,
}

impl RouteSummary {
    #[must_use]
    pub fn from_pings(pings: &[GpsPing]) -> Self {
        let count = |event: IgnitionEvent| pings.iter().filter(|p| p.ignition == event).count();

        Self {
            ignition_on: count(IgnitionEvent::On),
            ignition_off: count(IgnitionEvent::Off),
            first_timestamp: pings.first().map(|p| p.timestamp),
            last_timestamp: pings.last().map(|p| p.timestamp),
            average_interval_secs: average_interval(pings).map(|interval| interval.as_secs()),
        }
    }
}
