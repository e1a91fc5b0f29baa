use serde::Serialize;

use super::record::{TaskId, TaskRecord};

/// Severity tier of a record relative to its deadline. Ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Nominal,
    /// At least half of the deadline consumed.
    Halfway,
    /// At least three quarters of the deadline consumed.
    Approaching,
    /// Deadline exceeded.
    Overtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub id: TaskId,
    /// Cycle time the latency was measured at.
    pub at_ns: u64,
    pub latency_ns: u64,
    pub tier: Tier,
}

/// Pure evaluation of one record at `now_ns`.
pub fn assess(record: &TaskRecord, now_ns: u64) -> Assessment {
    let latency_ns = record.latency_at(now_ns);
    Assessment {
        id: record.id,
        at_ns: now_ns,
        latency_ns,
        tier: classify(latency_ns, record.max_latency_ns, record.latency_sensitive),
    }
}

/// Tiers are checked most severe first; the first match wins.
pub fn classify(latency_ns: u64, max_latency_ns: u64, latency_sensitive: bool) -> Tier {
    if !latency_sensitive || max_latency_ns == 0 {
        return Tier::Nominal;
    }
    if latency_ns > max_latency_ns {
        return Tier::Overtime;
    }

    // Widen so the fractional thresholds stay exact for any u64 deadline.
    let latency = latency_ns as u128;
    let max = max_latency_ns as u128;
    if latency * 4 >= max * 3 {
        Tier::Approaching
    } else if latency * 2 >= max {
        Tier::Halfway
    } else {
        Tier::Nominal
    }
}
