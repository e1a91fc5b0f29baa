use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Most important priority class.
pub const HIGHEST_CLASS: u8 = 1;
/// Least important priority class.
pub const LOWEST_CLASS: u8 = 5;

/// Opaque task identifier. Maps onto an OS process id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the external task registry.
///
/// Owned and written by the registrar; the scheduler only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    #[serde(default)]
    pub latency_sensitive: bool,
    /// Deadline in nanoseconds. Must be > 0 for latency-sensitive tasks.
    #[serde(default)]
    pub max_latency_ns: u64,
    #[serde(default)]
    pub start_time_ns: u64,
    #[serde(default)]
    pub end_time_ns: u64,
    /// 1 (most important) ..= 5 (least important).
    pub priority_class: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("task {id}: priority class {class} outside 1..=5")]
    PriorityClass { id: TaskId, class: u8 },
    #[error("task {id}: latency-sensitive with a zero deadline")]
    ZeroDeadline { id: TaskId },
}

impl TaskRecord {
    /// A latency-sensitive record started at `start_time_ns`.
    pub fn sensitive(id: u32, priority_class: u8, max_latency_ns: u64, start_time_ns: u64) -> Self {
        Self {
            id: TaskId(id),
            latency_sensitive: true,
            max_latency_ns,
            start_time_ns,
            end_time_ns: 0,
            priority_class,
        }
    }

    /// A record with no deadline, only a priority class.
    pub fn background(id: u32, priority_class: u8) -> Self {
        Self {
            id: TaskId(id),
            latency_sensitive: false,
            max_latency_ns: 0,
            start_time_ns: 0,
            end_time_ns: 0,
            priority_class,
        }
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if !(HIGHEST_CLASS..=LOWEST_CLASS).contains(&self.priority_class) {
            return Err(RecordError::PriorityClass {
                id: self.id,
                class: self.priority_class,
            });
        }
        if self.latency_sensitive && self.max_latency_ns == 0 {
            return Err(RecordError::ZeroDeadline { id: self.id });
        }
        Ok(())
    }

    /// Elapsed time since the task started. A start in the future counts as zero.
    pub fn latency_at(&self, now_ns: u64) -> u64 {
        now_ns.saturating_sub(self.start_time_ns)
    }

    /// True when `other` is strictly less important than `self`.
    pub fn outranks(&self, other: &TaskRecord) -> bool {
        other.priority_class > self.priority_class
    }
}
