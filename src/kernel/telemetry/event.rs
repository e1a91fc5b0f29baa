use serde::Serialize;

use crate::kernel::evaluator::Tier;
use crate::kernel::record::TaskId;
use crate::kernel::time::Cycle;

// Allowed: IDs, Cycles, Durations, Counts, Enums

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TelemetryEvent {
    CycleCompleted {
        cycle: Cycle,
        evaluated: usize,
        overtime: usize,
        global_resume: bool,
    },

    /// Registry snapshot failed; the pass was not run.
    CycleAbandoned {
        cycle: Cycle,
    },

    RecordSkipped {
        id: TaskId,
        reason: SkipReason,
    },

    Throttled {
        id: TaskId,
        offender: TaskId,
        duration_ms: u64,
    },

    Suspended {
        id: TaskId,
        offender: TaskId,
    },

    PriorityAdjusted {
        id: TaskId,
        tier: Tier,
        value: i32,
    },

    Resumed {
        id: TaskId,
    },

    ControlFailure {
        id: TaskId,
        op: ControlOp,
    },

    SessionSummary {
        cycles: u64,
        overtime_ratio: f32,
        throttles: u64,
        resumes: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    Dead,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControlOp {
    Pause,
    Resume,
    SetPriority,
}
