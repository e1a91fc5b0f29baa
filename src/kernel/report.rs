use serde::Serialize;

use super::evaluator::Tier;
use super::record::TaskId;
use super::time::Cycle;

/// Priority change attempted during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Adjustment {
    pub id: TaskId,
    pub tier: Tier,
    pub value: i32,
    /// Whether the OS accepted the change.
    pub applied: bool,
}

/// Outcome of one evaluation pass, consumed by the loop driver.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub cycle: Cycle,
    pub now_ns: u64,
    /// Registry snapshot failed and no record was looked at.
    pub abandoned: bool,
    pub evaluated: usize,
    pub skipped_dead: Vec<TaskId>,
    pub invalid: Vec<TaskId>,
    pub overtime: Vec<TaskId>,
    pub throttled: Vec<TaskId>,
    pub suspended: Vec<TaskId>,
    pub adjustments: Vec<Adjustment>,
    pub global_resume: bool,
    pub resumed: Vec<TaskId>,
}

impl CycleReport {
    pub fn new(cycle: Cycle, now_ns: u64) -> Self {
        Self {
            cycle,
            now_ns,
            ..Self::default()
        }
    }

    pub fn overtime_detected(&self) -> bool {
        !self.overtime.is_empty()
    }

    pub fn adjustment_for(&self, id: TaskId) -> Option<&Adjustment> {
        self.adjustments.iter().find(|a| a.id == id)
    }
}
