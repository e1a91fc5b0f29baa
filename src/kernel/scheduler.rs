use super::evaluator::{self, Assessment, Tier};
use super::record::{TaskId, TaskRecord};
use crate::config::{ContentionPolicy, PriorityLevels, SchedulerConfig};

/// Escalation policy. Holds no state between calls.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    levels: PriorityLevels,
    contention: ContentionPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Hold up the loop on behalf of a lower-priority contender.
    Throttle { target: TaskId, offender: TaskId },
    /// Stop a lower-priority contender until the next global resume.
    Suspend { target: TaskId, offender: TaskId },
    SetPriority { id: TaskId, tier: Tier, value: i32 },
}

impl SideEffect {
    pub fn target(&self) -> TaskId {
        match *self {
            SideEffect::Throttle { target, .. } | SideEffect::Suspend { target, .. } => target,
            SideEffect::SetPriority { id, .. } => id,
        }
    }
}

impl Scheduler {
    pub fn new(levels: PriorityLevels, contention: ContentionPolicy) -> Self {
        Self { levels, contention }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.priority, config.contention)
    }

    pub fn contention(&self) -> ContentionPolicy {
        self.contention
    }

    /// Pure projection: one assessed record + the cycle's records -> ordered side effects.
    ///
    /// For an overtime record every contender effect precedes the priority
    /// boost. Contenders are every other record of strictly lower importance,
    /// most important first; liveness is checked when the effect is applied.
    /// Under `Suspend`, a contender that is itself overtime is left running so
    /// its own boost is not applied to a stopped process.
    pub fn schedule(
        &self,
        record: &TaskRecord,
        assessment: &Assessment,
        snapshot: &[TaskRecord],
    ) -> Vec<SideEffect> {
        let id = record.id;

        match assessment.tier {
            Tier::Nominal => Vec::new(),
            Tier::Halfway => vec![SideEffect::SetPriority {
                id,
                tier: Tier::Halfway,
                value: self.levels.halfway,
            }],
            Tier::Approaching => vec![SideEffect::SetPriority {
                id,
                tier: Tier::Approaching,
                value: self.levels.approaching,
            }],
            Tier::Overtime => {
                let mut contenders: Vec<&TaskRecord> = snapshot
                    .iter()
                    .filter(|other| other.id != id && record.outranks(other))
                    .filter(|other| {
                        self.contention != ContentionPolicy::Suspend
                            || evaluator::assess(other, assessment.at_ns).tier != Tier::Overtime
                    })
                    .collect();
                contenders.sort_by_key(|other| other.priority_class);

                let mut effects: Vec<SideEffect> = contenders
                    .into_iter()
                    .map(|other| match self.contention {
                        ContentionPolicy::Throttle => SideEffect::Throttle {
                            target: other.id,
                            offender: id,
                        },
                        ContentionPolicy::Suspend => SideEffect::Suspend {
                            target: other.id,
                            offender: id,
                        },
                    })
                    .collect();

                effects.push(SideEffect::SetPriority {
                    id,
                    tier: Tier::Overtime,
                    value: self.levels.overtime,
                });
                effects
            }
        }
    }
}
