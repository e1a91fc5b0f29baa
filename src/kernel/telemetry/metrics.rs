use std::collections::VecDeque;

use super::event::{SkipReason, TelemetryEvent};
use crate::kernel::evaluator::Tier;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub cycle_stats: CycleStats,
    pub contention_stats: ContentionStats,
    pub priority_stats: PriorityStats,
    pub control_stats: ControlStats,
}

#[derive(Debug, Clone, Default)]
pub struct CycleStats {
    pub completed: u64,
    pub abandoned: u64,
    pub overtime_cycles: u64,
    pub global_resumes: u64,
    pub total_evaluated: u64,
    pub avg_evaluated: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ContentionStats {
    pub throttled: u64,
    pub suspended: u64,
    pub total_throttle_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PriorityStats {
    pub overtime_boosts: u64,
    pub approaching_boosts: u64,
    pub halfway_resets: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ControlStats {
    pub resumed: u64,
    pub failures: u64,
    pub skipped_dead: u64,
    pub skipped_invalid: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::CycleCompleted {
                evaluated,
                overtime,
                global_resume,
                ..
            } => {
                snap.cycle_stats.completed += 1;
                snap.cycle_stats.total_evaluated += *evaluated as u64;
                if *overtime > 0 {
                    snap.cycle_stats.overtime_cycles += 1;
                }
                if *global_resume {
                    snap.cycle_stats.global_resumes += 1;
                }
            }
            TelemetryEvent::CycleAbandoned { .. } => snap.cycle_stats.abandoned += 1,
            TelemetryEvent::RecordSkipped { reason, .. } => match reason {
                SkipReason::Dead => snap.control_stats.skipped_dead += 1,
                SkipReason::Invalid => snap.control_stats.skipped_invalid += 1,
            },
            TelemetryEvent::Throttled { duration_ms, .. } => {
                snap.contention_stats.throttled += 1;
                snap.contention_stats.total_throttle_ms += duration_ms;
            }
            TelemetryEvent::Suspended { .. } => snap.contention_stats.suspended += 1,
            TelemetryEvent::PriorityAdjusted { tier, .. } => match tier {
                Tier::Overtime => snap.priority_stats.overtime_boosts += 1,
                Tier::Approaching => snap.priority_stats.approaching_boosts += 1,
                Tier::Halfway => snap.priority_stats.halfway_resets += 1,
                Tier::Nominal => {}
            },
            TelemetryEvent::Resumed { .. } => snap.control_stats.resumed += 1,
            TelemetryEvent::ControlFailure { .. } => snap.control_stats.failures += 1,
            TelemetryEvent::SessionSummary { .. } => {}
        }
    }

    if snap.cycle_stats.completed > 0 {
        snap.cycle_stats.avg_evaluated =
            snap.cycle_stats.total_evaluated as f64 / snap.cycle_stats.completed as f64;
    }

    snap
}
