use std::collections::BTreeSet;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::evaluator::{self, Tier};
use super::record::{TaskId, TaskRecord, HIGHEST_CLASS, LOWEST_CLASS};
use super::report::{Adjustment, CycleReport};
use super::scheduler::{Scheduler, SideEffect};
use super::telemetry::event::{ControlOp, SkipReason, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use super::time::{Clock, Cycle};
use crate::config::SchedulerConfig;
use crate::control::{PriorityController, ProcessControl};
use crate::registry::TaskRegistry;

/// The scheduler loop: snapshot, evaluate, act, sleep.
pub struct Reactor {
    registry: Box<dyn TaskRegistry>,
    controller: PriorityController,
    clock: Box<dyn Clock>,
    pub scheduler: Scheduler,
    pub telemetry: TelemetryRecorder,
    pub cycle: Cycle,
    interval: Duration,
    /// Tasks this reactor stopped and has not yet continued.
    suspended: BTreeSet<TaskId>,
}

impl Reactor {
    pub fn new(
        registry: Box<dyn TaskRegistry>,
        control: Box<dyn ProcessControl>,
        clock: Box<dyn Clock>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            registry,
            controller: PriorityController::new(control, config.throttle()),
            clock,
            scheduler: Scheduler::from_config(config),
            telemetry: TelemetryRecorder::new(),
            cycle: Cycle::new(),
            interval: config.interval(),
            suspended: BTreeSet::new(),
        }
    }

    /// Tasks stopped by a `Suspend` effect that are still awaiting a resume.
    pub fn suspended(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.suspended.iter().copied()
    }

    /// One evaluation pass over every registry record.
    ///
    /// Time is captured once at the start. Dead and invalid records are skipped
    /// but stay in the registry. When no record went overtime the pass ends
    /// with a global resume.
    pub async fn cycle_step(&mut self) -> CycleReport {
        self.cycle = self.cycle.next();
        let now_ns = self.clock.now_ns();
        let mut report = CycleReport::new(self.cycle, now_ns);

        let snapshot = match self.registry.snapshot() {
            Ok(records) => records,
            Err(e) => {
                error!(registry = %self.registry.describe(), error = %e, "Registry snapshot failed, skipping cycle");
                report.abandoned = true;
                self.telemetry
                    .record(TelemetryEvent::CycleAbandoned { cycle: self.cycle });
                return report;
            }
        };

        let mut records: Vec<TaskRecord> = Vec::with_capacity(snapshot.len());
        for record in snapshot {
            match record.validate() {
                Ok(()) => records.push(record),
                Err(e) => {
                    warn!(error = %e, "Skipping invalid registry record");
                    report.invalid.push(record.id);
                    self.telemetry.record(TelemetryEvent::RecordSkipped {
                        id: record.id,
                        reason: SkipReason::Invalid,
                    });
                }
            }
        }

        // === EVALUATE + ACT ===
        for record in &records {
            if !self.controller.probe_alive(record.id) {
                report.skipped_dead.push(record.id);
                self.telemetry.record(TelemetryEvent::RecordSkipped {
                    id: record.id,
                    reason: SkipReason::Dead,
                });
                continue;
            }
            report.evaluated += 1;

            let assessment = evaluator::assess(record, now_ns);
            if assessment.tier == Tier::Overtime {
                info!(
                    task = %record.id,
                    latency_ns = assessment.latency_ns,
                    max_latency_ns = record.max_latency_ns,
                    "Task exceeded max latency, prioritizing"
                );
                report.overtime.push(record.id);
            }

            for effect in self.scheduler.schedule(record, &assessment, &records) {
                self.apply(effect, &mut report).await;
            }
        }

        // === GLOBAL RESUME ===
        if !report.overtime_detected() {
            self.global_resume(&records, &mut report);
        }

        self.telemetry.record(TelemetryEvent::CycleCompleted {
            cycle: self.cycle,
            evaluated: report.evaluated,
            overtime: report.overtime.len(),
            global_resume: report.global_resume,
        });

        report
    }

    async fn apply(&mut self, effect: SideEffect, report: &mut CycleReport) {
        trace!(?effect, task = %effect.target(), "Applying side effect");
        match effect {
            SideEffect::Throttle { target, offender } => {
                if !self.controller.probe_alive(target) {
                    return;
                }
                self.controller.throttle(target).await;
                report.throttled.push(target);
                self.telemetry.record(TelemetryEvent::Throttled {
                    id: target,
                    offender,
                    duration_ms: self.controller.throttle_duration().as_millis() as u64,
                });
            }
            SideEffect::Suspend { target, offender } => {
                if !self.controller.probe_alive(target) {
                    return;
                }
                if self.controller.pause(target) {
                    self.suspended.insert(target);
                    report.suspended.push(target);
                    self.telemetry
                        .record(TelemetryEvent::Suspended { id: target, offender });
                } else {
                    self.telemetry.record(TelemetryEvent::ControlFailure {
                        id: target,
                        op: ControlOp::Pause,
                    });
                }
            }
            SideEffect::SetPriority { id, tier, value } => {
                let applied = self.controller.set_priority(id, value);
                report.adjustments.push(Adjustment {
                    id,
                    tier,
                    value,
                    applied,
                });
                self.telemetry.record(if applied {
                    TelemetryEvent::PriorityAdjusted { id, tier, value }
                } else {
                    TelemetryEvent::ControlFailure {
                        id,
                        op: ControlOp::SetPriority,
                    }
                });
            }
        }
    }

    /// Resumes every live record, most important class first, then any task
    /// this reactor suspended that has since left the registry.
    fn global_resume(&mut self, records: &[TaskRecord], report: &mut CycleReport) {
        debug!(cycle = self.cycle.number, "Resuming all paused tasks");
        report.global_resume = true;

        for class in HIGHEST_CLASS..=LOWEST_CLASS {
            for record in records.iter().filter(|r| r.priority_class == class) {
                self.resume_one(record.id, report);
            }
        }

        let orphans: Vec<TaskId> = self
            .suspended
            .iter()
            .copied()
            .filter(|id| !records.iter().any(|r| r.id == *id))
            .collect();
        for id in orphans {
            self.resume_one(id, report);
        }
    }

    /// Continues every task still held by a `Suspend` effect.
    ///
    /// Called when the loop stops, so no contender stays stopped after the scheduler exits.
    pub fn release_suspended(&mut self) -> Vec<TaskId> {
        let held: Vec<TaskId> = self.suspended.iter().copied().collect();
        if !held.is_empty() {
            info!(count = held.len(), "Releasing suspended tasks");
        }
        let mut report = CycleReport::new(self.cycle, self.clock.now_ns());
        for id in held {
            self.resume_one(id, &mut report);
        }
        report.resumed
    }

    fn resume_one(&mut self, id: TaskId, report: &mut CycleReport) {
        if !self.controller.probe_alive(id) {
            self.suspended.remove(&id);
            return;
        }
        if self.controller.resume(id) {
            self.suspended.remove(&id);
            report.resumed.push(id);
            self.telemetry.record(TelemetryEvent::Resumed { id });
        } else {
            self.telemetry.record(TelemetryEvent::ControlFailure {
                id,
                op: ControlOp::Resume,
            });
        }
    }

    /// Async driver loop. Runs until `shutdown` is cancelled.
    ///
    /// Cancellation is honoured between passes and during the inter-cycle
    /// sleep; a pass that has started (throttles included) always completes.
    /// Suspended contenders are continued before returning.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!(
            registry = %self.registry.describe(),
            interval = ?self.interval,
            throttle = ?self.controller.throttle_duration(),
            contention = ?self.scheduler.contention(),
            "Scheduler loop started"
        );

        while !shutdown.is_cancelled() {
            let report = self.cycle_step().await;
            debug!(
                cycle = report.cycle.number,
                evaluated = report.evaluated,
                overtime = report.overtime.len(),
                throttled = report.throttled.len(),
                resumed = report.resumed.len(),
                "Cycle complete"
            );

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = sleep(self.interval) => {}
            }
        }

        self.release_suspended();

        let summary = self.telemetry.aggregate_session();
        info!(?summary, "Scheduler loop stopped");
        self.telemetry.record(summary);
    }
}
