mod common;

use std::time::Duration;

use common::{Harness, NOW, SECOND};
use tempo::config::ContentionPolicy;
use tempo::control::mock::ControlCall;
use tempo::control::ProcessControl;
use tempo::{SchedulerConfig, TaskId, TaskRecord};
use tokio_util::sync::CancellationToken;

fn suspend_harness(records: Vec<TaskRecord>) -> Harness {
    let config = SchedulerConfig {
        contention: ContentionPolicy::Suspend,
        ..Default::default()
    };
    Harness::with_config(records, config)
}

#[tokio::test(start_paused = true)]
async fn test_paused_task_resumed_when_nothing_is_overtime() {
    // D was paused by an earlier escalation; this cycle is calm.
    let d = TaskRecord::background(700, 4);
    let calm = TaskRecord::sensitive(701, 1, SECOND, NOW - 100_000_000);
    let mut h = Harness::new(vec![d, calm]);
    h.control.pause(TaskId(700)).unwrap();
    assert!(h.control.is_paused(TaskId(700)));

    let report = h.reactor.cycle_step().await;

    assert!(report.global_resume);
    assert!(!h.control.is_paused(TaskId(700)));
    // Most important class first.
    assert_eq!(report.resumed, vec![TaskId(701), TaskId(700)]);
}

#[tokio::test(start_paused = true)]
async fn test_no_resume_while_any_task_is_overtime() {
    let offender = TaskRecord::sensitive(1, 1, SECOND, NOW - 2 * SECOND);
    let paused = TaskRecord::background(2, 1);
    let mut h = Harness::new(vec![offender, paused]);
    h.control.pause(TaskId(2)).unwrap();

    let report = h.reactor.cycle_step().await;

    assert!(report.overtime_detected());
    assert!(!report.global_resume);
    assert!(h.control.is_paused(TaskId(2)));
}

#[tokio::test(start_paused = true)]
async fn test_suspended_contender_resumed_once_deadline_is_met() {
    let offender = TaskRecord::sensitive(1, 1, SECOND, NOW - 2 * SECOND);
    let contender = TaskRecord::background(2, 5);
    let config = SchedulerConfig {
        contention: ContentionPolicy::Suspend,
        ..Default::default()
    };
    let mut h = Harness::with_config(vec![offender, contender], config);

    let first = h.reactor.cycle_step().await;
    assert_eq!(first.suspended, vec![TaskId(2)]);
    assert!(h.control.is_paused(TaskId(2)));

    // The registrar starts a fresh measurement for the offender.
    h.clock.advance(5 * SECOND);
    h.registry
        .upsert(TaskRecord::sensitive(1, 1, SECOND, NOW + 5 * SECOND));

    let second = h.reactor.cycle_step().await;
    assert!(!second.overtime_detected());
    assert!(second.resumed.contains(&TaskId(2)));
    assert!(!h.control.is_paused(TaskId(2)));
}

#[tokio::test(start_paused = true)]
async fn test_resume_on_running_task_changes_nothing() {
    let mut h = Harness::new(vec![TaskRecord::background(800, 2)]);

    for _ in 0..3 {
        let report = h.reactor.cycle_step().await;
        assert_eq!(report.resumed, vec![TaskId(800)]);
    }

    assert!(!h.control.is_paused(TaskId(800)));
    assert!(h.control.probe_alive(TaskId(800)));
    assert_eq!(h.control.priority(TaskId(800)), None);
    assert_eq!(h.reactor.telemetry.snapshot().control_stats.failures, 0);
}

#[tokio::test(start_paused = true)]
async fn test_dead_records_are_never_removed() {
    let dead = TaskRecord::sensitive(900, 1, SECOND, NOW - 10 * SECOND);
    let live = TaskRecord::background(901, 3);
    let mut h = Harness::new(vec![dead, live]);
    h.control.kill(TaskId(900));

    for _ in 0..5 {
        let report = h.reactor.cycle_step().await;
        assert_eq!(report.skipped_dead, vec![TaskId(900)]);
        // A dead overtime record does not block the global resume.
        assert!(report.global_resume);
        h.clock.advance(5 * SECOND);
    }

    assert!(h.registry.contains(TaskId(900)));
    assert_eq!(h.registry.len(), 2);
    assert!(h.control.calls().iter().all(|call| !matches!(
        call,
        ControlCall::Pause(TaskId(900))
            | ControlCall::Resume(TaskId(900))
            | ControlCall::SetPriority(TaskId(900), _)
    )));
    assert_eq!(h.reactor.telemetry.snapshot().control_stats.skipped_dead, 5);
}

#[tokio::test(start_paused = true)]
async fn test_resume_failure_does_not_stop_the_sweep() {
    let records = vec![
        TaskRecord::background(1, 1),
        TaskRecord::background(2, 2),
        TaskRecord::background(3, 3),
    ];
    let mut h = Harness::new(records);
    h.control.fail_for(TaskId(2));

    let report = h.reactor.cycle_step().await;

    assert_eq!(report.resumed, vec![TaskId(1), TaskId(3)]);
    assert_eq!(h.reactor.telemetry.snapshot().control_stats.failures, 1);
}

#[tokio::test(start_paused = true)]
async fn test_stopping_the_loop_continues_suspended_contenders() {
    // The offender never recovers, so no cycle ever reaches the global resume.
    let offender = TaskRecord::sensitive(1, 1, SECOND, NOW - 2 * SECOND);
    let mut h = suspend_harness(vec![offender, TaskRecord::background(2, 5)]);
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        trigger.cancel();
    });

    h.reactor.run(shutdown).await;

    assert!(!h.control.is_paused(TaskId(2)));
    assert!(h.reactor.suspended().next().is_none());
    assert_eq!(h.control.calls().last(), Some(&ControlCall::Resume(TaskId(2))));
}

#[tokio::test(start_paused = true)]
async fn test_single_pass_release_continues_suspended_contenders() {
    let offender = TaskRecord::sensitive(1, 1, SECOND, NOW - 2 * SECOND);
    let mut h = suspend_harness(vec![offender, TaskRecord::background(2, 4)]);

    let report = h.reactor.cycle_step().await;
    assert_eq!(report.suspended, vec![TaskId(2)]);
    assert_eq!(h.reactor.suspended().collect::<Vec<_>>(), vec![TaskId(2)]);

    let released = h.reactor.release_suspended();

    assert_eq!(released, vec![TaskId(2)]);
    assert!(!h.control.is_paused(TaskId(2)));
    assert!(h.reactor.suspended().next().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_suspended_contender_resumed_after_leaving_registry() {
    let offender = TaskRecord::sensitive(1, 1, SECOND, NOW - 2 * SECOND);
    let mut h = suspend_harness(vec![offender, TaskRecord::background(2, 5)]);

    let first = h.reactor.cycle_step().await;
    assert_eq!(first.suspended, vec![TaskId(2)]);

    // The registrar drops the contender while it is stopped, and the
    // offender starts a fresh measurement.
    h.registry.remove(TaskId(2));
    h.clock.advance(5 * SECOND);
    h.registry
        .upsert(TaskRecord::sensitive(1, 1, SECOND, NOW + 5 * SECOND));

    let second = h.reactor.cycle_step().await;

    assert!(second.global_resume);
    assert_eq!(second.resumed, vec![TaskId(1), TaskId(2)]);
    assert!(!h.control.is_paused(TaskId(2)));
    assert!(h.reactor.suspended().next().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_failed_resume_keeps_task_held_for_next_attempt() {
    let offender = TaskRecord::sensitive(1, 1, SECOND, NOW - 2 * SECOND);
    let mut h = suspend_harness(vec![offender, TaskRecord::background(2, 5)]);
    h.reactor.cycle_step().await;

    h.control.fail_for(TaskId(2));
    assert!(h.reactor.release_suspended().is_empty());
    assert_eq!(h.reactor.suspended().collect::<Vec<_>>(), vec![TaskId(2)]);
    assert!(h.control.is_paused(TaskId(2)));
}
