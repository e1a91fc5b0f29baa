#![allow(dead_code)]

use tempo::config::SchedulerConfig;
use tempo::control::RecordingControl;
use tempo::kernel::time::ManualClock;
use tempo::registry::InMemoryRegistry;
use tempo::{Reactor, TaskRecord};

pub const SECOND: u64 = 1_000_000_000;
pub const MILLI: u64 = 1_000_000;
pub const NOW: u64 = 1_000 * SECOND;

/// A reactor wired to in-process registry, control and clock, with handles
/// kept for the test to drive and inspect them.
pub struct Harness {
    pub reactor: Reactor,
    pub registry: InMemoryRegistry,
    pub control: RecordingControl,
    pub clock: ManualClock,
}

impl Harness {
    /// Every record starts out as a live process.
    pub fn new(records: Vec<TaskRecord>) -> Self {
        Self::with_config(records, SchedulerConfig::default())
    }

    pub fn with_config(records: Vec<TaskRecord>, config: SchedulerConfig) -> Self {
        let control = RecordingControl::new();
        for record in &records {
            control.spawn(record.id);
        }
        let registry = InMemoryRegistry::with_records(records);
        let clock = ManualClock::at(NOW);

        let reactor = Reactor::new(
            Box::new(registry.clone()),
            Box::new(control.clone()),
            Box::new(clock.clone()),
            &config,
        );

        Self {
            reactor,
            registry,
            control,
            clock,
        }
    }
}
