use std::collections::VecDeque;

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};

const MAX_EVENTS: usize = 10_000;

#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<TelemetryEvent>,
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(MAX_EVENTS),
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        if self.buffer.len() >= MAX_EVENTS {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    pub fn events(&self) -> impl Iterator<Item = &TelemetryEvent> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.buffer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Summary over the buffered window, emitted when the loop stops.
    pub fn aggregate_session(&self) -> TelemetryEvent {
        let snap = self.snapshot();
        let cycles = snap.cycle_stats.completed;

        let overtime_ratio = if cycles > 0 {
            snap.cycle_stats.overtime_cycles as f32 / cycles as f32
        } else {
            0.0
        };

        TelemetryEvent::SessionSummary {
            cycles,
            overtime_ratio,
            throttles: snap.contention_stats.throttled,
            resumes: snap.control_stats.resumed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::record::TaskId;

    #[test]
    fn buffer_is_bounded() {
        let mut recorder = TelemetryRecorder::new();
        for i in 0..(MAX_EVENTS as u32 + 10) {
            recorder.record(TelemetryEvent::Resumed { id: TaskId(i) });
        }
        assert_eq!(recorder.len(), MAX_EVENTS);
        assert_eq!(
            recorder.events().next(),
            Some(&TelemetryEvent::Resumed { id: TaskId(10) })
        );
    }

    #[test]
    fn empty_session_has_zero_ratio() {
        let recorder = TelemetryRecorder::new();
        match recorder.aggregate_session() {
            TelemetryEvent::SessionSummary {
                cycles,
                overtime_ratio,
                ..
            } => {
                assert_eq!(cycles, 0);
                assert_eq!(overtime_ratio, 0.0);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
