//! Process-control capability and the best-effort controller built on it.

pub mod mock;
pub mod signal;
pub mod throttle;

use std::time::Duration;

use thiserror::Error;
use tracing::{info, trace, warn};

use crate::kernel::record::TaskId;

pub use mock::RecordingControl;
pub use signal::platform_control;
pub use throttle::throttle;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("no such process: {0}")]
    NoSuchProcess(TaskId),

    #[error("permission denied for task {0}")]
    PermissionDenied(TaskId),

    #[error("os error for task {id}: {source}")]
    Os {
        id: TaskId,
        #[source]
        source: std::io::Error,
    },

    #[error("process control is not supported on this platform")]
    Unsupported,
}

/// OS primitives the scheduler acts through, keyed by task id.
pub trait ProcessControl: Send + Sync {
    fn probe_alive(&self, id: TaskId) -> bool;
    fn pause(&self, id: TaskId) -> Result<(), ControlError>;
    /// Must succeed on a task that is not paused.
    fn resume(&self, id: TaskId) -> Result<(), ControlError>;
    fn set_priority(&self, id: TaskId, value: i32) -> Result<(), ControlError>;
}

/// Wraps a [`ProcessControl`] backend. Every operation is attempted once,
/// failures are logged and reported as `false`, never propagated.
pub struct PriorityController {
    backend: Box<dyn ProcessControl>,
    throttle_for: Duration,
}

impl PriorityController {
    pub fn new(backend: Box<dyn ProcessControl>, throttle_for: Duration) -> Self {
        Self {
            backend,
            throttle_for,
        }
    }

    pub fn throttle_duration(&self) -> Duration {
        self.throttle_for
    }

    pub fn probe_alive(&self, id: TaskId) -> bool {
        let alive = self.backend.probe_alive(id);
        if !alive {
            trace!(task = %id, "task not alive");
        }
        alive
    }

    pub fn pause(&self, id: TaskId) -> bool {
        info!(task = %id, "Pausing task");
        match self.backend.pause(id) {
            Ok(()) => true,
            Err(e) => {
                warn!(task = %id, error = %e, "Failed to pause task");
                false
            }
        }
    }

    pub fn resume(&self, id: TaskId) -> bool {
        info!(task = %id, "Resuming task");
        match self.backend.resume(id) {
            Ok(()) => true,
            Err(e) => {
                warn!(task = %id, error = %e, "Failed to resume task");
                false
            }
        }
    }

    pub fn set_priority(&self, id: TaskId, value: i32) -> bool {
        match self.backend.set_priority(id, value) {
            Ok(()) => {
                info!(task = %id, priority = value, "Priority set");
                true
            }
            Err(e) => {
                warn!(task = %id, priority = value, error = %e, "Failed to set priority");
                false
            }
        }
    }

    /// Holds up the controller for the configured throttle duration on behalf
    /// of `id`. The task itself is not touched.
    pub async fn throttle(&self, id: TaskId) {
        info!(task = %id, duration = ?self.throttle_for, "Throttling lower-priority task");
        throttle(self.throttle_for).await;
    }
}
