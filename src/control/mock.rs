use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::time::Instant;

use super::{ControlError, ProcessControl};
use crate::kernel::record::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCall {
    Pause(TaskId),
    Resume(TaskId),
    SetPriority(TaskId, i32),
}

/// A control call and the (tokio) instant it was issued at.
#[derive(Debug, Clone, Copy)]
pub struct Recorded {
    pub at: Instant,
    pub call: ControlCall,
}

#[derive(Debug, Default)]
struct MockState {
    alive: HashSet<TaskId>,
    paused: HashSet<TaskId>,
    failing: HashSet<TaskId>,
    priorities: HashMap<TaskId, i32>,
    calls: Vec<Recorded>,
}

/// In-process stand-in for the OS. Clones share state, so a test keeps one
/// handle while the scheduler owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingControl {
    state: Arc<Mutex<MockState>>,
}

impl RecordingControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Marks `id` as a live process.
    pub fn spawn(&self, id: TaskId) {
        self.lock().alive.insert(id);
    }

    /// Marks `id` as exited.
    pub fn kill(&self, id: TaskId) {
        let mut state = self.lock();
        state.alive.remove(&id);
        state.paused.remove(&id);
    }

    /// Every pause/resume/set_priority on `id` fails with `PermissionDenied`.
    pub fn fail_for(&self, id: TaskId) {
        self.lock().failing.insert(id);
    }

    pub fn is_paused(&self, id: TaskId) -> bool {
        self.lock().paused.contains(&id)
    }

    pub fn priority(&self, id: TaskId) -> Option<i32> {
        self.lock().priorities.get(&id).copied()
    }

    pub fn calls(&self) -> Vec<ControlCall> {
        self.lock().calls.iter().map(|r| r.call).collect()
    }

    pub fn timeline(&self) -> Vec<Recorded> {
        self.lock().calls.clone()
    }

    fn act(
        &self,
        id: TaskId,
        call: ControlCall,
        apply: impl FnOnce(&mut MockState),
    ) -> Result<(), ControlError> {
        let mut state = self.lock();
        state.calls.push(Recorded {
            at: Instant::now(),
            call,
        });
        if !state.alive.contains(&id) {
            return Err(ControlError::NoSuchProcess(id));
        }
        if state.failing.contains(&id) {
            return Err(ControlError::PermissionDenied(id));
        }
        apply(&mut *state);
        Ok(())
    }
}

impl ProcessControl for RecordingControl {
    fn probe_alive(&self, id: TaskId) -> bool {
        self.lock().alive.contains(&id)
    }

    fn pause(&self, id: TaskId) -> Result<(), ControlError> {
        self.act(id, ControlCall::Pause(id), |s| {
            s.paused.insert(id);
        })
    }

    fn resume(&self, id: TaskId) -> Result<(), ControlError> {
        self.act(id, ControlCall::Resume(id), |s| {
            s.paused.remove(&id);
        })
    }

    fn set_priority(&self, id: TaskId, value: i32) -> Result<(), ControlError> {
        self.act(id, ControlCall::SetPriority(id, value), |s| {
            s.priorities.insert(id, value);
        })
    }
}
