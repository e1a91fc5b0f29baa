//! OS-backed process control.
//!
//! On unix the capability maps onto signals and `setpriority(2)`:
//! - probe: `kill(pid, 0)`
//! - pause / resume: `SIGSTOP` / `SIGCONT`
//! - priority: `setpriority(PRIO_PROCESS, pid, nice)`
//!
//! Other platforms get [`UnsupportedControl`], which reports every task as dead.

use super::{ControlError, ProcessControl};
use crate::kernel::record::TaskId;

#[cfg(unix)]
pub use unix::SignalControl;

/// Backend for the platform this binary was built for.
pub fn platform_control() -> Box<dyn ProcessControl> {
    #[cfg(unix)]
    {
        Box::new(SignalControl)
    }
    #[cfg(not(unix))]
    {
        Box::new(UnsupportedControl)
    }
}

#[cfg(unix)]
mod unix {
    use std::io;

    use super::{ControlError, ProcessControl, TaskId};

    /// Signal-based control of real processes.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SignalControl;

    /// Converts a task id into a pid that names exactly one process.
    ///
    /// 0 and values past `i32::MAX` would address a process group or the
    /// caller itself, so they never reach the kernel.
    fn pid_of(id: TaskId) -> Result<libc::pid_t, ControlError> {
        match libc::pid_t::try_from(id.0) {
            Ok(pid) if pid > 0 => Ok(pid),
            _ => Err(ControlError::NoSuchProcess(id)),
        }
    }

    fn last_error(id: TaskId) -> ControlError {
        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::ESRCH) => ControlError::NoSuchProcess(id),
            Some(libc::EPERM) | Some(libc::EACCES) => ControlError::PermissionDenied(id),
            _ => ControlError::Os { id, source: err },
        }
    }

    fn send(id: TaskId, signal: libc::c_int) -> Result<(), ControlError> {
        let pid = pid_of(id)?;
        // SAFETY: kill has no memory-safety preconditions.
        let rc = unsafe { libc::kill(pid, signal) };
        if rc == 0 {
            Ok(())
        } else {
            Err(last_error(id))
        }
    }

    impl ProcessControl for SignalControl {
        fn probe_alive(&self, id: TaskId) -> bool {
            send(id, 0).is_ok()
        }

        fn pause(&self, id: TaskId) -> Result<(), ControlError> {
            send(id, libc::SIGSTOP)
        }

        fn resume(&self, id: TaskId) -> Result<(), ControlError> {
            send(id, libc::SIGCONT)
        }

        fn set_priority(&self, id: TaskId, value: i32) -> Result<(), ControlError> {
            let pid = pid_of(id)?;
            // SAFETY: setpriority has no memory-safety preconditions.
            let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, pid as libc::id_t, value) };
            if rc == 0 {
                Ok(())
            } else {
                Err(last_error(id))
            }
        }
    }

}

/// Fallback backend where no process-control primitives exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedControl;

impl ProcessControl for UnsupportedControl {
    fn probe_alive(&self, _id: TaskId) -> bool {
        false
    }

    fn pause(&self, _id: TaskId) -> Result<(), ControlError> {
        Err(ControlError::Unsupported)
    }

    fn resume(&self, _id: TaskId) -> Result<(), ControlError> {
        Err(ControlError::Unsupported)
    }

    fn set_priority(&self, _id: TaskId, _value: i32) -> Result<(), ControlError> {
        Err(ControlError::Unsupported)
    }
}
