use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Monotonically increasing cycle counter of the scheduler loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Cycle {
    pub number: u64,
}

impl Cycle {
    pub fn new() -> Self {
        Cycle { number: 0 }
    }

    pub fn next(&self) -> Self {
        Cycle { number: self.number + 1 }
    }
}

/// Time base the registry timestamps are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ClockSource {
    /// Wall clock, nanoseconds since the UNIX epoch.
    #[default]
    Realtime,
    /// `CLOCK_MONOTONIC`, the base of kernel-side `ktime` stamps.
    Monotonic,
}

pub trait Clock: Send + Sync {
    fn now_ns(&self) -> u64;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    source: ClockSource,
}

impl SystemClock {
    pub fn new(source: ClockSource) -> Self {
        Self { source }
    }
}

impl Clock for SystemClock {
    fn now_ns(&self) -> u64 {
        match self.source {
            ClockSource::Realtime => realtime_ns(),
            ClockSource::Monotonic => monotonic_ns(),
        }
    }
}

fn realtime_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(unix)]
fn monotonic_ns() -> u64 {
    // SAFETY: all-zero is a valid timespec, and `ts` stays writable for the call.
    let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
    if rc != 0 {
        return 0;
    }
    (ts.tv_sec as u64)
        .saturating_mul(1_000_000_000)
        .saturating_add(ts.tv_nsec as u64)
}

#[cfg(not(unix))]
fn monotonic_ns() -> u64 {
    realtime_ns()
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn at(now_ns: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now_ns)),
        }
    }

    pub fn set(&self, now_ns: u64) {
        self.now.store(now_ns, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ns: u64) {
        self.now.fetch_add(delta_ns, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
