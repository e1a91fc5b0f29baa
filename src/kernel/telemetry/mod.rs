//! Cycle telemetry.
//!
//! # INVARIANT
//! Telemetry is a READ-ONLY side-effect layer.
//! It must **NEVER** be read inside decision logic (evaluator, scheduler policy, reactor).
//! It exists solely for observability and verification.

pub mod event;
pub mod metrics;
pub mod recorder;
