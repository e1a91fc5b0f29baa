pub mod evaluator;
pub mod reactor;
pub mod record;
pub mod report;
pub mod scheduler;
pub mod telemetry;
pub mod time;
