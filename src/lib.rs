pub mod config;
pub mod control;
pub mod kernel;
pub mod registry;

// Re-export specific items for convenient access
pub use config::SchedulerConfig;
pub use kernel::reactor::Reactor;
pub use kernel::record::{TaskId, TaskRecord};
