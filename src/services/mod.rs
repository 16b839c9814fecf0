pub mod retry_scheduler;
pub mod snapshot_collector;

pub use retry_scheduler::{Batch, RetryScheduler, ScheduleOptions};
pub use snapshot_collector::SnapshotCollector;
