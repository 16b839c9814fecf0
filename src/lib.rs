//! winsift: time-bounded retries of accessibility attribute queries and a
//! classifier that tells real top-level windows from everything else.

pub mod attributes;
pub mod classifier;
pub mod config;
pub mod error;
pub mod services;
pub mod utils;

pub use classifier::{is_actual_window, Classifier, Verdict};
pub use error::{AttributeError, Result, WinsiftError};
pub use services::{Batch, RetryScheduler, ScheduleOptions, SnapshotCollector};
