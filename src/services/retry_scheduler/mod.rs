//! RetryScheduler: bounded retries of attribute queries against a busy peer.
//!
//! An operation is attempted on a dedicated background runtime, retried after
//! a fixed backoff while it fails transiently, and dropped silently once the
//! global time budget is spent. Unsupported and malformed queries are never
//! retried. Batch mode lets a caller block until every operation of a group
//! reached a terminal state.

mod batch;
mod policy;
mod scheduler;
mod timeout;

pub use batch::{Batch, BatchTicket};
pub use policy::{DropReason, RetryDecision, RetryOutcome, RetryPolicy, DEFAULT_BACKOFF};
pub use scheduler::{OnComplete, RetryScheduler, RetryableOperation, ScheduleOptions};
pub use timeout::{global_timeout, init_global_timeout, DEFAULT_GLOBAL_TIMEOUT};
