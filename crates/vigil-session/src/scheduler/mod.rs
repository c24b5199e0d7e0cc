//! Scheduler implementations
//!
//! - `ManualScheduler`: virtual time, advanced explicitly; also a `Clock`
//! - `TokioScheduler`: real timers on the tokio runtime

mod manual;
mod runtime;

pub use manual::ManualScheduler;
pub use runtime::TokioScheduler;
