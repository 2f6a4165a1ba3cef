//! Concurrent fan-out
//!
//! An [`AsyncJob`] runs a fixed set of [`AsyncDoer`] workers, one thread each,
//! and collects their outputs in arrival order until either the target count
//! is reached or a worker asks for a global stop. Stopping is cooperative:
//! workers check the stop channel before working and before publishing, but a
//! running `execute()` is never interrupted.

use std::fmt;

mod job;
mod worker;

pub use job::AsyncJob;

/// A unit of work for an [`AsyncJob`]
pub trait AsyncDoer: Send + 'static {
    /// What one unit of work produces
    type Output: Clone + Send + Sync + 'static;

    /// Set up for the work; receives the worker's position in the job
    fn prepare(&mut self, index: usize);

    /// Do the work
    fn execute(&mut self) -> Self::Output;

    /// A non-empty value stops the whole job and is recorded as its reason.
    /// The output of a worker that asks to stop is not published.
    fn stop_signal(&self) -> Option<String>;
}

/// Why an [`AsyncJob`] stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The target count of results was collected
    AutoStopped,
    /// Every worker finished before the target count was reached
    Exhausted,
    /// A worker raised this stop signal
    Worker(String),
}

impl StopReason {
    pub fn as_str(&self) -> &str {
        match self {
            StopReason::AutoStopped => "async auto-stopped",
            StopReason::Exhausted => "async workers exhausted",
            StopReason::Worker(reason) => reason,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
