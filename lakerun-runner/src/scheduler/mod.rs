//! Scheduler layer for the runner
//!
//! This layer drives a submitted run to completion: it polls the run status
//! at a fixed interval, reacts to terminal states and enforces the wait
//! budget.

pub mod poller;

pub use poller::{CompletionPoller, MIN_POLL_FREQUENCY, WaitOptions};
