//! Service layer
//!
//! Services contain the runner's business logic: submitting the run,
//! tracking state transitions and writing log entries.

mod log_sink;
mod state_tracker;
mod submission;

// Re-export traits
pub use log_sink::LogSink;

// Re-export implementations
pub use log_sink::{InMemoryLogSink, TracingLogSink};
pub use state_tracker::{StateHistory, StateSnapshot, StateTracker};
pub use submission::{MAX_IDEMPOTENCY_TOKEN_LEN, RunSubmitter, validate_settings};
