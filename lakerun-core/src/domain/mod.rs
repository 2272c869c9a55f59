//! Core domain types
//!
//! These types describe what the Jobs API reports about a run and its tasks,
//! and are shared between the HTTP client (deserializes) and the runner
//! (tracks state and collects outputs).

pub mod log;
pub mod run;
