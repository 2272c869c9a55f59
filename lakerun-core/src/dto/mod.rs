//! Data Transfer Objects for the Jobs API
//!
//! Request and response bodies exchanged with the platform when creating
//! a run. Optional fields are omitted from the wire when unset.

pub mod run;
