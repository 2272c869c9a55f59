//! Lakerun Core
//!
//! Core types shared by the Lakerun client and runner.
//!
//! This crate contains:
//! - Domain types: run lifecycle state, run metadata, task outputs, log entries
//! - DTOs: request and response bodies for the Jobs API

pub mod domain;
pub mod dto;
