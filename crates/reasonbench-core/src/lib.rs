//! reasonbench-core: Data model, prompt templates, and scoring logic.
//!
//! This crate defines the problem and record types, the response naming
//! scheme, the parser for reasoning-evaluator reports, and the aggregate
//! statistics that the rest of reasonbench builds on.

pub mod error;
pub mod model;
pub mod naming;
pub mod problems;
pub mod prompt;
pub mod results_log;
pub mod score_report;
pub mod statistics;
pub mod traits;
