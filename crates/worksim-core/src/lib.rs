//! worksim-core — Simulation execution engine.
//!
//! This crate defines the task data model, the scoring heuristic, the
//! countdown timer and the attempt state machine, plus the aggregation and
//! hand-off logic that turns a finished attempt into a submission.

pub mod aggregate;
pub mod attempt;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod scoring;
pub mod timer;
pub mod traits;
