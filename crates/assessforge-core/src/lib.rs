//! assessforge-core: assessment delivery engine.
//!
//! This crate owns the lifecycle of a single test-taking attempt: resolving
//! the definition tree, tracking time limits and navigation, aggregating
//! scores from items through sections to the assessment, and selecting
//! feedback from the final score.

pub mod assessment;
pub mod clock;
pub mod condition;
pub mod config;
pub mod error;
pub mod item;
pub mod model;
pub mod parser;
pub mod replay;
pub mod report;
pub mod scoring;
pub mod section;
pub mod variables;
