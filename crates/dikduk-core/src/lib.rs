//! dikduk-core: answer validation and scoring for Hebrew verb analysis.
//!
//! Normalization, grammar tables, field validators, sentence and submission
//! scoring, structured advanced questions, and a grading engine over an
//! injectable submission store.

pub mod advanced;
pub mod config;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod statistics;
pub mod store;
pub mod submission;
pub mod traits;
pub mod validate;
