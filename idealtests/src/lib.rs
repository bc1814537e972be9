#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
//! Ranking and round-robin tournament selection of test cases.
//!
//! Records (per-test duration and coverage) can be ranked by any numeric
//! field with a randomized quicksort, or turned into a population whose
//! individuals meet every other individual once in a binary tournament.
//! The names that come out on top form the set of ideal tests.

pub mod config;
pub mod dataset;
pub mod evaluator;
pub mod genetic;
pub mod metrics;
pub mod operators;
pub mod pipeline;
pub mod random;

pub use config::{Config, RankingConfig, SelectionConfig};
pub use metrics::{MetricRecord, MetricValue, Outcome};
pub use pipeline::{PipelineError, SelectionPipeline, rank_records, select_ideal_tests};
