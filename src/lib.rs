// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Benchmark metrics engine for fake-news classification runs
//!
//! This crate provides:
//! - Result records, evaluation modes and run payloads
//! - Flattening of repeated trials (per-trial scores or majority vote)
//! - Threshold sweep, ROC and precision-recall curves with trapezoidal AUC
//! - Confusion matrix and scalar metrics at a user-selected threshold
//! - Histogram and iteration-accuracy reshaping for display
//! - Run-level summaries and lenient parsing of raw classifier replies

pub mod benchmark;
pub mod config;
pub mod curves;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod histogram;
pub mod metrics;
pub mod parse;
pub mod records;
pub mod sweep;

pub use benchmark::BenchmarkSummary;
pub use config::MetricsConfig;
pub use curves::{Curves, PrPoint, RocPoint};
pub use engine::{compute_metrics, MetricsEngine, MetricsReport, MetricsSummary, RunComparison};
pub use error::{MetricsError, Result};
pub use flatten::{flatten, FlatSamples, ScoredSample, VotedSample};
pub use histogram::{HistogramBin, HistogramInput, IterationPoint};
pub use metrics::ConfusionMatrix;
pub use parse::{parse_verdict, Verdict};
pub use records::{BenchmarkRun, EvaluationMode, ResultRecord};
pub use sweep::OperatingPoint;
