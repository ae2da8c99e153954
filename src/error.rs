// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Error types for result ingestion and metric computation

use thiserror::Error;

/// Errors surfaced at the ingestion boundary.
///
/// The computation stages themselves never fail: degenerate denominators
/// fall back to fixed values and empty input yields an empty summary.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Mode string that is not one of the four evaluation modes
    #[error("unknown evaluation mode: {0:?}")]
    UnknownMode(String),

    /// NaN or infinite score in a result record
    #[error("non-finite score in record {record}, trial {trial}")]
    NonFiniteScore { record: usize, trial: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MetricsError>;
