// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Threshold sweep over continuous scores
//!
//! Candidate thresholds are the distinct observed scores, highest first,
//! framed by one sentinel above the maximum and one below the minimum so
//! that curves reach both "nothing positive" and "everything positive".
//! Here the positive class is `gold_binary == true` and a sample is
//! predicted positive iff `score >= threshold`.

use crate::flatten::ScoredSample;
use crate::metrics::ConfusionMatrix;
use serde::{Deserialize, Serialize};

/// A decision threshold together with its confusion counts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    pub threshold: f64,
    pub confusion: ConfusionMatrix,
}

/// Distinct scores in descending order with the two sentinels attached.
/// Empty input yields no thresholds.
pub fn candidate_thresholds(samples: &[ScoredSample], epsilon: f64) -> Vec<f64> {
    let mut distinct: Vec<f64> = samples.iter().map(|s| s.score).collect();
    distinct.sort_by(|a, b| b.total_cmp(a));
    distinct.dedup();

    let (Some(&max), Some(&min)) = (distinct.first(), distinct.last()) else {
        return Vec::new();
    };

    let mut thresholds = Vec::with_capacity(distinct.len() + 2);
    thresholds.push(max + epsilon);
    thresholds.extend(distinct);
    thresholds.push(min - epsilon);
    thresholds
}

/// Confusion counts at one threshold, `gold_binary` as the positive class
pub fn confusion_at(samples: &[ScoredSample], threshold: f64) -> ConfusionMatrix {
    let mut matrix = ConfusionMatrix::default();
    for sample in samples {
        matrix.record(sample.score >= threshold, sample.truth);
    }
    matrix
}

/// Sweep every candidate threshold. One full pass over the samples per
/// threshold.
pub fn sweep(samples: &[ScoredSample], epsilon: f64) -> Vec<OperatingPoint> {
    let thresholds = candidate_thresholds(samples, epsilon);
    tracing::debug!(
        "Sweeping {} thresholds over {} samples",
        thresholds.len(),
        samples.len()
    );

    thresholds
        .into_iter()
        .map(|threshold| OperatingPoint {
            threshold,
            confusion: confusion_at(samples, threshold),
        })
        .collect()
}
