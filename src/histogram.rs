// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Score histogram and per-iteration accuracy trend
//!
//! The job service reports both as raw arrays. Display only needs them
//! reshaped into labelled, ordered points.

use serde::{Deserialize, Serialize};

/// Raw histogram as reported by the job service: N+1 edges, N counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistogramInput {
    pub bin_edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// One labelled histogram bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub bin: String,
    pub count: usize,
}

/// Accuracy of one iteration, numbered from 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationPoint {
    pub iteration: usize,
    pub accuracy: f64,
}

impl HistogramInput {
    /// Count scores into `bins` equal-width bins over [0, 1].
    ///
    /// Every bin is half-open except the last, which also holds 1.0.
    /// Scores outside [0, 1] are not counted.
    pub fn from_scores(scores: &[f64], bins: usize) -> Self {
        if bins == 0 {
            return Self::default();
        }

        let step = 1.0 / bins as f64;
        let mut bin_edges: Vec<f64> = (0..=bins).map(|i| i as f64 * step).collect();
        bin_edges[bins] = 1.0;

        let mut counts = vec![0usize; bins];
        for &score in scores {
            if !(0.0..=1.0).contains(&score) {
                continue;
            }
            let mut idx = ((score * bins as f64) as usize).min(bins - 1);
            // Float rounding can land one bin off the edges we report
            if score < bin_edges[idx] {
                idx -= 1;
            } else if idx + 1 < bins && score >= bin_edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }

        Self { bin_edges, counts }
    }
}

/// Label `"<lo>–<hi>"` with one decimal place
pub fn bin_label(lo: f64, hi: f64) -> String {
    format!("{:.1}–{:.1}", lo, hi)
}

/// Pair each count with the label of its edge interval.
/// Missing input produces no bins.
pub fn histogram_bins(input: Option<&HistogramInput>) -> Vec<HistogramBin> {
    let Some(input) = input else {
        return Vec::new();
    };

    let bins = input.counts.len().min(input.bin_edges.len().saturating_sub(1));
    if bins != input.counts.len() || input.bin_edges.len() != input.counts.len() + 1 {
        tracing::warn!(
            "Histogram shape mismatch: {} edges for {} counts, keeping {} bins",
            input.bin_edges.len(),
            input.counts.len(),
            bins
        );
    }

    input
        .bin_edges
        .windows(2)
        .zip(input.counts.iter())
        .map(|(edges, count)| HistogramBin {
            bin: bin_label(edges[0], edges[1]),
            count: *count,
        })
        .collect()
}

/// Number the accuracies from 1 in their original order.
/// Missing input produces an empty trend.
pub fn iteration_trend(accuracy: Option<&[f64]>) -> Vec<IterationPoint> {
    accuracy
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, acc)| IterationPoint {
            iteration: i + 1,
            accuracy: *acc,
        })
        .collect()
}
