// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Run-level summary as reported by the job service
//!
//! Computed over every individual trial, without majority voting. The
//! summary supplies the server-side confusion matrix, the score histogram
//! and the iteration accuracy consumed by [`crate::engine`].

use crate::config::MetricsConfig;
use crate::histogram::HistogramInput;
use crate::metrics::{ratio, ConfusionMatrix};
use crate::records::{BenchmarkRun, ResultRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Fake (`gold_binary == false`) is the positive class
    pub confusion_matrix: ConfusionMatrix,
    pub score_histogram: HistogramInput,
    /// Fraction of correct trials at each iteration index
    pub iteration_accuracy: Vec<f64>,
    pub total_predictions: usize,
}

impl BenchmarkSummary {
    pub fn from_results(results: &[ResultRecord], config: &MetricsConfig) -> Self {
        let votes: Vec<Vec<bool>> = results
            .iter()
            .map(|r| stored_votes(r, config.vote_cutoff))
            .collect();
        let iterations = votes.iter().map(Vec::len).max().unwrap_or(0);
        let mut iter_correct = vec![0usize; iterations];
        let mut iter_total = vec![0usize; iterations];
        let mut confusion = ConfusionMatrix::default();
        let mut all_scores = Vec::new();

        for (record, record_votes) in results.iter().zip(votes) {
            let gold = record.gold_binary;
            for (i, vote) in record_votes.into_iter().enumerate() {
                confusion.record(!vote, !gold);
                iter_total[i] += 1;
                if vote == gold {
                    iter_correct[i] += 1;
                }
            }
            all_scores.extend_from_slice(&record.scores);
        }

        let iteration_accuracy = iter_correct
            .iter()
            .zip(iter_total.iter())
            .map(|(correct, total)| ratio(*correct, *total))
            .collect();

        tracing::debug!(
            "Summarized {} trials over {} iterations",
            confusion.total(),
            iterations
        );

        Self {
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1_score: confusion.f1_score(),
            confusion_matrix: confusion,
            score_histogram: HistogramInput::from_scores(&all_scores, config.histogram_bins),
            iteration_accuracy,
            total_predictions: confusion.total(),
        }
    }

    /// Format as human-readable string
    pub fn format(&self) -> String {
        let cm = &self.confusion_matrix;
        let mut output = format!(
            r#"Benchmark Summary
=================
Predictions:       {}
Accuracy:          {:.4} ({:.2}%)
Precision (fake):  {:.4}
Recall (fake):     {:.4}
F1 Score (fake):   {:.4}

Confusion Matrix:
                  Predicted
                  Fake      Genuine
Actual Fake      {:>6}    {:>6}
       Genuine   {:>6}    {:>6}
"#,
            self.total_predictions,
            self.accuracy,
            self.accuracy * 100.0,
            self.precision,
            self.recall,
            self.f1_score,
            cm.tp,
            cm.fn_,
            cm.fp,
            cm.tn,
        );

        if !self.iteration_accuracy.is_empty() {
            output.push_str("\nIteration Accuracy:\n");
            for (i, acc) in self.iteration_accuracy.iter().enumerate() {
                output.push_str(&format!("  #{}: {:.4}\n", i + 1, acc));
            }
        }

        output
    }
}

/// Each trial's vote is the stored prediction; scores only decide the
/// vote for records that carry no predictions.
fn stored_votes(record: &ResultRecord, cutoff: f64) -> Vec<bool> {
    if record.predictions.is_empty() {
        record.trial_votes(cutoff)
    } else {
        record.predictions.clone()
    }
}

impl BenchmarkRun {
    /// Attach the run-level aggregates the job service would have reported
    pub fn with_summary(mut self, summary: &BenchmarkSummary) -> Self {
        self.confusion_matrix = Some(summary.confusion_matrix);
        self.score_histogram = Some(summary.score_histogram.clone());
        self.iteration_accuracy = Some(summary.iteration_accuracy.clone());
        self
    }
}
