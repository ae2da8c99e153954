// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Metrics engine: results in, display-ready metrics out
//!
//! Orchestrates:
//! - Flattening of result records per evaluation mode
//! - Threshold sweep with ROC and PR curves (score modes)
//! - Confusion matrix and scalar metrics at the selected operating point
//! - Reshaping of the server-reported histogram and iteration accuracy
//!
//! Every call recomputes from scratch and never touches its inputs, so
//! moving the threshold slider simply means calling again.

use crate::config::MetricsConfig;
use crate::curves::{Curves, PrPoint, RocPoint};
use crate::error::Result;
use crate::flatten::{flatten, FlatSamples, ScoredSample};
use crate::histogram::{
    histogram_bins, iteration_trend, HistogramBin, HistogramInput, IterationPoint,
};
use crate::metrics::{select_confusion, ConfusionMatrix};
use crate::records::{BenchmarkRun, EvaluationMode, ResultRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the result view displays for one run at one threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub mode: EvaluationMode,
    pub threshold: f64,
    /// Flattened samples: trials in score modes, records in binary modes.
    /// A server-reported matrix counts trials instead, so its total may
    /// differ from this.
    pub total_samples: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub specificity: f64,
    pub balanced_accuracy: f64,
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    pub roc: Vec<RocPoint>,
    pub pr: Vec<PrPoint>,
    pub roc_auc: f64,
    pub pr_auc: f64,
    pub histogram: Vec<HistogramBin>,
    pub iteration_accuracy: Vec<IterationPoint>,
}

/// Compute the full summary with default engine settings.
///
/// `precomputed_confusion` only applies to binary modes, where the
/// server-reported matrix replaces the local majority-vote matrix.
pub fn compute_metrics(
    results: &[ResultRecord],
    mode: EvaluationMode,
    threshold: f64,
    histogram: Option<&HistogramInput>,
    iteration_accuracy: Option<&[f64]>,
    precomputed_confusion: Option<&ConfusionMatrix>,
) -> MetricsSummary {
    MetricsEngine::default().compute_parts(
        results,
        mode,
        threshold,
        histogram,
        iteration_accuracy,
        precomputed_confusion,
    )
}

/// Stateless engine carrying only its configuration
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: MetricsConfig,
}

impl MetricsEngine {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Summarize a run at the configured threshold
    pub fn compute(&self, run: &BenchmarkRun) -> MetricsSummary {
        self.compute_at(run, self.config.threshold)
    }

    /// Summarize a run at an explicit threshold
    pub fn compute_at(&self, run: &BenchmarkRun, threshold: f64) -> MetricsSummary {
        self.compute_parts(
            &run.results,
            run.mode,
            threshold,
            run.score_histogram.as_ref(),
            run.iteration_accuracy.as_deref(),
            run.confusion_matrix.as_ref(),
        )
    }

    fn compute_parts(
        &self,
        results: &[ResultRecord],
        mode: EvaluationMode,
        threshold: f64,
        histogram: Option<&HistogramInput>,
        iteration_accuracy: Option<&[f64]>,
        precomputed_confusion: Option<&ConfusionMatrix>,
    ) -> MetricsSummary {
        let flat = flatten(results, mode, self.config.vote_cutoff);

        let curves = match &flat {
            FlatSamples::Scored(samples) => {
                Curves::from_scored(samples, self.config.sentinel_epsilon)
            }
            FlatSamples::Voted(_) => Curves::default(),
        };

        let confusion = select_confusion(&flat, threshold, precomputed_confusion);

        tracing::debug!(
            "Computed {} metrics: {} samples, {} ROC points, threshold {:.3}",
            mode,
            flat.len(),
            curves.roc.len(),
            threshold
        );

        MetricsSummary {
            mode,
            threshold,
            total_samples: flat.len(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1_score(),
            specificity: confusion.specificity(),
            balanced_accuracy: confusion.balanced_accuracy(),
            accuracy: confusion.accuracy(),
            confusion,
            roc: curves.roc,
            pr: curves.pr,
            roc_auc: curves.roc_auc,
            pr_auc: curves.pr_auc,
            histogram: histogram_bins(histogram),
            iteration_accuracy: iteration_trend(iteration_accuracy),
        }
    }

    /// Overlay curves for several runs, one score per statement.
    ///
    /// Fake is the positive class here: labels and scores are both
    /// inverted, so a statement without scores counts as score 1.0.
    pub fn compare_runs(&self, runs: &[(String, Vec<ResultRecord>)]) -> Vec<RunComparison> {
        runs.iter()
            .map(|(label, results)| {
                let samples: Vec<ScoredSample> = results
                    .iter()
                    .map(|r| ScoredSample {
                        score: 1.0 - r.scores.first().copied().unwrap_or(0.0),
                        truth: !r.gold_binary,
                    })
                    .collect();
                RunComparison {
                    label: label.clone(),
                    curves: Curves::from_scored(&samples, self.config.sentinel_epsilon),
                }
            })
            .collect()
    }
}

/// Curves of one run in a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunComparison {
    pub label: String,
    pub curves: Curves,
}

/// Markdown table comparing runs by curve area
pub fn comparison_markdown(comparisons: &[RunComparison]) -> String {
    let mut report = String::new();
    report.push_str("| Run | ROC AUC | PR AUC | Points |\n");
    report.push_str("|-----|---------|--------|--------|\n");
    for c in comparisons {
        report.push_str(&format!(
            "| {} | {:.4} | {:.4} | {} |\n",
            c.label,
            c.curves.roc_auc,
            c.curves.pr_auc,
            c.curves.roc.len()
        ));
    }
    report
}

impl MetricsSummary {
    /// Format as a human-readable string
    pub fn format(&self) -> String {
        let cm = &self.confusion;
        let mut output = format!(
            r#"Benchmark Metrics ({}, threshold {:.2})
=========================================
Samples:           {}
Accuracy:          {:.4} ({:.2}%)
Balanced Accuracy: {:.4} ({:.2}%)
Precision:         {:.4}
Recall:            {:.4}
F1 Score:          {:.4}
Specificity:       {:.4}

Confusion Matrix (fake = positive):
                  Predicted
                  Fake      Genuine
Actual Fake      {:>6}    {:>6}
       Genuine   {:>6}    {:>6}
"#,
            self.mode,
            self.threshold,
            self.total_samples,
            self.accuracy,
            self.accuracy * 100.0,
            self.balanced_accuracy,
            self.balanced_accuracy * 100.0,
            self.precision,
            self.recall,
            self.f1,
            self.specificity,
            cm.tp,
            cm.fn_,
            cm.fp,
            cm.tn,
        );

        if !self.roc.is_empty() {
            output.push_str(&format!("\nROC AUC:           {:.4}\n", self.roc_auc));
            output.push_str(&format!("PR AUC:            {:.4}\n", self.pr_auc));
        }

        if !self.histogram.is_empty() {
            output.push_str("\nScore Histogram:\n");
            for bin in &self.histogram {
                output.push_str(&format!("  {:<10} {:>6}\n", bin.bin, bin.count));
            }
        }

        if !self.iteration_accuracy.is_empty() {
            output.push_str("\nIteration Accuracy:\n");
            for point in &self.iteration_accuracy {
                output.push_str(&format!("  #{}: {:.4}\n", point.iteration, point.accuracy));
            }
        }

        output
    }
}

/// A summary stamped for writing to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub summary: MetricsSummary,
}

impl MetricsReport {
    pub fn new(source: impl Into<String>, summary: MetricsSummary) -> Self {
        Self {
            source: source.into(),
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            summary,
        }
    }

    /// Save report to a JSON file
    pub fn save(&self, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(output_path, json)?;
        tracing::info!("Metrics saved to {}", output_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::BenchmarkSummary;

    #[test]
    fn test_single_record_score_mode() {
        let results = vec![ResultRecord::new("claim", true, vec![0.9, 0.2])];
        let summary = compute_metrics(&results, EvaluationMode::Score, 0.5, None, None, None);
        let cm = summary.confusion;

        assert_eq!((cm.tp, cm.fp, cm.fn_, cm.tn), (0, 1, 0, 1));
        assert_eq!(summary.total_samples, 2);
        assert_eq!(summary.precision, 0.0);
        assert_eq!(summary.recall, 0.0);
        assert!((summary.specificity - 0.5).abs() < 1e-9);
        assert!((summary.balanced_accuracy - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_empty_results_give_zeroed_summary() {
        for mode in EvaluationMode::ALL {
            let summary = compute_metrics(&[], mode, 0.5, None, None, None);

            assert!(summary.roc.is_empty());
            assert!(summary.pr.is_empty());
            assert_eq!(summary.pr_auc, 0.0);
            assert_eq!(summary.confusion, ConfusionMatrix::default());
            assert_eq!(summary.precision, 0.0);
            assert_eq!(summary.recall, 0.0);
            assert_eq!(summary.f1, 0.0);
            assert_eq!(summary.balanced_accuracy, 0.0);
            assert!(summary.histogram.is_empty());
            assert!(summary.iteration_accuracy.is_empty());
        }
    }

    #[test]
    fn test_binary_mode_uses_server_matrix() {
        let results = vec![
            ResultRecord::from_votes("r1", true, vec![true, true, false]),
            ResultRecord::from_votes("r2", false, vec![false, false, false]),
        ];
        let server = ConfusionMatrix { tp: 10, fp: 2, fn_: 3, tn: 5 };

        let local = compute_metrics(&results, EvaluationMode::Binary, 0.5, None, None, None);
        assert_eq!((local.confusion.tp, local.confusion.tn), (1, 1));
        assert!(local.roc.is_empty());

        let remote =
            compute_metrics(&results, EvaluationMode::Binary, 0.5, None, None, Some(&server));
        assert_eq!(remote.confusion, server);
        assert!((remote.precision - 10.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_server_matrix_total_differs_from_sample_count() {
        let results = vec![
            ResultRecord::from_votes("r1", true, vec![true, true, false]),
            ResultRecord::from_votes("r2", false, vec![false, false, false]),
        ];
        let server = ConfusionMatrix { tp: 10, fp: 2, fn_: 3, tn: 5 };

        let summary =
            compute_metrics(&results, EvaluationMode::Binary, 0.5, None, None, Some(&server));

        // one majority vote per record, while the server counted every trial
        assert_eq!(summary.total_samples, 2);
        assert_eq!(summary.confusion.total(), 20);
    }

    #[test]
    fn test_binary_mode_ignores_threshold() {
        let results = vec![
            ResultRecord::new("a", true, vec![0.6, 0.7, 0.2]),
            ResultRecord::new("b", false, vec![0.1, 0.55, 0.3]),
        ];

        let mode = EvaluationMode::BinaryWithExplanation;
        let low = compute_metrics(&results, mode, 0.1, None, None, None);
        let high = compute_metrics(&results, mode, 0.9, None, None, None);
        assert_eq!(low.confusion, high.confusion);
    }

    #[test]
    fn test_threshold_changes_do_not_touch_previous_summary() {
        let run = BenchmarkRun::synthetic(40, 3, EvaluationMode::Score, 11);
        let engine = MetricsEngine::default();

        let first = engine.compute_at(&run, 0.5);
        let snapshot = first.clone();
        let moved = engine.compute_at(&run, 0.8);

        assert_eq!(first, snapshot);
        assert_eq!(first.roc, moved.roc);
        assert_eq!(first.pr_auc, moved.pr_auc);
        assert_eq!(moved.confusion.total(), first.confusion.total());
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let run = BenchmarkRun::synthetic(25, 4, EvaluationMode::ScoreWithExplanation, 3);
        let summary = BenchmarkSummary::from_results(&run.results, &MetricsConfig::default());
        let run = run.with_summary(&summary);
        let engine = MetricsEngine::default();

        assert_eq!(engine.compute(&run), engine.compute(&run));
        assert_eq!(engine.compute(&run).histogram.len(), 10);
        assert_eq!(engine.compute(&run).iteration_accuracy.len(), 4);
    }

    #[test]
    fn test_configured_threshold() {
        let results = vec![ResultRecord::new("claim", false, vec![0.65])];
        let run = BenchmarkRun::new(EvaluationMode::Score, results);
        let engine = MetricsEngine::new(MetricsConfig {
            threshold: 0.7,
            ..MetricsConfig::default()
        });

        let summary = engine.compute(&run);
        assert_eq!(summary.threshold, 0.7);
        assert_eq!(summary.confusion.tp, 1);
    }

    #[test]
    fn test_compare_runs_uses_first_score() {
        let runs = vec![
            (
                "good".to_string(),
                vec![
                    ResultRecord::new("a", true, vec![0.9, 0.1]),
                    ResultRecord::new("b", false, vec![0.2, 0.9]),
                ],
            ),
            (
                "blank".to_string(),
                vec![ResultRecord::new("c", true, vec![]), ResultRecord::new("d", false, vec![])],
            ),
        ];

        let comparisons = MetricsEngine::default().compare_runs(&runs);
        assert_eq!(comparisons.len(), 2);
        assert!((comparisons[0].curves.roc_auc - 1.0).abs() < 1e-9);
        assert_eq!(comparisons[1].curves.roc.len(), 3);

        let table = comparison_markdown(&comparisons);
        assert!(table.contains("| good | 1.0000"));
        assert!(table.contains("| blank |"));
    }

    #[test]
    fn test_compare_runs_treats_fake_as_positive() {
        let results = vec![
            ResultRecord::new("a", true, vec![0.4]),
            ResultRecord::new("b", false, vec![0.7]),
            ResultRecord::new("c", false, vec![0.3]),
            ResultRecord::new("d", true, vec![0.9]),
            ResultRecord::new("e", false, vec![0.2]),
        ];
        let runs = vec![("skewed".to_string(), results.clone())];

        let comparison = &MetricsEngine::default().compare_runs(&runs)[0];

        // three fake statements ranked against two genuine ones
        assert!((comparison.curves.pr_auc - 65.0 / 72.0).abs() < 1e-9);
        assert!((comparison.curves.roc_auc - 5.0 / 6.0).abs() < 1e-9);

        // ROC area is symmetric under the inversion, PR area is not
        let genuine_positive =
            compute_metrics(&results, EvaluationMode::Score, 0.5, None, None, None);
        assert!((genuine_positive.roc_auc - comparison.curves.roc_auc).abs() < 1e-9);
        assert!((genuine_positive.pr_auc - 19.0 / 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_and_save() {
        let run = BenchmarkRun::synthetic(10, 2, EvaluationMode::Score, 5);
        let summary = MetricsEngine::default().compute(&run);
        let text = summary.format();
        assert!(text.contains("Benchmark Metrics (score"));
        assert!(text.contains("PR AUC"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("metrics.json");
        MetricsReport::new("synthetic", summary.clone()).save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let saved: MetricsReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(saved.summary.confusion, summary.confusion);
        assert_eq!(saved.source, "synthetic");
    }
}
