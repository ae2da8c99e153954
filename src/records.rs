// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Benchmark result records and run payloads
//!
//! A benchmark run evaluates every statement of an uploaded dataset one or
//! more times. Each repetition (trial) yields a continuous score and a vote.
//! The records arrive already deserialized from the job service.

use crate::error::{MetricsError, Result};
use crate::histogram::HistogramInput;
use crate::metrics::ConfusionMatrix;
use crate::parse::parse_verdict;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How the classifier answered during the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Continuous confidence score per trial
    Score,
    /// Score plus free-text explanation
    ScoreWithExplanation,
    /// True/false verdict per trial, aggregated by majority vote
    Binary,
    /// Verdict plus free-text explanation
    BinaryWithExplanation,
}

impl EvaluationMode {
    pub const ALL: [EvaluationMode; 4] = [
        EvaluationMode::Score,
        EvaluationMode::ScoreWithExplanation,
        EvaluationMode::Binary,
        EvaluationMode::BinaryWithExplanation,
    ];

    /// Whether trials are aggregated by majority vote.
    /// Explanation variants behave exactly like their base mode.
    pub fn is_binary(&self) -> bool {
        match self {
            EvaluationMode::Score | EvaluationMode::ScoreWithExplanation => false,
            EvaluationMode::Binary | EvaluationMode::BinaryWithExplanation => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationMode::Score => "score",
            EvaluationMode::ScoreWithExplanation => "score_with_explanation",
            EvaluationMode::Binary => "binary",
            EvaluationMode::BinaryWithExplanation => "binary_with_explanation",
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvaluationMode {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| MetricsError::UnknownMode(s.to_string()))
    }
}

/// One evaluated statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Statement text (display only)
    pub statement: String,
    /// Ground truth: `true` means the statement is genuine news
    pub gold_binary: bool,
    /// Confidence that the statement is genuine, one per trial
    #[serde(default)]
    pub scores: Vec<f64>,
    /// Verdict per trial, used when no scores were recorded
    #[serde(default)]
    pub predictions: Vec<bool>,
}

impl ResultRecord {
    pub fn new(statement: impl Into<String>, gold_binary: bool, scores: Vec<f64>) -> Self {
        Self {
            statement: statement.into(),
            gold_binary,
            scores,
            predictions: Vec::new(),
        }
    }

    /// Build a record from vote-only trials
    pub fn from_votes(statement: impl Into<String>, gold_binary: bool, votes: Vec<bool>) -> Self {
        Self {
            statement: statement.into(),
            gold_binary,
            scores: Vec::new(),
            predictions: votes,
        }
    }

    /// Build a record from the raw classifier output of each iteration
    pub fn from_raw_outputs<S: AsRef<str>>(
        statement: impl Into<String>,
        gold_binary: bool,
        outputs: &[S],
    ) -> Self {
        let (predictions, scores) = outputs
            .iter()
            .map(|raw| {
                let verdict = parse_verdict(raw.as_ref());
                (verdict.vote, verdict.score)
            })
            .unzip();

        Self {
            statement: statement.into(),
            gold_binary,
            scores,
            predictions,
        }
    }

    /// Number of repeated trials carried by this record
    pub fn trial_count(&self) -> usize {
        if self.scores.is_empty() {
            self.predictions.len()
        } else {
            self.scores.len()
        }
    }

    /// Per-trial votes for "genuine". Scores win over stored predictions.
    pub fn trial_votes(&self, cutoff: f64) -> Vec<bool> {
        if self.scores.is_empty() {
            self.predictions.clone()
        } else {
            self.scores.iter().map(|s| *s >= cutoff).collect()
        }
    }

    /// Reject NaN and infinite scores. `index` is reported in the error.
    pub fn validate(&self, index: usize) -> Result<()> {
        match self.scores.iter().position(|s| !s.is_finite()) {
            Some(trial) => Err(MetricsError::NonFiniteScore { record: index, trial }),
            None => Ok(()),
        }
    }
}

/// Map a six-way LIAR label (0 = pants-fire .. 5 = true) to `gold_binary`
pub fn gold_from_liar_label(label: u8) -> bool {
    label >= 4
}

/// A finished benchmark job as returned by the job service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    pub mode: EvaluationMode,
    pub results: Vec<ResultRecord>,
    /// Server-reported matrix, authoritative in binary mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confusion_matrix: Option<ConfusionMatrix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_histogram: Option<HistogramInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_accuracy: Option<Vec<f64>>,
}

impl BenchmarkRun {
    pub fn new(mode: EvaluationMode, results: Vec<ResultRecord>) -> Self {
        Self {
            mode,
            results,
            confusion_matrix: None,
            score_histogram: None,
            iteration_accuracy: None,
        }
    }

    /// Check every record at the ingestion boundary
    pub fn validate(&self) -> Result<()> {
        self.results
            .iter()
            .enumerate()
            .try_for_each(|(idx, record)| record.validate(idx))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let run: Self = serde_json::from_str(raw)?;
        run.validate()?;
        Ok(run)
    }

    /// Load and validate a run from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let run = Self::from_json_str(&raw)?;
        tracing::info!(
            "Loaded {} records ({} mode) from {}",
            run.results.len(),
            run.mode,
            path.display()
        );
        Ok(run)
    }

    /// Generate a seeded run for demos and tests.
    ///
    /// Genuine statements draw scores from [0.35, 1.0], fake ones from
    /// [0.0, 0.65], rounded to two decimals like model output.
    pub fn synthetic(size: usize, iterations: usize, mode: EvaluationMode, seed: u64) -> Self {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let genuine_phrases = [
            "According to official reports",
            "Research published in peer-reviewed journal",
            "Statement from verified spokesperson",
        ];
        let fake_phrases = [
            "BREAKING: Scientists confirm shocking discovery",
            "The government doesn't want you to know",
            "This miracle cure doctors hate",
        ];

        let results = (0..size)
            .map(|i| {
                let genuine = rng.gen_bool(0.5);
                let phrases = if genuine { &genuine_phrases } else { &fake_phrases };
                let phrase = phrases[rng.gen_range(0..phrases.len())];

                let scores: Vec<f64> = (0..iterations)
                    .map(|_| {
                        let raw: f64 = rng.gen::<f64>() * 0.65;
                        let shifted = if genuine { raw + 0.35 } else { raw };
                        (shifted * 100.0).round() / 100.0
                    })
                    .collect();
                let predictions = scores.iter().map(|s| *s >= 0.5).collect();

                ResultRecord {
                    statement: format!("{} - statement {}", phrase, i),
                    gold_binary: genuine,
                    scores,
                    predictions,
                }
            })
            .collect();

        Self::new(mode, results)
    }
}
