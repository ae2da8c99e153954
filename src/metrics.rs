// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Confusion matrix and the selected operating point
//!
//! The operating point shown to the user treats "fake" as the positive
//! class: a sample is predicted positive when it was NOT voted or scored
//! genuine, and actually positive when `gold_binary` is `false`. The
//! threshold sweep in [`crate::sweep`] uses the opposite polarity.

use crate::flatten::{FlatSamples, ScoredSample, VotedSample};
use serde::{Deserialize, Serialize};

/// Confusion matrix for binary classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// True Positives
    #[serde(rename = "TP")]
    pub tp: usize,
    /// False Positives
    #[serde(rename = "FP")]
    pub fp: usize,
    /// False Negatives
    #[serde(rename = "FN")]
    pub fn_: usize,
    /// True Negatives
    #[serde(rename = "TN")]
    pub tn: usize,
}

impl ConfusionMatrix {
    /// Tally one sample
    pub fn record(&mut self, predicted_positive: bool, actually_positive: bool) {
        match (predicted_positive, actually_positive) {
            (true, true) => self.tp += 1,
            (true, false) => self.fp += 1,
            (false, true) => self.fn_ += 1,
            (false, false) => self.tn += 1,
        }
    }

    /// Total number of samples
    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// Accuracy: (TP + TN) / Total
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// Precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// Recall (Sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Specificity: TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }

    /// False positive rate: FP / (FP + TN)
    pub fn false_positive_rate(&self) -> f64 {
        ratio(self.fp, self.fp + self.tn)
    }

    /// F1 Score: 2 * (Precision * Recall) / (Precision + Recall)
    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        let denom = precision + recall;
        if denom == 0.0 {
            return 0.0;
        }
        2.0 * precision * recall / denom
    }

    /// Balanced Accuracy: (Sensitivity + Specificity) / 2
    pub fn balanced_accuracy(&self) -> f64 {
        (self.recall() + self.specificity()) / 2.0
    }
}

/// `num / denom`, or 0 when the denominator is empty
pub(crate) fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        return 0.0;
    }
    num as f64 / denom as f64
}

/// Fake-positive matrix over score samples at `threshold`
pub fn score_confusion(samples: &[ScoredSample], threshold: f64) -> ConfusionMatrix {
    let mut matrix = ConfusionMatrix::default();
    for sample in samples {
        let pred_fake = sample.score < threshold;
        let gt_fake = !sample.truth;
        matrix.record(pred_fake, gt_fake);
    }
    matrix
}

/// Fake-positive matrix over majority-vote samples
pub fn vote_confusion(samples: &[VotedSample]) -> ConfusionMatrix {
    let mut matrix = ConfusionMatrix::default();
    for sample in samples {
        matrix.record(!sample.vote, !sample.truth);
    }
    matrix
}

/// Matrix for the currently selected operating point.
///
/// Voted samples defer to a server-reported matrix when one exists. Scored
/// samples are always recomputed at `threshold`.
pub fn select_confusion(
    flat: &FlatSamples,
    threshold: f64,
    precomputed: Option<&ConfusionMatrix>,
) -> ConfusionMatrix {
    match flat {
        FlatSamples::Scored(samples) => score_confusion(samples, threshold),
        FlatSamples::Voted(samples) => match precomputed {
            Some(matrix) => *matrix,
            None => vote_confusion(samples),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_matrix_perfect() {
        let cm = ConfusionMatrix { tp: 2, fp: 0, fn_: 0, tn: 2 };

        assert!((cm.accuracy() - 1.0).abs() < 1e-6);
        assert!((cm.f1_score() - 1.0).abs() < 1e-6);
        assert!((cm.balanced_accuracy() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_denominators_fall_back_to_zero() {
        let cm = ConfusionMatrix::default();

        assert_eq!(cm.precision(), 0.0);
        assert_eq!(cm.recall(), 0.0);
        assert_eq!(cm.specificity(), 0.0);
        assert_eq!(cm.f1_score(), 0.0);
        assert_eq!(cm.balanced_accuracy(), 0.0);
        assert_eq!(cm.accuracy(), 0.0);
    }

    #[test]
    fn test_f1_zero_when_precision_and_recall_zero() {
        let cm = ConfusionMatrix { tp: 0, fp: 3, fn_: 4, tn: 1 };
        assert_eq!(cm.f1_score(), 0.0);
    }

    #[test]
    fn test_derived_scalars() {
        let cm = ConfusionMatrix { tp: 3, fp: 1, fn_: 2, tn: 4 };

        assert!((cm.precision() - 0.75).abs() < 1e-9);
        assert!((cm.recall() - 0.6).abs() < 1e-9);
        assert!((cm.specificity() - 0.8).abs() < 1e-9);
        assert!((cm.f1_score() - 2.0 * 0.75 * 0.6 / 1.35).abs() < 1e-9);
        assert!((cm.balanced_accuracy() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_score_confusion_fake_polarity() {
        // gold_binary=true means genuine, so both samples are actual negatives
        let samples = vec![
            ScoredSample { score: 0.9, truth: true },
            ScoredSample { score: 0.2, truth: true },
        ];

        let cm = score_confusion(&samples, 0.5);
        assert_eq!((cm.tp, cm.fp, cm.fn_, cm.tn), (0, 1, 0, 1));
    }

    #[test]
    fn test_vote_confusion_fake_polarity() {
        let samples = vec![
            VotedSample { vote: false, truth: false },
            VotedSample { vote: true, truth: false },
            VotedSample { vote: false, truth: true },
            VotedSample { vote: true, truth: true },
            VotedSample { vote: true, truth: true },
        ];

        let cm = vote_confusion(&samples);
        assert_eq!((cm.tp, cm.fp, cm.fn_, cm.tn), (1, 1, 1, 2));
    }

    #[test]
    fn test_precomputed_matrix_only_applies_to_votes() {
        let server = ConfusionMatrix { tp: 9, fp: 8, fn_: 7, tn: 6 };
        let voted = FlatSamples::Voted(vec![VotedSample { vote: true, truth: true }]);
        let scored = FlatSamples::Scored(vec![ScoredSample { score: 0.9, truth: true }]);

        assert_eq!(select_confusion(&voted, 0.5, Some(&server)), server);
        assert_eq!(select_confusion(&voted, 0.5, None).tn, 1);
        assert_eq!(select_confusion(&scored, 0.5, Some(&server)).tn, 1);
    }

    #[test]
    fn test_serde_uses_backend_keys() {
        let cm = ConfusionMatrix { tp: 1, fp: 2, fn_: 3, tn: 4 };
        let json = serde_json::to_value(cm).unwrap();

        assert_eq!(json["TP"], 1);
        assert_eq!(json["FN"], 3);
        let back: ConfusionMatrix = serde_json::from_value(json).unwrap();
        assert_eq!(back, cm);
    }
}
