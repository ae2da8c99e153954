// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Expansion of per-statement records into flat (prediction, truth) samples

use crate::records::{EvaluationMode, ResultRecord};
use serde::{Deserialize, Serialize};

/// One trial of one statement in score mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredSample {
    pub score: f64,
    /// `gold_binary` of the owning record
    pub truth: bool,
}

/// One statement after majority vote in binary mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotedSample {
    /// `true` = the majority voted "genuine"
    pub vote: bool,
    pub truth: bool,
}

/// Flattened samples, shaped by the evaluation mode
#[derive(Debug, Clone, PartialEq)]
pub enum FlatSamples {
    Scored(Vec<ScoredSample>),
    Voted(Vec<VotedSample>),
}

impl FlatSamples {
    pub fn len(&self) -> usize {
        match self {
            FlatSamples::Scored(s) => s.len(),
            FlatSamples::Voted(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Predictor column in a single numeric form (votes as 1.0 / 0.0)
    pub fn predictors(&self) -> Vec<f64> {
        match self {
            FlatSamples::Scored(s) => s.iter().map(|x| x.score).collect(),
            FlatSamples::Voted(v) => v.iter().map(|x| if x.vote { 1.0 } else { 0.0 }).collect(),
        }
    }

    pub fn truths(&self) -> Vec<bool> {
        match self {
            FlatSamples::Scored(s) => s.iter().map(|x| x.truth).collect(),
            FlatSamples::Voted(v) => v.iter().map(|x| x.truth).collect(),
        }
    }
}

/// Strict majority of "genuine" votes; an even split resolves to `false`.
/// Returns `None` for a record without trials.
pub fn majority_vote(record: &ResultRecord, cutoff: f64) -> Option<bool> {
    let votes = record.trial_votes(cutoff);
    if votes.is_empty() {
        return None;
    }
    let yes = votes.iter().filter(|v| **v).count();
    Some(yes * 2 > votes.len())
}

/// Flatten `results` according to `mode`.
///
/// Score modes emit one sample per trial with the record's truth broadcast.
/// Binary modes emit one majority-vote sample per record. Records without
/// trials are skipped.
pub fn flatten(results: &[ResultRecord], mode: EvaluationMode, vote_cutoff: f64) -> FlatSamples {
    let skipped = results
        .iter()
        .filter(|r| {
            if mode.is_binary() {
                r.trial_count() == 0
            } else {
                r.scores.is_empty()
            }
        })
        .count();
    if skipped > 0 {
        tracing::warn!("Skipping {} records without trials", skipped);
    }

    if mode.is_binary() {
        FlatSamples::Voted(
            results
                .iter()
                .filter_map(|record| {
                    majority_vote(record, vote_cutoff).map(|vote| VotedSample {
                        vote,
                        truth: record.gold_binary,
                    })
                })
                .collect(),
        )
    } else {
        FlatSamples::Scored(
            results
                .iter()
                .flat_map(|record| {
                    record.scores.iter().map(move |score| ScoredSample {
                        score: *score,
                        truth: record.gold_binary,
                    })
                })
                .collect(),
        )
    }
}
