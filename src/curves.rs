// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! ROC and precision-recall curves from swept operating points
//!
//! Implements:
//! - ROC points sorted by false positive rate
//! - PR points sorted by recall, with precision 1 where nothing is predicted positive
//! - Trapezoidal area under both curves

use crate::flatten::ScoredSample;
use crate::metrics::ratio;
use crate::sweep::{sweep, OperatingPoint};
use serde::{Deserialize, Serialize};

/// One point of the ROC curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub threshold: f64,
    pub fpr: f64,
    pub tpr: f64,
}

/// One point of the precision-recall curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrPoint {
    pub recall: f64,
    pub precision: f64,
}

/// Both curves and their areas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curves {
    pub roc: Vec<RocPoint>,
    pub pr: Vec<PrPoint>,
    pub roc_auc: f64,
    pub pr_auc: f64,
}

impl Curves {
    pub fn from_operating_points(points: &[OperatingPoint]) -> Self {
        let roc = roc_curve(points);
        let pr = pr_curve(points);
        Self {
            roc_auc: trapezoid(roc.iter().map(|p| (p.fpr, p.tpr))),
            pr_auc: trapezoid(pr.iter().map(|p| (p.recall, p.precision))),
            roc,
            pr,
        }
    }

    /// Sweep `samples` and build both curves
    pub fn from_scored(samples: &[ScoredSample], epsilon: f64) -> Self {
        Self::from_operating_points(&sweep(samples, epsilon))
    }
}

/// ROC points in ascending `fpr` order. Ties keep sweep order.
pub fn roc_curve(points: &[OperatingPoint]) -> Vec<RocPoint> {
    let mut roc: Vec<RocPoint> = points
        .iter()
        .map(|p| RocPoint {
            threshold: p.threshold,
            fpr: p.confusion.false_positive_rate(),
            tpr: p.confusion.recall(),
        })
        .collect();
    roc.sort_by(|a, b| a.fpr.total_cmp(&b.fpr));
    roc
}

/// PR points in ascending `recall` order. Ties keep sweep order.
pub fn pr_curve(points: &[OperatingPoint]) -> Vec<PrPoint> {
    let mut pr: Vec<PrPoint> = points
        .iter()
        .map(|p| {
            let cm = &p.confusion;
            let predicted = cm.tp + cm.fp;
            PrPoint {
                recall: cm.recall(),
                precision: if predicted == 0 { 1.0 } else { ratio(cm.tp, predicted) },
            }
        })
        .collect();
    pr.sort_by(|a, b| a.recall.total_cmp(&b.recall));
    pr
}

/// Trapezoidal area under an x-sorted sequence of `(x, y)` points.
/// The first point contributes nothing; empty input has area 0.
pub fn trapezoid(points: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let mut area = 0.0;
    let mut prev: Option<(f64, f64)> = None;
    for (x, y) in points {
        let (px, py) = prev.unwrap_or((x, y));
        area += (x - px) * (y + py) / 2.0;
        prev = Some((x, y));
    }
    area
}
