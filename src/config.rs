// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Engine configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable constants for the metrics engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Decision threshold for the score-mode operating point
    pub threshold: f64,
    /// A trial counts as a vote for "genuine" when its score is at least this
    pub vote_cutoff: f64,
    /// Offset of the sentinel thresholds above the max and below the min score
    pub sentinel_epsilon: f64,
    /// Number of equal-width histogram bins over [0, 1]
    pub histogram_bins: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            vote_cutoff: 0.5,
            sentinel_epsilon: 1e-6,
            histogram_bins: 10,
        }
    }
}

impl MetricsConfig {
    /// Load a configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        tracing::info!("Loaded metrics config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: MetricsConfig = serde_json::from_str(r#"{"threshold": 0.7}"#).unwrap();

        assert!((config.threshold - 0.7).abs() < 1e-9);
        assert!((config.vote_cutoff - 0.5).abs() < 1e-9);
        assert_eq!(config.histogram_bins, 10);
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        std::fs::write(&path, r#"{"histogram_bins": 4, "sentinel_epsilon": 0.01}"#).unwrap();

        let config = MetricsConfig::from_file(&path).unwrap();
        assert_eq!(config.histogram_bins, 4);
        assert!((config.sentinel_epsilon - 0.01).abs() < 1e-9);
        assert!((config.threshold - 0.5).abs() < 1e-9);
    }
}
