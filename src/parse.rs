// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Parsing of raw classifier replies into per-trial verdicts
//!
//! The classifier is asked for JSON but does not always comply. Parsing is
//! lenient: JSON first, then keyword heuristics, then the first number that
//! looks like a probability.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// One parsed trial: vote for "genuine" plus the confidence behind it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub vote: bool,
    pub score: f64,
}

impl Verdict {
    fn from_score(score: f64) -> Self {
        Self {
            vote: score >= 0.5,
            score,
        }
    }
}

fn probability_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b0(?:\.\d+)?|1(?:\.0+)?\b").expect("valid regex"))
}

/// Parse a single raw reply. Never fails; unreadable replies count as
/// a confident "fake" verdict with score 0.
pub fn parse_verdict(raw: &str) -> Verdict {
    let raw = raw.trim();

    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(raw) {
        if let Some(verdict) = parse_json_verdict(&obj) {
            return verdict;
        }
    }

    parse_text_verdict(raw)
}

fn parse_json_verdict(obj: &Map<String, Value>) -> Option<Verdict> {
    match obj.get("score") {
        Some(Value::Number(n)) => n.as_f64().map(Verdict::from_score),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(Verdict::from_score),
        Some(_) => None,
        None => match obj.get("verdict") {
            None => Some(Verdict { vote: false, score: 0.0 }),
            Some(Value::String(v)) => Some(Verdict {
                vote: v.trim().eq_ignore_ascii_case("true"),
                score: 0.0,
            }),
            Some(_) => None,
        },
    }
}

fn parse_text_verdict(raw: &str) -> Verdict {
    let low = raw.to_lowercase();
    let says_true = low.contains("true");
    let says_false = low.contains("false");

    if says_true && !says_false {
        return Verdict { vote: true, score: 1.0 };
    }
    if says_false && !says_true {
        return Verdict { vote: false, score: 0.0 };
    }

    probability_pattern()
        .find(&low)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(Verdict::from_score)
        .unwrap_or(Verdict { vote: false, score: 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_score() {
        let v = parse_verdict(r#"{"score": 0.72, "verdict": "false"}"#);
        assert!(v.vote);
        assert!((v.score - 0.72).abs() < 1e-9);
    }

    #[test]
    fn test_json_score_at_cutoff_is_genuine() {
        assert!(parse_verdict(r#"{"score": 0.5}"#).vote);
        assert!(!parse_verdict(r#"{"score": "0.49"}"#).vote);
    }

    #[test]
    fn test_json_verdict_only() {
        let v = parse_verdict(r#" {"verdict": " TRUE "} "#);
        assert_eq!(v, Verdict { vote: true, score: 0.0 });

        let v = parse_verdict(r#"{"explanation": "none"}"#);
        assert_eq!(v, Verdict { vote: false, score: 0.0 });
    }

    #[test]
    fn test_keyword_heuristic() {
        assert_eq!(parse_verdict("Verdict: True"), Verdict { vote: true, score: 1.0 });
        assert_eq!(parse_verdict("clearly FALSE"), Verdict { vote: false, score: 0.0 });
    }

    #[test]
    fn test_number_fallback() {
        let v = parse_verdict("confidence 0.85, could be true or false");
        assert!(v.vote);
        assert!((v.score - 0.85).abs() < 1e-9);

        let v = parse_verdict("0.3");
        assert_eq!(v, Verdict { vote: false, score: 0.3 });
    }

    #[test]
    fn test_unreadable_reply() {
        assert_eq!(parse_verdict("no idea"), Verdict { vote: false, score: 0.0 });
        assert_eq!(parse_verdict(""), Verdict { vote: false, score: 0.0 });
    }
}
