//! Reconciliation of the rule-based and model-based scoring sources.
//!
//! Score: the rule-based ATS score wins when it is positive, then the model
//! score, then 0. Role: the model's inferred role wins over the role the
//! applicant declared, then "Unknown".

use serde::Serialize;

pub const UNKNOWN_ROLE: &str = "Unknown";

pub fn resolve_score(rule_score: Option<f64>, model_score: Option<i64>) -> f64 {
    match (rule_score, model_score) {
        (Some(rule), _) if rule > 0.0 => rule,
        (_, Some(model)) if model > 0 => model as f64,
        _ => 0.0,
    }
}

pub fn resolve_role<'a>(model_role: Option<&'a str>, target_role: Option<&'a str>) -> &'a str {
    model_role
        .filter(|r| !r.is_empty())
        .or_else(|| target_role.filter(|r| !r.is_empty()))
        .unwrap_or(UNKNOWN_ROLE)
}

/// Four-bin score classification; each bin includes its lower edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBucket {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl ScoreBucket {
    pub const ORDER: [ScoreBucket; 4] = [
        ScoreBucket::Excellent,
        ScoreBucket::Good,
        ScoreBucket::Average,
        ScoreBucket::NeedsImprovement,
    ];

    pub fn classify(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBucket::Excellent
        } else if score >= 60.0 {
            ScoreBucket::Good
        } else if score >= 40.0 {
            ScoreBucket::Average
        } else {
            ScoreBucket::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBucket::Excellent => "Excellent (80-100)",
            ScoreBucket::Good => "Good (60-79)",
            ScoreBucket::Average => "Average (40-59)",
            ScoreBucket::NeedsImprovement => "Needs Improvement (0-39)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub range: &'static str,
    pub count: i64,
}

/// Buckets scores into all four bins, in fixed order. Zero means "no
/// analysis ran" and is skipped, never counted as Needs Improvement.
pub fn score_distribution(scores: impl IntoIterator<Item = f64>) -> Vec<BucketCount> {
    let mut counts = [0i64; 4];
    for score in scores.into_iter().filter(|s| *s > 0.0) {
        let bucket = ScoreBucket::classify(score);
        if let Some(idx) = ScoreBucket::ORDER.iter().position(|b| *b == bucket) {
            counts[idx] += 1;
        }
    }
    ScoreBucket::ORDER
        .iter()
        .zip(counts)
        .map(|(bucket, count)| BucketCount {
            range: bucket.label(),
            count,
        })
        .collect()
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
