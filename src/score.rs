//! Schema health score
//!
//! Every schema starts at 100. Each Critical suggestion costs 15 points and
//! each Moderate one costs 5; Good-practice notes are free. The result is
//! floored at 0. An empty list scores 0 because there is nothing to judge
//! yet, not because the schema is perfect.
//!
//! | Score  | Band    |
//! |--------|---------|
//! | 81-100 | Healthy |
//! | 51-80  | Fair    |
//! | 0-50   | Poor    |

use crate::model::Suggestion;
use serde::Serialize;
use std::fmt;

pub const MAX_SCORE: u32 = 100;

pub fn score(suggestions: &[Suggestion]) -> u8 {
    if suggestions.is_empty() {
        return 0;
    }
    let deductions: u32 = suggestions.iter().map(|s| s.severity.deduction()).sum();
    MAX_SCORE.saturating_sub(deductions) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthBand {
    Healthy,
    Fair,
    Poor,
}

impl HealthBand {
    pub fn from_score(score: u8) -> Self {
        if score > 80 {
            HealthBand::Healthy
        } else if score > 50 {
            HealthBand::Fair
        } else {
            HealthBand::Poor
        }
    }

    /// Gauge colour.
    pub fn color(&self) -> &'static str {
        match self {
            HealthBand::Healthy => "#22c55e",
            HealthBand::Fair => "#f59e0b",
            HealthBand::Poor => "#ef4444",
        }
    }
}

impl fmt::Display for HealthBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HealthBand::Healthy => "HEALTHY",
            HealthBand::Fair => "FAIR",
            HealthBand::Poor => "POOR",
        })
    }
}
