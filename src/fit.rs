//! Parameters of fit for fuzzy-set relations
//!
//! `x` is membership in a condition or configuration, `y` in the outcome,
//! both row-aligned over the same cases. Ratios with a zero denominator are
//! reported as 0.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fit of `X ⊆ Y` (X sufficient for Y)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SufficiencyFit {
    /// Σ min(X, Y) / Σ X
    pub consistency: f64,
    /// Proportional reduction in inconsistency
    pub pri: f64,
    /// Σ min(X, Y) / Σ Y
    pub coverage: f64,
}

/// Fit of `Y ⊆ X` (X necessary for Y)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NecessityFit {
    /// Σ min(X, Y) / Σ Y
    pub consistency: f64,
    /// Σ min(X, Y) / Σ X
    pub coverage: f64,
    /// Relevance of necessity: Σ (1 - X) / Σ (1 - min(X, Y))
    pub relevance: f64,
}

pub fn sufficiency(x: &[f64], y: &[f64]) -> SufficiencyFit {
    debug_assert_eq!(x.len(), y.len());
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xy_not_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let xy = xi.min(yi);
        sum_x += xi;
        sum_y += yi;
        sum_xy += xy;
        sum_xy_not_y += xy.min(1.0 - yi);
    }
    SufficiencyFit {
        consistency: ratio(sum_xy, sum_x),
        pri: ratio(sum_xy - sum_xy_not_y, sum_x - sum_xy_not_y),
        coverage: ratio(sum_xy, sum_y),
    }
}

pub fn necessity(x: &[f64], y: &[f64]) -> NecessityFit {
    debug_assert_eq!(x.len(), y.len());
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_not_x = 0.0;
    let mut sum_not_xy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let xy = xi.min(yi);
        sum_x += xi;
        sum_y += yi;
        sum_xy += xy;
        sum_not_x += 1.0 - xi;
        sum_not_xy += 1.0 - xy;
    }
    NecessityFit {
        consistency: ratio(sum_xy, sum_y),
        coverage: ratio(sum_xy, sum_x),
        relevance: ratio(sum_not_x, sum_not_xy),
    }
}

/// Fuzzy AND
pub fn intersection(memberships: impl IntoIterator<Item = f64>) -> f64 {
    memberships.into_iter().fold(1.0, f64::min)
}

/// Fuzzy OR
pub fn union(memberships: impl IntoIterator<Item = f64>) -> f64 {
    memberships.into_iter().fold(0.0, f64::max)
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        (num / den).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
