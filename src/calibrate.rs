//! Direct calibration of raw indicator values into fuzzy-set membership
//!
//! A [`ThresholdTriplet`] names three anchors on the raw scale: full
//! non-membership, the crossover point, and full membership. Between the
//! anchors membership follows a logistic segment, rescaled so that the
//! anchors map to exactly 0, 0.5 and 1:
//!
//! ```text
//!  1.0 ┤                        ╭──────────
//!      │                    ╭───╯
//!  0.5 ┤──────────────────╳╯
//!      │              ╭──╯
//!  0.0 ┤──────────────╯
//!      └──────────────┬───┬───┬───────────
//!                     a   b   c
//! ```
//!
//! The logistic curvature uses the log-odds of the conventional 0.95
//! membership score of the direct method, so the curve is flat near the
//! outer anchors and steepest through the crossover.

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ln(0.95 / 0.05)
pub const FULL_MEMBERSHIP_LOG_ODDS: f64 = 2.944_438_979_166_440_4;

/// Calibration anchors for one indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ThresholdTriplet {
    /// Raw value at and below which membership is 0
    pub exclusion: f64,

    /// Raw value that maps to 0.5
    pub crossover: f64,

    /// Raw value at and above which membership is 1
    pub inclusion: f64,
}

impl ThresholdTriplet {
    /// Create a triplet, checking the strict ordering of its anchors
    pub fn new(exclusion: f64, crossover: f64, inclusion: f64) -> Result<Self> {
        let triplet = Self {
            exclusion,
            crossover,
            inclusion,
        };
        triplet.validate()?;
        Ok(triplet)
    }

    /// Check `exclusion < crossover < inclusion` with finite anchors
    pub fn validate(&self) -> Result<()> {
        let anchors = [self.exclusion, self.crossover, self.inclusion];
        if anchors.iter().any(|v| !v.is_finite()) {
            return Err(Error::Configuration(format!(
                "threshold triplet {} contains a non-finite anchor",
                self
            )));
        }
        if !(self.exclusion < self.crossover && self.crossover < self.inclusion) {
            return Err(Error::Configuration(format!(
                "threshold triplet {} must satisfy exclusion < crossover < inclusion",
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ThresholdTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.exclusion, self.crossover, self.inclusion
        )
    }
}

/// Calibrate a single raw value
pub fn calibrate(x: f64, thresholds: &ThresholdTriplet) -> Result<f64> {
    thresholds.validate()?;
    if !x.is_finite() {
        return Err(Error::DataShape(format!(
            "cannot calibrate non-finite raw value {}",
            x
        )));
    }
    Ok(membership(x, thresholds))
}

/// A calibrated column together with the rows that landed on the crossover
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedColumn {
    pub memberships: Vec<f64>,

    /// Row positions whose membership is exactly 0.5
    pub ambiguous: Vec<usize>,
}

/// Calibrate a whole column and scan it for ambiguous memberships
pub fn calibrate_column(values: &[f64], thresholds: &ThresholdTriplet) -> Result<CalibratedColumn> {
    thresholds.validate()?;

    let mut memberships = Vec::with_capacity(values.len());
    for (row, &x) in values.iter().enumerate() {
        if !x.is_finite() {
            return Err(Error::DataShape(format!(
                "row {} holds non-finite raw value {}",
                row + 1,
                x
            )));
        }
        memberships.push(membership(x, thresholds));
    }

    let ambiguous = memberships
        .iter()
        .enumerate()
        .filter(|(_, &m)| m == 0.5)
        .map(|(row, _)| row)
        .collect();

    Ok(CalibratedColumn {
        memberships,
        ambiguous,
    })
}

fn membership(x: f64, t: &ThresholdTriplet) -> f64 {
    let ThresholdTriplet {
        exclusion: a,
        crossover: b,
        inclusion: c,
    } = *t;

    if x <= a {
        0.0
    } else if x >= c {
        1.0
    } else if x == b {
        0.5
    } else if x < b {
        // Rounding must not land a non-crossover value on 0.5
        (0.5 * half_curve((b - x) / (b - a))).min(0.5f64.next_down())
    } else {
        (1.0 - 0.5 * half_curve((x - b) / (c - b))).max(0.5f64.next_up())
    }
}

/// Rescaled logistic on `d` in [0, 1]: 1 at the crossover, 0 at the outer anchor
fn half_curve(d: f64) -> f64 {
    let floor = sigmoid(-FULL_MEMBERSHIP_LOG_ODDS);
    (sigmoid(-FULL_MEMBERSHIP_LOG_ODDS * d) - floor) / (0.5 - floor)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
