//! Analysis configuration
//!
//! Every threshold and cutoff the analysis uses comes from an explicit
//! [`AnalysisConfig`], normally loaded from YAML:
//!
//! ```yaml
//! case_id: country
//! outcome: democracy
//! conditions: [press, trust, growth]
//! calibration:
//!   democracy: { exclusion: 0.71, crossover: 0.77, inclusion: 0.83 }
//!   press:     { exclusion: 30, crossover: 50, inclusion: 70 }
//!   trust:     { exclusion: 0.2, crossover: 0.4, inclusion: 0.6 }
//!   growth:    { exclusion: -1, crossover: 2, inclusion: 5 }
//! cutoffs:
//!   inclusion: 0.8
//!   necessity: 0.9
//!   coverage: 0.6
//! remainders: exclude
//! ```
//!
//! The config is passed by reference through every pipeline stage. There is
//! no ambient or global configuration.

use crate::calibrate::ThresholdTriplet;
use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Complete configuration of one fsQCA run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Name of the input column holding case labels
    pub case_id: String,

    /// Raw outcome column
    pub outcome: String,

    /// Analyse the negated outcome (~Y) instead of the outcome
    #[serde(default)]
    pub negate_outcome: bool,

    /// Conditions included in the analysis, in truth table column order
    pub conditions: Vec<String>,

    /// One threshold triplet per condition and for the outcome
    pub calibration: BTreeMap<String, ThresholdTriplet>,

    pub cutoffs: Cutoffs,

    /// How logical remainders are used during minimization
    #[serde(default)]
    pub remainders: RemainderPolicy,
}

/// Cutoffs for classifying truth table rows and reporting fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Cutoffs {
    /// Minimum raw consistency for a truth table row to be positive
    pub inclusion: f64,

    /// Minimum necessity consistency for a condition to be reported as necessary
    pub necessity: f64,

    /// Minimum coverage for necessity results to be reported
    pub coverage: f64,

    /// Minimum number of cases for a corner to count as empirically observed
    #[serde(default = "default_frequency")]
    pub frequency: usize,
}

fn default_frequency() -> usize {
    1
}

/// Treatment of logical remainders during minimization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RemainderPolicy {
    /// Remainders are excluded: conservative (complex) solution
    #[default]
    Exclude,
    /// Remainders are don't-cares: parsimonious solution
    Include,
}

impl RemainderPolicy {
    pub fn solution_kind(self) -> &'static str {
        match self {
            RemainderPolicy::Exclude => "conservative",
            RemainderPolicy::Include => "parsimonious",
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a YAML config
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_norway::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_norway::to_string(self)?)
    }

    /// Threshold triplet for a condition or the outcome
    pub fn thresholds(&self, name: &str) -> Result<&ThresholdTriplet> {
        self.calibration
            .get(name)
            .ok_or_else(|| Error::MissingCalibration(name.to_string()))
    }

    /// Outcome label as used in reports (`~Y` when negated)
    pub fn outcome_label(&self) -> String {
        if self.negate_outcome {
            format!("~{}", self.outcome)
        } else {
            self.outcome.clone()
        }
    }

    /// Structural checks that need no data
    ///
    /// Missing triplets are not checked here: they surface as
    /// [`Error::MissingCalibration`] when the condition set is built.
    pub fn validate(&self) -> Result<()> {
        if self.case_id.trim().is_empty() {
            return Err(Error::Configuration("case_id must not be empty".into()));
        }
        if self.conditions.is_empty() {
            return Err(Error::Configuration(
                "at least one condition is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for condition in &self.conditions {
            if condition.trim().is_empty() {
                return Err(Error::Configuration("condition names must not be empty".into()));
            }
            if !seen.insert(condition.as_str()) {
                return Err(Error::Configuration(format!(
                    "condition '{}' is listed more than once",
                    condition
                )));
            }
            if condition == &self.outcome {
                return Err(Error::Configuration(format!(
                    "'{}' cannot be both the outcome and a condition",
                    condition
                )));
            }
            if condition == &self.case_id {
                return Err(Error::Configuration(format!(
                    "'{}' is the case label column and cannot be a condition",
                    condition
                )));
            }
        }

        for (name, triplet) in &self.calibration {
            triplet.validate().map_err(|e| match e {
                Error::Configuration(msg) => Error::Configuration(format!("{}: {}", name, msg)),
                other => other,
            })?;
        }

        self.cutoffs.validate()
    }
}

impl Cutoffs {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("inclusion", self.inclusion),
            ("necessity", self.necessity),
            ("coverage", self.coverage),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Configuration(format!(
                    "{} cutoff must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.frequency == 0 {
            return Err(Error::Configuration(
                "frequency cutoff must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
