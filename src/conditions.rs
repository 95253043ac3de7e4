//! Condition set builder
//!
//! Applies the calibrator column by column, each column with its own
//! threshold triplet, and keeps every derived column row-aligned with the
//! raw table.

use crate::calibrate::calibrate_column;
use crate::config::AnalysisConfig;
use crate::dataset::RawTable;
use crate::error::{Error, Result};
use crate::warning::Warning;
use serde::Serialize;
use std::io::Write;

/// Calibrated conditions and outcome, one row per case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibratedTable {
    /// Name of the case label column
    pub case_id: String,

    pub case_ids: Vec<String>,

    pub conditions: Vec<String>,

    pub outcome: String,

    /// `memberships[case][condition]`
    pub memberships: Vec<Vec<f64>>,

    pub outcome_memberships: Vec<f64>,

    /// Crossover hits found while calibrating
    pub warnings: Vec<Warning>,
}

impl CalibratedTable {
    /// Assemble a table from membership scores, checking alignment and range
    pub fn new(
        case_id: impl Into<String>,
        case_ids: Vec<String>,
        conditions: Vec<String>,
        outcome: impl Into<String>,
        memberships: Vec<Vec<f64>>,
        outcome_memberships: Vec<f64>,
    ) -> Result<Self> {
        let table = Self {
            case_id: case_id.into(),
            case_ids,
            conditions,
            outcome: outcome.into(),
            memberships,
            outcome_memberships,
            warnings: Vec::new(),
        };
        table.check_shape()?;
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.case_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.case_ids.is_empty()
    }

    /// Membership of every case in one condition
    pub fn condition_column(&self, index: usize) -> Vec<f64> {
        self.memberships.iter().map(|row| row[index]).collect()
    }

    /// Outcome memberships, complemented when `negate` is set
    pub fn outcome_column(&self, negate: bool) -> Vec<f64> {
        if negate {
            self.outcome_memberships.iter().map(|y| 1.0 - y).collect()
        } else {
            self.outcome_memberships.clone()
        }
    }

    /// Cases whose membership in a condition is exactly 0.5
    pub fn ambiguous_cases(&self, index: usize) -> Vec<String> {
        self.memberships
            .iter()
            .zip(&self.case_ids)
            .filter(|(row, _)| row[index] == 0.5)
            .map(|(_, id)| id.clone())
            .collect()
    }

    /// Write as CSV: label column, conditions, then outcome
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut header = Vec::with_capacity(self.conditions.len() + 2);
        header.push(self.case_id.as_str());
        header.extend(self.conditions.iter().map(String::as_str));
        header.push(self.outcome.as_str());
        writer.write_record(&header)?;

        for ((id, row), y) in self
            .case_ids
            .iter()
            .zip(&self.memberships)
            .zip(&self.outcome_memberships)
        {
            let mut record = Vec::with_capacity(row.len() + 2);
            record.push(id.clone());
            record.extend(row.iter().map(|m| m.to_string()));
            record.push(y.to_string());
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::Other(e.to_string()))
    }

    fn check_shape(&self) -> Result<()> {
        let n = self.case_ids.len();
        if self.memberships.len() != n || self.outcome_memberships.len() != n {
            return Err(Error::DataShape(format!(
                "{} case labels but {} condition rows and {} outcome values",
                n,
                self.memberships.len(),
                self.outcome_memberships.len()
            )));
        }
        for (id, row) in self.case_ids.iter().zip(&self.memberships) {
            if row.len() != self.conditions.len() {
                return Err(Error::DataShape(format!(
                    "case '{}' has {} memberships, expected {}",
                    id,
                    row.len(),
                    self.conditions.len()
                )));
            }
            if row.iter().any(|m| !(0.0..=1.0).contains(m)) {
                return Err(Error::DataShape(format!(
                    "case '{}' has a membership outside [0, 1]",
                    id
                )));
            }
        }
        if self
            .outcome_memberships
            .iter()
            .any(|m| !(0.0..=1.0).contains(m))
        {
            return Err(Error::DataShape(
                "outcome membership outside [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Calibrate every configured condition and the outcome
///
/// All triplets are looked up before any column is calibrated, so a missing
/// one fails the run with [`Error::MissingCalibration`] without partial work.
#[tracing::instrument(skip_all, fields(cases = raw.len(), conditions = config.conditions.len()))]
pub fn build_condition_set(raw: &RawTable, config: &AnalysisConfig) -> Result<CalibratedTable> {
    let condition_thresholds = config
        .conditions
        .iter()
        .map(|name| config.thresholds(name))
        .collect::<Result<Vec<_>>>()?;
    let outcome_thresholds = config.thresholds(&config.outcome)?;

    if raw.is_empty() {
        return Err(Error::DataShape("input table has no cases".to_string()));
    }

    let case_ids = raw.case_ids();
    let mut warnings = Vec::new();
    let mut columns = Vec::with_capacity(config.conditions.len());

    for (name, thresholds) in config.conditions.iter().zip(condition_thresholds) {
        let values = raw.column(name)?;
        let column = calibrate_column(&values, thresholds)?;
        if column.memberships.len() != case_ids.len() {
            return Err(Error::DataShape(format!(
                "calibrated column '{}' has {} rows, input has {}",
                name,
                column.memberships.len(),
                case_ids.len()
            )));
        }
        for &row in &column.ambiguous {
            tracing::warn!(case = %case_ids[row], condition = %name, "membership is exactly 0.5");
            warnings.push(Warning::AmbiguousMembership {
                case: case_ids[row].clone(),
                set: name.clone(),
                raw: values[row],
            });
        }
        tracing::debug!(condition = %name, thresholds = %thresholds, "calibrated");
        columns.push(column.memberships);
    }

    let outcome_values = raw.column(&config.outcome)?;
    let outcome = calibrate_column(&outcome_values, outcome_thresholds)?;
    for &row in &outcome.ambiguous {
        tracing::warn!(case = %case_ids[row], outcome = %config.outcome, "membership is exactly 0.5");
        warnings.push(Warning::AmbiguousMembership {
            case: case_ids[row].clone(),
            set: config.outcome.clone(),
            raw: outcome_values[row],
        });
    }

    let memberships = (0..case_ids.len())
        .map(|row| columns.iter().map(|column| column[row]).collect())
        .collect();

    let mut table = CalibratedTable::new(
        raw.id_column.clone(),
        case_ids,
        config.conditions.clone(),
        config.outcome.clone(),
        memberships,
        outcome.memberships,
    )?;
    table.warnings = warnings;

    tracing::info!(
        cases = table.len(),
        ambiguous = table.warnings.len(),
        "condition set calibrated"
    );
    Ok(table)
}
