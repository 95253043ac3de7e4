//! Truth table construction
//!
//! Enumerates all 2^k corners of the condition space, assigns every case to
//! the single corner it is closest to, and scores each corner against the
//! outcome. Corners are tagged for minimization:
//!
//! | Tag         | Meaning                                                   |
//! |-------------|-----------------------------------------------------------|
//! | `Positive`  | observed, consistency at or above the inclusion cutoff     |
//! | `Negative`  | observed, consistency below the inclusion cutoff           |
//! | `Remainder` | no (or too few) observed cases; left to the minimizer      |
//!
//! Negative rows and remainders are kept apart because minimization treats
//! them differently: remainders may be used as don't-cares, negative rows never.

use crate::conditions::CalibratedTable;
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::fit;
use crate::warning::Warning;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Largest number of conditions whose corners are enumerated
pub const MAX_CONDITIONS: usize = 16;

/// Classification of a truth table row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RowTag {
    Positive,
    Negative,
    Remainder,
}

impl RowTag {
    /// Conventional OUT column symbol
    pub fn symbol(self) -> char {
        match self {
            RowTag::Positive => '1',
            RowTag::Negative => '0',
            RowTag::Remainder => '?',
        }
    }
}

/// One corner of the condition space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TruthTableRow {
    /// Corner number; the first condition is the most significant bit
    pub index: usize,

    /// Presence of each condition at this corner
    pub corner: Vec<bool>,

    /// Labels of cases whose strongest membership is in this corner
    pub cases: Vec<String>,

    /// Number of supporting cases
    pub n: usize,

    pub consistency: f64,

    pub pri: f64,

    pub coverage: f64,

    pub tag: RowTag,
}

impl TruthTableRow {
    /// Corner as a bit string, e.g. `101`
    pub fn bits(&self) -> String {
        self.corner.iter().map(|&b| if b { '1' } else { '0' }).collect()
    }

    /// Corner as a conjunction, e.g. `A*~B*C`
    pub fn configuration(&self, conditions: &[String]) -> String {
        conditions
            .iter()
            .zip(&self.corner)
            .map(|(name, &present)| {
                if present {
                    name.clone()
                } else {
                    format!("~{}", name)
                }
            })
            .collect::<Vec<_>>()
            .join("*")
    }
}

/// The full truth table for one outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TruthTable {
    pub conditions: Vec<String>,

    /// Outcome label (`~Y` when the negated outcome is analysed)
    pub outcome: String,

    pub inclusion_cutoff: f64,

    pub frequency_cutoff: usize,

    pub total_cases: usize,

    /// All 2^k corners in index order
    pub rows: Vec<TruthTableRow>,

    pub warnings: Vec<Warning>,
}

impl TruthTable {
    pub fn rows_tagged(&self, tag: RowTag) -> impl Iterator<Item = &TruthTableRow> {
        self.rows.iter().filter(move |row| row.tag == tag)
    }

    pub fn count(&self, tag: RowTag) -> usize {
        self.rows_tagged(tag).count()
    }

    /// Rows with at least one supporting case
    pub fn observed_rows(&self) -> impl Iterator<Item = &TruthTableRow> {
        self.rows.iter().filter(|row| row.n > 0)
    }

    /// Corner vectors of every row with the given tag
    pub fn corners(&self, tag: RowTag) -> Vec<Vec<bool>> {
        self.rows_tagged(tag).map(|row| row.corner.clone()).collect()
    }

    /// Human-readable table; remainders are summarised unless `show_remainders`
    pub fn to_report(&self, show_remainders: bool) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "Truth table for {} ({} conditions, {} cases)\n",
            self.outcome,
            self.conditions.len(),
            self.total_cases
        ));
        out.push_str(&format!(
            "Inclusion cutoff: {:.3}  Frequency cutoff: {}\n\n",
            self.inclusion_cutoff, self.frequency_cutoff
        ));

        let widths: Vec<usize> = self.conditions.iter().map(|c| c.len().max(1)).collect();
        let mut header = format!("{:>5}  ", "row");
        for (name, w) in self.conditions.iter().zip(&widths) {
            header.push_str(&format!("{:>w$} ", name, w = *w));
        }
        header.push_str("| OUT |    n |  incl |   PRI |   cov | cases\n");
        out.push_str(&header);

        for row in &self.rows {
            if row.tag == RowTag::Remainder && row.n == 0 && !show_remainders {
                continue;
            }
            let mut line = format!("{:>5}  ", row.index + 1);
            for (&present, w) in row.corner.iter().zip(&widths) {
                line.push_str(&format!("{:>w$} ", if present { 1 } else { 0 }, w = *w));
            }
            line.push_str(&format!(
                "|  {}  | {:>4} | {:.3} | {:.3} | {:.3} | {}\n",
                row.tag.symbol(),
                row.n,
                row.consistency,
                row.pri,
                row.coverage,
                row.cases.join(", ")
            ));
            out.push_str(&line);
        }

        let empty = self.rows.iter().filter(|r| r.n == 0).count();
        out.push_str(&format!(
            "\n{} positive, {} negative, {} remainder ({} without cases)\n",
            self.count(RowTag::Positive),
            self.count(RowTag::Negative),
            self.count(RowTag::Remainder),
            empty
        ));

        if !self.warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for warning in &self.warnings {
                out.push_str(&format!("  ⚠ {}\n", warning));
            }
        }

        out
    }
}

/// Build the truth table for the configured outcome
#[tracing::instrument(skip_all, fields(conditions = calibrated.conditions.len(), cases = calibrated.len()))]
pub fn build_truth_table(calibrated: &CalibratedTable, config: &AnalysisConfig) -> Result<TruthTable> {
    let k = calibrated.conditions.len();
    if k > MAX_CONDITIONS {
        return Err(Error::ConditionExplosion {
            count: k,
            limit: MAX_CONDITIONS,
        });
    }
    if k == 0 {
        return Err(Error::Configuration(
            "a truth table needs at least one condition".into(),
        ));
    }
    if calibrated.conditions != config.conditions {
        return Err(Error::DataShape(format!(
            "calibrated conditions [{}] differ from configured conditions [{}]",
            calibrated.conditions.join(", "),
            config.conditions.join(", ")
        )));
    }

    for (index, condition) in calibrated.conditions.iter().enumerate() {
        let cases = calibrated.ambiguous_cases(index);
        if !cases.is_empty() {
            return Err(Error::AmbiguousMembership {
                condition: condition.clone(),
                cases,
            });
        }
    }

    let cutoffs = &config.cutoffs;
    let y = calibrated.outcome_column(config.negate_outcome);

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); 1 << k];
    for (case, row) in calibrated.memberships.iter().enumerate() {
        members[corner_index(row)].push(case);
    }

    let assigned: usize = members.iter().map(Vec::len).sum();
    if assigned != calibrated.len() {
        return Err(Error::DataShape(format!(
            "{} cases assigned to corners, table has {}",
            assigned,
            calibrated.len()
        )));
    }

    let mut rows = Vec::with_capacity(1 << k);
    let mut warnings = Vec::new();
    let mut x = vec![0.0; calibrated.len()];

    for (index, supporting) in members.into_iter().enumerate() {
        let corner = corner_bits(index, k);
        for (xi, memberships) in x.iter_mut().zip(&calibrated.memberships) {
            *xi = corner_membership(memberships, &corner);
        }
        let fit = fit::sufficiency(&x, &y);
        let n = supporting.len();

        let tag = if n < cutoffs.frequency {
            RowTag::Remainder
        } else if fit.consistency >= cutoffs.inclusion {
            RowTag::Positive
        } else {
            RowTag::Negative
        };

        let row = TruthTableRow {
            index,
            corner,
            cases: supporting
                .iter()
                .map(|&case| calibrated.case_ids[case].clone())
                .collect(),
            n,
            consistency: fit.consistency,
            pri: fit.pri,
            coverage: fit.coverage,
            tag,
        };

        if n > 0 && n < cutoffs.frequency {
            warnings.push(Warning::BelowFrequencyCutoff {
                corner: row.bits(),
                cases: n,
                cutoff: cutoffs.frequency,
            });
        }
        if tag == RowTag::Positive && n == 1 {
            warnings.push(Warning::SparseCorner {
                corner: row.bits(),
                cases: n,
            });
        }

        rows.push(row);
    }

    let table = TruthTable {
        conditions: calibrated.conditions.clone(),
        outcome: config.outcome_label(),
        inclusion_cutoff: cutoffs.inclusion,
        frequency_cutoff: cutoffs.frequency,
        total_cases: calibrated.len(),
        rows,
        warnings,
    };

    tracing::info!(
        corners = table.rows.len(),
        positive = table.count(RowTag::Positive),
        negative = table.count(RowTag::Negative),
        remainder = table.count(RowTag::Remainder),
        "truth table built"
    );
    Ok(table)
}

/// Corner a case belongs to: each membership above 0.5 sets its bit
fn corner_index(memberships: &[f64]) -> usize {
    memberships
        .iter()
        .fold(0, |index, &m| (index << 1) | usize::from(m > 0.5))
}

fn corner_bits(index: usize, k: usize) -> Vec<bool> {
    (0..k).map(|j| (index >> (k - 1 - j)) & 1 == 1).collect()
}

/// Fuzzy membership of a case in a corner configuration
fn corner_membership(memberships: &[f64], corner: &[bool]) -> f64 {
    fit::intersection(
        memberships
            .iter()
            .zip(corner)
            .map(|(&m, &present)| if present { m } else { 1.0 - m }),
    )
}
