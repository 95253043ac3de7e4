//! Necessity and single-condition sufficiency analysis
//!
//! Every condition is scored in both polarities (`A` and `~A`) for
//! necessity and sufficiency. A scan over two-literal disjunctions
//! (`A + ~B`) then reports the smallest disjunctions that pass both the
//! necessity and coverage cutoffs without containing an already-necessary
//! literal.

use crate::conditions::CalibratedTable;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::fit::{self, NecessityFit, SufficiencyFit};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Fit of a single literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LiteralFit {
    /// `A` or `~A`
    pub expression: String,
    pub necessity: NecessityFit,
    pub sufficiency: SufficiencyFit,
    /// Passes the necessity and coverage cutoffs
    pub necessary: bool,
}

/// Fit of a disjunction of two literals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DisjunctionFit {
    /// e.g. `A + ~B`
    pub expression: String,
    pub necessity: NecessityFit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NecessityReport {
    pub outcome: String,
    pub necessity_cutoff: f64,
    pub coverage_cutoff: f64,
    /// Every condition in both polarities, in condition order
    pub literals: Vec<LiteralFit>,
    /// Passing disjunctions, best first
    pub disjunctions: Vec<DisjunctionFit>,
}

struct Literal {
    expression: String,
    memberships: Vec<f64>,
}

/// Score all literals and scan two-literal disjunctions
#[tracing::instrument(skip_all, fields(conditions = calibrated.conditions.len()))]
pub fn analyze_necessity(calibrated: &CalibratedTable, config: &AnalysisConfig) -> Result<NecessityReport> {
    let y = calibrated.outcome_column(config.negate_outcome);
    let cutoffs = &config.cutoffs;
    let passes = |f: &NecessityFit| f.consistency >= cutoffs.necessity && f.coverage >= cutoffs.coverage;

    // condition j present at 2j, absent at 2j + 1
    let mut literals = Vec::with_capacity(calibrated.conditions.len() * 2);
    for (j, name) in calibrated.conditions.iter().enumerate() {
        let present = calibrated.condition_column(j);
        let absent = present.iter().map(|m| 1.0 - m).collect();
        literals.push(Literal {
            expression: name.clone(),
            memberships: present,
        });
        literals.push(Literal {
            expression: format!("~{}", name),
            memberships: absent,
        });
    }

    let literal_fits: Vec<LiteralFit> = literals
        .iter()
        .map(|literal| {
            let necessity = fit::necessity(&literal.memberships, &y);
            LiteralFit {
                expression: literal.expression.clone(),
                necessary: passes(&necessity),
                necessity,
                sufficiency: fit::sufficiency(&literal.memberships, &y),
            }
        })
        .collect();

    let mut disjunctions = Vec::new();
    let mut union = vec![0.0; y.len()];
    for a in 0..literals.len() {
        // skip the same condition's other polarity: A + ~A is trivially necessary
        for b in (a / 2 + 1) * 2..literals.len() {
            if literal_fits[a].necessary || literal_fits[b].necessary {
                continue;
            }
            for (u, (&ma, &mb)) in union
                .iter_mut()
                .zip(literals[a].memberships.iter().zip(&literals[b].memberships))
            {
                *u = fit::union([ma, mb]);
            }
            let necessity = fit::necessity(&union, &y);
            if passes(&necessity) {
                disjunctions.push(DisjunctionFit {
                    expression: format!("{} + {}", literals[a].expression, literals[b].expression),
                    necessity,
                });
            }
        }
    }
    disjunctions.sort_by(|l, r| {
        r.necessity
            .consistency
            .partial_cmp(&l.necessity.consistency)
            .unwrap_or(Ordering::Equal)
            .then(
                r.necessity
                    .coverage
                    .partial_cmp(&l.necessity.coverage)
                    .unwrap_or(Ordering::Equal),
            )
            .then_with(|| l.expression.cmp(&r.expression))
    });

    tracing::info!(
        necessary = literal_fits.iter().filter(|l| l.necessary).count(),
        disjunctions = disjunctions.len(),
        "necessity analysis complete"
    );

    Ok(NecessityReport {
        outcome: config.outcome_label(),
        necessity_cutoff: cutoffs.necessity,
        coverage_cutoff: cutoffs.coverage,
        literals: literal_fits,
        disjunctions,
    })
}

impl NecessityReport {
    /// Literals passing both cutoffs
    pub fn necessary(&self) -> impl Iterator<Item = &LiteralFit> {
        self.literals.iter().filter(|l| l.necessary)
    }

    pub fn to_report(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Analysis of necessary conditions for {}\n", self.outcome));
        out.push_str(&format!(
            "Necessity cutoff: {:.3}  Coverage cutoff: {:.3}\n\n",
            self.necessity_cutoff, self.coverage_cutoff
        ));

        let width = self
            .literals
            .iter()
            .map(|l| l.expression.len())
            .max()
            .unwrap_or(0)
            .max(9);
        out.push_str(&format!(
            "  {:<w$}  inclN   covN    RoN | inclS   PRI   covS\n",
            "condition",
            w = width
        ));
        for literal in &self.literals {
            out.push_str(&format!(
                "{} {:<w$}  {:.3}  {:.3}  {:.3} | {:.3}  {:.3}  {:.3}\n",
                if literal.necessary { "✓" } else { " " },
                literal.expression,
                literal.necessity.consistency,
                literal.necessity.coverage,
                literal.necessity.relevance,
                literal.sufficiency.consistency,
                literal.sufficiency.pri,
                literal.sufficiency.coverage,
                w = width
            ));
        }

        if self.disjunctions.is_empty() {
            out.push_str("\nNo necessary disjunctions of two conditions.\n");
        } else {
            out.push_str("\nNecessary disjunctions:\n");
            for d in &self.disjunctions {
                out.push_str(&format!(
                    "  {}  inclN {:.3}  covN {:.3}  RoN {:.3}\n",
                    d.expression, d.necessity.consistency, d.necessity.coverage, d.necessity.relevance
                ));
            }
        }
        out
    }
}
