//! Configurational solutions
//!
//! Turns the minimal covers returned by a [`Minimizer`] into reported
//! solutions: each term with its consistency, raw and unique coverage and the
//! cases it covers, plus the fit of the whole solution.

use crate::conditions::CalibratedTable;
use crate::config::{AnalysisConfig, RemainderPolicy};
use crate::error::{Error, Result};
use crate::fit;
use crate::minimize::{Implicant, MinimizationProblem, Minimizer};
use crate::truth_table::{RowTag, TruthTable};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One sufficient configuration within a solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SolutionTerm {
    /// e.g. `press*~trust`
    pub expression: String,

    pub implicant: Implicant,

    pub consistency: f64,

    pub raw_coverage: f64,

    /// Coverage lost if this term were dropped from the solution
    pub unique_coverage: f64,

    /// Cases with membership above 0.5 in the term and in the outcome
    pub cases: Vec<String>,

    /// Cases with membership above 0.5 in the term but not in the outcome
    pub deviant_cases: Vec<String>,
}

/// One minimal cover (solution model)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Solution {
    /// e.g. `press*~trust + growth`
    pub expression: String,
    pub terms: Vec<SolutionTerm>,
    pub consistency: f64,
    pub coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SolutionReport {
    pub outcome: String,
    pub conditions: Vec<String>,
    pub remainders: RemainderPolicy,
    pub minimizer: String,
    /// Alternative minimal covers; empty when no row is positive
    pub solutions: Vec<Solution>,
}

/// Minimize the positive rows of a truth table and score the result
#[tracing::instrument(skip_all, fields(minimizer = minimizer.name(), remainders = ?config.remainders))]
pub fn solve(
    truth_table: &TruthTable,
    calibrated: &CalibratedTable,
    config: &AnalysisConfig,
    minimizer: &dyn Minimizer,
) -> Result<SolutionReport> {
    if truth_table.conditions != calibrated.conditions {
        return Err(Error::DataShape(
            "truth table and calibrated table disagree on conditions".to_string(),
        ));
    }

    let problem = MinimizationProblem {
        variables: truth_table.conditions.len(),
        on_set: truth_table.corners(RowTag::Positive),
        dont_care: match config.remainders {
            RemainderPolicy::Include => truth_table.corners(RowTag::Remainder),
            RemainderPolicy::Exclude => Vec::new(),
        },
    };

    let covers = minimizer.minimize(&problem)?;
    for cover in &covers {
        check_cover(cover, truth_table, config.remainders)?;
    }

    let y = calibrated.outcome_column(config.negate_outcome);
    let solutions: Vec<Solution> = covers
        .iter()
        .map(|cover| score(cover, calibrated, &y))
        .collect();

    if solutions.is_empty() {
        tracing::warn!("no positive truth table rows; nothing to minimize");
    } else {
        tracing::info!(
            models = solutions.len(),
            terms = solutions[0].terms.len(),
            "solution found"
        );
    }

    Ok(SolutionReport {
        outcome: truth_table.outcome.clone(),
        conditions: truth_table.conditions.clone(),
        remainders: config.remainders,
        minimizer: minimizer.name().to_string(),
        solutions,
    })
}

/// A cover must reach every positive corner and never a negative one
fn check_cover(cover: &[Implicant], truth_table: &TruthTable, remainders: RemainderPolicy) -> Result<()> {
    for row in &truth_table.rows {
        let covered = cover.iter().any(|term| term.covers(&row.corner));
        let allowed = match row.tag {
            RowTag::Positive => true,
            RowTag::Negative => false,
            RowTag::Remainder => remainders == RemainderPolicy::Include,
        };
        if row.tag == RowTag::Positive && !covered {
            return Err(Error::Minimization(format!(
                "cover misses positive corner {}",
                row.bits()
            )));
        }
        if covered && !allowed {
            return Err(Error::Minimization(format!(
                "cover includes {:?} corner {}",
                row.tag,
                row.bits()
            )));
        }
    }
    Ok(())
}

fn score(cover: &[Implicant], calibrated: &CalibratedTable, y: &[f64]) -> Solution {
    let term_memberships: Vec<Vec<f64>> = cover
        .iter()
        .map(|term| {
            calibrated
                .memberships
                .iter()
                .map(|row| term.membership(row))
                .collect()
        })
        .collect();

    let union_of = |skip: Option<usize>| -> Vec<f64> {
        (0..y.len())
            .map(|case| {
                fit::union(
                    term_memberships
                        .iter()
                        .enumerate()
                        .filter(|(t, _)| Some(*t) != skip)
                        .map(|(_, m)| m[case]),
                )
            })
            .collect()
    };

    let whole = fit::sufficiency(&union_of(None), y);

    let terms = cover
        .iter()
        .zip(&term_memberships)
        .enumerate()
        .map(|(t, (implicant, x))| {
            let term_fit = fit::sufficiency(x, y);
            let without = if cover.len() > 1 {
                fit::sufficiency(&union_of(Some(t)), y).coverage
            } else {
                0.0
            };

            let mut cases = Vec::new();
            let mut deviant_cases = Vec::new();
            for ((id, &m), &yi) in calibrated.case_ids.iter().zip(x).zip(y) {
                if m > 0.5 {
                    if yi > 0.5 {
                        cases.push(id.clone());
                    } else {
                        deviant_cases.push(id.clone());
                    }
                }
            }

            SolutionTerm {
                expression: implicant.expression(&calibrated.conditions),
                implicant: implicant.clone(),
                consistency: term_fit.consistency,
                raw_coverage: term_fit.coverage,
                unique_coverage: (whole.coverage - without).max(0.0),
                cases,
                deviant_cases,
            }
        })
        .collect::<Vec<_>>();

    Solution {
        expression: terms
            .iter()
            .map(|t| t.expression.as_str())
            .collect::<Vec<_>>()
            .join(" + "),
        terms,
        consistency: whole.consistency,
        coverage: whole.coverage,
    }
}

impl SolutionReport {
    pub fn to_report(&self) -> String {
        let mut out = String::new();
        let kind = self.remainders.solution_kind();
        out.push_str(&format!(
            "{}{} solution for {} ({})\n",
            kind[..1].to_uppercase(),
            &kind[1..],
            self.outcome,
            self.minimizer
        ));

        if self.solutions.is_empty() {
            out.push_str("\nNo truth table row passes the inclusion cutoff; there is nothing to minimize.\n");
            return out;
        }

        for (m, solution) in self.solutions.iter().enumerate() {
            out.push_str(&format!("\nM{}: {}\n\n", m + 1, solution.expression));
            let width = solution
                .terms
                .iter()
                .map(|t| t.expression.len())
                .max()
                .unwrap_or(0)
                .max(8);
            out.push_str(&format!(
                "  {:<w$}   incl   cov.r  cov.u  cases\n",
                "",
                w = width
            ));
            for term in &solution.terms {
                let mut cases = term.cases.join(", ");
                if !term.deviant_cases.is_empty() {
                    cases.push_str(&format!("; deviant: {}", term.deviant_cases.join(", ")));
                }
                out.push_str(&format!(
                    "  {:<w$}  {:.3}  {:.3}  {:.3}  {}\n",
                    term.expression,
                    term.consistency,
                    term.raw_coverage,
                    term.unique_coverage,
                    cases,
                    w = width
                ));
            }
            out.push_str(&format!(
                "  {:<w$}  {:.3}  {:.3}\n",
                format!("M{}", m + 1),
                solution.consistency,
                solution.coverage,
                w = width
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibrate::ThresholdTriplet;
    use crate::config::Cutoffs;
    use crate::minimize::{Literal, QuineMcCluskey};
    use crate::truth_table::build_truth_table;
    use std::collections::BTreeMap;

    fn config() -> AnalysisConfig {
        let mut calibration = BTreeMap::new();
        for name in ["a", "b", "y"] {
            calibration.insert(name.to_string(), ThresholdTriplet::new(0.0, 0.5, 1.0).unwrap());
        }
        AnalysisConfig {
            case_id: "id".into(),
            outcome: "y".into(),
            negate_outcome: false,
            conditions: vec!["a".into(), "b".into()],
            calibration,
            cutoffs: Cutoffs {
                inclusion: 0.8,
                necessity: 0.9,
                coverage: 0.5,
                frequency: 1,
            },
            remainders: RemainderPolicy::Exclude,
        }
    }

    fn table() -> CalibratedTable {
        // corners 10 and 11 are consistent with y, 01 and 00 are not
        CalibratedTable::new(
            "id",
            vec!["p".into(), "q".into(), "r".into(), "s".into()],
            vec!["a".into(), "b".into()],
            "y",
            vec![vec![0.9, 0.1], vec![0.8, 0.8], vec![0.2, 0.9], vec![0.1, 0.2]],
            vec![0.9, 0.8, 0.1, 0.2],
        )
        .unwrap()
    }

    struct Everything;

    impl Minimizer for Everything {
        fn name(&self) -> &'static str {
            "everything"
        }

        fn minimize(&self, problem: &MinimizationProblem) -> Result<Vec<Vec<Implicant>>> {
            Ok(vec![vec![Implicant::new(vec![Literal::Dropped; problem.variables])]])
        }
    }

    #[test]
    fn test_single_term_solution() {
        let calibrated = table();
        let cfg = config();
        let tt = build_truth_table(&calibrated, &cfg).unwrap();
        let report = solve(&tt, &calibrated, &cfg, &QuineMcCluskey).unwrap();

        assert_eq!(report.solutions.len(), 1);
        let solution = &report.solutions[0];
        assert_eq!(solution.expression, "a");

        let term = &solution.terms[0];
        assert!((term.consistency - 0.95).abs() < 1e-9);
        assert!((term.raw_coverage - 0.95).abs() < 1e-9);
        assert!((term.unique_coverage - solution.coverage).abs() < 1e-9);
        assert_eq!(term.cases, vec!["p".to_string(), "q".to_string()]);
        assert!(term.deviant_cases.is_empty());
    }

    #[test]
    fn test_no_positive_rows() {
        let calibrated = table();
        let cfg = config();
        let mut tt = build_truth_table(&calibrated, &cfg).unwrap();
        for row in &mut tt.rows {
            row.tag = RowTag::Negative;
        }
        let report = solve(&tt, &calibrated, &cfg, &QuineMcCluskey).unwrap();
        assert!(report.solutions.is_empty());
        assert!(report.to_report().contains("nothing to minimize"));
    }

    #[test]
    fn test_cover_reaching_negative_row_is_rejected() {
        let calibrated = table();
        let cfg = config();
        let tt = build_truth_table(&calibrated, &cfg).unwrap();
        let err = solve(&tt, &calibrated, &cfg, &Everything).unwrap_err();
        assert!(matches!(err, Error::Minimization(_)));
    }

    #[test]
    fn test_report_names_solution_kind() {
        let calibrated = table();
        let mut cfg = config();
        cfg.remainders = RemainderPolicy::Include;
        let tt = build_truth_table(&calibrated, &cfg).unwrap();
        let report = solve(&tt, &calibrated, &cfg, &QuineMcCluskey).unwrap();
        let text = report.to_report();
        assert!(text.starts_with("Parsimonious solution for y (quine-mccluskey)"));
        assert!(text.contains("M1: a"));
    }
}
