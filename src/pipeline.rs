//! One-shot analysis run
//!
//! Every stage runs against the same [`AnalysisConfig`]. Either all stages
//! succeed and every artifact is available, or the first error is returned
//! and nothing is produced.

use crate::conditions::{build_condition_set, CalibratedTable};
use crate::config::AnalysisConfig;
use crate::dataset::RawTable;
use crate::error::{Error, Result};
use crate::minimize::Minimizer;
use crate::necessity::{analyze_necessity, NecessityReport};
use crate::solution::{solve, SolutionReport};
use crate::truth_table::{build_truth_table, TruthTable};
use crate::warning::Warning;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Output format for written artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    fn extension(self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

/// Everything produced by a successful run
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub calibrated: CalibratedTable,
    pub necessity: NecessityReport,
    pub truth_table: TruthTable,
    pub solution: SolutionReport,
}

/// Validate, calibrate, analyse necessity, build the truth table and solve
#[tracing::instrument(skip_all, fields(cases = raw.len(), minimizer = minimizer.name()))]
pub fn run(raw: &RawTable, config: &AnalysisConfig, minimizer: &dyn Minimizer) -> Result<Analysis> {
    config.validate()?;

    let calibrated = build_condition_set(raw, config)?;
    let necessity = analyze_necessity(&calibrated, config)?;
    let truth_table = build_truth_table(&calibrated, config)?;
    let solution = solve(&truth_table, &calibrated, config, minimizer)?;

    tracing::info!(
        solutions = solution.solutions.len(),
        warnings = calibrated.warnings.len() + truth_table.warnings.len(),
        "analysis complete"
    );

    Ok(Analysis {
        calibrated,
        necessity,
        truth_table,
        solution,
    })
}

impl Analysis {
    /// Warnings from every stage, in pipeline order
    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.calibrated.warnings.iter().chain(&self.truth_table.warnings)
    }

    /// Render every artifact as `(file name, contents)`
    pub fn artifacts(&self, format: ReportFormat, show_remainders: bool) -> Result<Vec<(String, String)>> {
        let ext = format.extension();
        let (necessity, truth_table, solution) = match format {
            ReportFormat::Text => (
                self.necessity.to_report(),
                self.truth_table.to_report(show_remainders),
                self.solution.to_report(),
            ),
            ReportFormat::Json => (
                serde_json::to_string_pretty(&self.necessity)?,
                serde_json::to_string_pretty(&self.truth_table)?,
                serde_json::to_string_pretty(&self.solution)?,
            ),
        };
        Ok(vec![
            ("calibrated.csv".to_string(), self.calibrated.to_csv_string()?),
            (format!("necessity.{}", ext), necessity),
            (format!("truth_table.{}", ext), truth_table),
            (format!("solution.{}", ext), solution),
        ])
    }

    /// Write all artifacts into `dir`, creating it if needed
    ///
    /// Everything is rendered before the first file is touched. Each artifact
    /// goes to a hidden temporary file first and is renamed into place only
    /// once every write has succeeded; on failure nothing new is left behind.
    pub fn write_artifacts(
        &self,
        dir: impl AsRef<Path>,
        format: ReportFormat,
        show_remainders: bool,
    ) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let artifacts = self.artifacts(format, show_remainders)?;

        if dir.exists() && !dir.is_dir() {
            return Err(Error::Other(format!("{} is not a directory", dir.display())));
        }
        fs::create_dir_all(dir)?;

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(artifacts.len());
        for (name, contents) in artifacts {
            let temp = dir.join(format!(".{}.tmp", name));
            if let Err(e) = fs::write(&temp, contents) {
                discard(staged.iter().map(|(t, _)| t).chain([&temp]));
                return Err(e.into());
            }
            staged.push((temp, dir.join(name)));
        }

        let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
        for (i, (temp, path)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(temp, path) {
                discard(written.iter().chain(staged[i..].iter().map(|(t, _)| t)));
                return Err(e.into());
            }
            tracing::debug!(path = %path.display(), "wrote artifact");
            written.push(path.clone());
        }
        Ok(written)
    }
}

/// Best-effort removal of files from an aborted artifact write
fn discard<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "could not remove partial artifact");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimize::QuineMcCluskey;

    const CONFIG: &str = r#"
case_id: country
outcome: democracy
conditions: [wealth, literacy]
calibration:
  democracy: { exclusion: 0.0, crossover: 5.0, inclusion: 10.0 }
  wealth: { exclusion: 0.0, crossover: 50.0, inclusion: 100.0 }
  literacy: { exclusion: 0.0, crossover: 50.0, inclusion: 100.0 }
cutoffs:
  inclusion: 0.8
  necessity: 0.9
  coverage: 0.5
"#;

    fn raw() -> RawTable {
        RawTable::from_rows(
            "country",
            &["wealth", "literacy", "democracy"],
            vec![
                ("Norway", vec![95.0, 98.0, 10.0]),
                ("Chile", vec![70.0, 30.0, 8.0]),
                ("Mali", vec![10.0, 20.0, 1.0]),
                ("Cuba", vec![20.0, 95.0, 2.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_run_produces_all_stages() {
        let config = AnalysisConfig::from_yaml(CONFIG).unwrap();
        let analysis = run(&raw(), &config, &QuineMcCluskey).unwrap();
        assert_eq!(analysis.calibrated.len(), 4);
        assert_eq!(analysis.truth_table.rows.len(), 4);
        assert_eq!(analysis.solution.solutions.len(), 1);
        assert_eq!(analysis.solution.solutions[0].expression, "wealth");
    }

    #[test]
    fn test_invalid_config_fails_before_calibration() {
        let mut config = AnalysisConfig::from_yaml(CONFIG).unwrap();
        config.calibration.remove("literacy");
        let err = run(&raw(), &config, &QuineMcCluskey).unwrap_err();
        assert!(matches!(err, Error::MissingCalibration(name) if name == "literacy"));
    }

    #[test]
    fn test_artifact_names() {
        let config = AnalysisConfig::from_yaml(CONFIG).unwrap();
        let analysis = run(&raw(), &config, &QuineMcCluskey).unwrap();
        let names: Vec<String> = analysis
            .artifacts(ReportFormat::Json, false)
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec!["calibrated.csv", "necessity.json", "truth_table.json", "solution.json"]
        );
    }
}
