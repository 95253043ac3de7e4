//! Analysis CLI commands: calibrate, necessity, truth-table, solve

use super::util::{load_inputs, write_output};
use fsqca::*;
use std::path::{Path, PathBuf};

pub fn cmd_calibrate(config_path: &Path, data_path: &Path, output: Option<&Path>) -> Result<()> {
    let (config, raw) = load_inputs(config_path, data_path)?;

    let calibrated = build_condition_set(&raw, &config)?;
    for warning in &calibrated.warnings {
        eprintln!("⚠ {}", warning);
    }

    write_output(output, calibrated.to_csv_string()?.trim_end())
}

pub fn cmd_necessity(
    config_path: &Path,
    data_path: &Path,
    json_output: bool,
    output: Option<&Path>,
) -> Result<()> {
    let (config, raw) = load_inputs(config_path, data_path)?;

    let calibrated = build_condition_set(&raw, &config)?;
    let report = analyze_necessity(&calibrated, &config)?;

    if json_output {
        write_output(output, &serde_json::to_string_pretty(&report)?)
    } else {
        write_output(output, &report.to_report())
    }
}

pub fn cmd_truth_table(
    config_path: &Path,
    data_path: &Path,
    json_output: bool,
    show_remainders: bool,
    output: Option<&Path>,
) -> Result<()> {
    let (config, raw) = load_inputs(config_path, data_path)?;

    let calibrated = build_condition_set(&raw, &config)?;
    let table = build_truth_table(&calibrated, &config)?;

    if json_output {
        write_output(output, &serde_json::to_string_pretty(&table)?)
    } else {
        write_output(output, &table.to_report(show_remainders))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    pub json: bool,
    pub all: bool,
    pub parsimonious: bool,
    pub output_dir: Option<PathBuf>,
}

pub fn cmd_solve(config_path: &Path, data_path: &Path, options: SolveOptions) -> Result<()> {
    let (mut config, raw) = load_inputs(config_path, data_path)?;
    if options.parsimonious {
        config.remainders = RemainderPolicy::Include;
    }

    let analysis = run(&raw, &config, &QuineMcCluskey)?;

    match &options.output_dir {
        Some(dir) => {
            let format = if options.json {
                ReportFormat::Json
            } else {
                ReportFormat::Text
            };
            for path in analysis.write_artifacts(dir, format, options.all)? {
                eprintln!("Written to: {}", path.display());
            }
            for warning in analysis.warnings() {
                eprintln!("⚠ {}", warning);
            }
        }
        None if options.json => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        None => {
            for warning in analysis.warnings() {
                println!("⚠ {}", warning);
            }
            println!("{}", analysis.solution.to_report());
        }
    }
    Ok(())
}
