//! Config and schema CLI commands

use super::util::load_inputs;
use fsqca::*;
use std::path::Path;

pub fn cmd_check(config_path: &Path, data_path: Option<&Path>, json_output: bool) -> Result<()> {
    let outcome = match data_path {
        None => AnalysisConfig::from_path(config_path).map(|config| (config, None)),
        Some(data) => load_inputs(config_path, data).and_then(|(config, raw)| {
            let calibrated = build_condition_set(&raw, &config)?;
            Ok((config, Some(calibrated)))
        }),
    };

    if json_output {
        let output = match &outcome {
            Ok((config, calibrated)) => serde_json::json!({
                "valid": true,
                "conditions": config.conditions,
                "outcome": config.outcome_label(),
                "cases": calibrated.as_ref().map(|c| c.len()),
                "warnings": calibrated.as_ref().map(|c| c.warnings.clone()).unwrap_or_default(),
            }),
            Err(e) => serde_json::json!({
                "valid": false,
                "error": e.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if let Ok((config, calibrated)) = &outcome {
        println!(
            "✓ Configuration is valid: {} conditions, outcome {}",
            config.conditions.len(),
            config.outcome_label()
        );
        if let Some(calibrated) = calibrated {
            println!("✓ {} cases calibrated", calibrated.len());
            for warning in &calibrated.warnings {
                println!("⚠ {}", warning);
            }
        }
    }

    match outcome {
        Ok(_) => Ok(()),
        Err(e) if json_output => Err(format!("Configuration check failed: {}", e).into()),
        Err(e) => Err(e),
    }
}

pub fn cmd_schema(name: Option<&str>) -> Result<()> {
    match name.unwrap_or("config") {
        "config" => print_schema::<AnalysisConfig>(),
        "necessity" => print_schema::<NecessityReport>(),
        "truth-table" => print_schema::<TruthTable>(),
        "solution" => print_schema::<SolutionReport>(),
        other => Err(format!(
            "Unknown schema: {}. Use config, necessity, truth-table or solution.",
            other
        )
        .into()),
    }
}

fn print_schema<T: schemars::JsonSchema>() -> Result<()> {
    let schema = schemars::schema_for!(T);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
