//! CLI utility helpers

use fsqca::{AnalysisConfig, Error, RawTable, Result};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Log to stderr; `RUST_LOG` wins over the verbosity flag
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the config, then the data file keyed by its case label column
pub fn load_inputs(config_path: &Path, data_path: &Path) -> Result<(AnalysisConfig, RawTable)> {
    let config = AnalysisConfig::from_path(config_path).inspect_err(|e| {
        tracing::error!(path = %config_path.display(), error = %e, "could not load config");
    })?;
    let raw = RawTable::from_path(data_path, &config.case_id)?;
    tracing::info!(path = %data_path.display(), cases = raw.len(), "loaded data");
    Ok((config, raw))
}

/// Write content to file or stdout
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content).map_err(Error::Io)?;
            eprintln!("Written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_inputs_keeps_config_error_kind() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("cases.csv");
        fs::write(&data, "case,x,y\na,1,2\n").unwrap();

        let missing = load_inputs(&dir.path().join("absent.yaml"), &data).unwrap_err();
        assert!(matches!(missing, Error::Io(_)), "got {:?}", missing);

        let malformed = dir.path().join("malformed.yaml");
        fs::write(&malformed, "conditions: [x\n").unwrap();
        let err = load_inputs(&malformed, &data).unwrap_err();
        assert!(matches!(err, Error::Yaml(_)), "got {:?}", err);
    }
}
