//! End-to-end runs from files on disk

use fsqca::{run, AnalysisConfig, Error, QuineMcCluskey, RawTable, RemainderPolicy, ReportFormat};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CASES: &str = "\
country,wealth,literacy,urban,democracy
Norway,95,98,80,10
Sweden,90,99,85,9
Chile,70,30,75,8
Spain,75,35,70,9
Mali,10,20,20,1
Cuba,20,95,60,2
Peru,30,85,55,2
Chad,5,10,15,0
";

const CONFIG: &str = "\
case_id: country
outcome: democracy
conditions: [wealth, literacy, urban]
calibration:
  democracy: { exclusion: 0, crossover: 5, inclusion: 10 }
  wealth: { exclusion: 0, crossover: 50, inclusion: 100 }
  literacy: { exclusion: 0, crossover: 50, inclusion: 100 }
  urban: { exclusion: 0, crossover: 50, inclusion: 100 }
cutoffs:
  inclusion: 0.8
  necessity: 0.9
  coverage: 0.5
";

fn setup(cases: &str, config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cases.csv"), cases).unwrap();
    fs::write(dir.path().join("analysis.yaml"), config).unwrap();
    dir
}

fn load(dir: &Path) -> fsqca::Result<(AnalysisConfig, RawTable)> {
    let config = AnalysisConfig::from_path(dir.join("analysis.yaml"))?;
    let raw = RawTable::from_path(dir.join("cases.csv"), &config.case_id)?;
    Ok((config, raw))
}

#[test]
fn test_conservative_run_from_files() {
    let dir = setup(CASES, CONFIG);
    let (config, raw) = load(dir.path()).unwrap();
    let analysis = run(&raw, &config, &QuineMcCluskey).unwrap();

    assert_eq!(analysis.calibrated.len(), 8);
    assert_eq!(analysis.truth_table.rows.len(), 8);
    assert_eq!(
        analysis
            .truth_table
            .observed_rows()
            .map(|r| r.bits())
            .collect::<Vec<_>>(),
        vec!["000", "011", "101", "111"]
    );

    let solution = &analysis.solution.solutions[0];
    assert_eq!(solution.expression, "wealth*urban");
    assert_eq!(
        solution.terms[0].cases,
        vec!["Norway", "Sweden", "Chile", "Spain"]
    );
    assert!(solution.consistency > 0.9);
}

#[test]
fn test_parsimonious_run_uses_remainders() {
    let dir = setup(CASES, CONFIG);
    let (mut config, raw) = load(dir.path()).unwrap();
    config.remainders = RemainderPolicy::Include;
    let analysis = run(&raw, &config, &QuineMcCluskey).unwrap();

    assert_eq!(analysis.solution.solutions[0].expression, "wealth");
    assert!(analysis
        .solution
        .to_report()
        .starts_with("Parsimonious solution for democracy"));
}

#[test]
fn test_artifacts_written_together() {
    let dir = setup(CASES, CONFIG);
    let (config, raw) = load(dir.path()).unwrap();
    let analysis = run(&raw, &config, &QuineMcCluskey).unwrap();

    let out = dir.path().join("out");
    let written = analysis
        .write_artifacts(&out, ReportFormat::Text, false)
        .unwrap();
    assert_eq!(written.len(), 4);
    assert!(written.iter().all(|p| p.exists()));

    let csv = fs::read_to_string(out.join("calibrated.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("country,wealth,literacy,urban,democracy"));
    assert!(lines.next().unwrap().starts_with("Norway,"));

    let table = fs::read_to_string(out.join("truth_table.txt")).unwrap();
    assert!(table.starts_with("Truth table for democracy (3 conditions, 8 cases)"));
}

#[test]
fn test_json_artifacts_parse() {
    let dir = setup(CASES, CONFIG);
    let (config, raw) = load(dir.path()).unwrap();
    let analysis = run(&raw, &config, &QuineMcCluskey).unwrap();

    let out = dir.path().join("json");
    analysis
        .write_artifacts(&out, ReportFormat::Json, false)
        .unwrap();
    let solution: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("solution.json")).unwrap()).unwrap();
    assert_eq!(solution["remainders"], "exclude");
    assert_eq!(solution["solutions"][0]["expression"], "wealth*urban");
}

#[test]
fn test_missing_calibration_produces_nothing() {
    let config = CONFIG.replace("  urban: { exclusion: 0, crossover: 50, inclusion: 100 }\n", "");
    let dir = setup(CASES, &config);
    let (config, raw) = load(dir.path()).unwrap();

    let err = run(&raw, &config, &QuineMcCluskey).unwrap_err();
    assert!(matches!(err, Error::MissingCalibration(ref name) if name == "urban"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_missing_value_is_data_shape_error() {
    let cases = CASES.replace("Peru,30,85,55,2", "Peru,30,NA,55,2");
    let dir = setup(&cases, CONFIG);
    let (config, raw) = load(dir.path()).unwrap();

    let err = run(&raw, &config, &QuineMcCluskey).unwrap_err();
    assert!(matches!(err, Error::DataShape(_)));
}

#[test]
fn test_crossover_value_aborts_truth_table() {
    let cases = CASES.replace("Peru,30,85,55,2", "Peru,30,85,50,2");
    let dir = setup(&cases, CONFIG);
    let (config, raw) = load(dir.path()).unwrap();

    let err = run(&raw, &config, &QuineMcCluskey).unwrap_err();
    match err {
        Error::AmbiguousMembership { condition, cases } => {
            assert_eq!(condition, "urban");
            assert_eq!(cases, vec!["Peru"]);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unordered_triplet_rejected_on_load() {
    let config = CONFIG.replace(
        "democracy: { exclusion: 0, crossover: 5, inclusion: 10 }",
        "democracy: { exclusion: 10, crossover: 5, inclusion: 0 }",
    );
    let dir = setup(CASES, &config);
    assert!(matches!(load(dir.path()), Err(Error::Configuration(_))));
}

#[test]
fn test_artifacts_not_written_over_a_file() {
    let dir = setup(CASES, CONFIG);
    let (config, raw) = load(dir.path()).unwrap();
    let analysis = run(&raw, &config, &QuineMcCluskey).unwrap();

    let target = dir.path().join("cases.csv");
    let err = analysis
        .write_artifacts(&target, ReportFormat::Text, false)
        .unwrap_err();
    assert!(matches!(err, Error::Other(_)));
    assert_eq!(fs::read_to_string(&target).unwrap(), CASES);
}

#[test]
fn test_failed_write_leaves_no_partial_artifacts() {
    let dir = setup(CASES, CONFIG);
    let (config, raw) = load(dir.path()).unwrap();
    let analysis = run(&raw, &config, &QuineMcCluskey).unwrap();

    // A directory squatting on the last staging path makes that write fail
    let out = dir.path().join("out");
    fs::create_dir_all(out.join(".solution.txt.tmp")).unwrap();

    let err = analysis
        .write_artifacts(&out, ReportFormat::Text, false)
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));

    let mut left: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    left.sort();
    assert_eq!(left, vec![".solution.txt.tmp"]);
}
