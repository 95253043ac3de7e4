//! Raw case table loading
//!
//! One row per case (country), one column holding the case label and any
//! number of numeric indicator columns. Column names and case labels are
//! kept verbatim so they can be carried into every derived artifact.

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// One observed unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Case {
    /// Case label, unique within the table
    pub id: String,

    /// Raw scores aligned with [`RawTable::columns`]; `None` for blank or non-numeric cells
    pub values: Vec<Option<f64>>,
}

/// The raw input table, held fully in memory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTable {
    /// Name of the case label column
    pub id_column: String,

    /// Indicator column names in file order (label column excluded)
    pub columns: Vec<String>,

    pub cases: Vec<Case>,
}

impl RawTable {
    /// Build a table from already-parsed cases, checking its shape
    pub fn new(id_column: impl Into<String>, columns: Vec<String>, cases: Vec<Case>) -> Result<Self> {
        let table = Self {
            id_column: id_column.into(),
            columns,
            cases,
        };
        table.check_shape()?;
        Ok(table)
    }

    /// Convenience constructor for fully numeric tables
    pub fn from_rows(id_column: &str, columns: &[&str], rows: Vec<(&str, Vec<f64>)>) -> Result<Self> {
        let cases = rows
            .into_iter()
            .map(|(id, values)| Case {
                id: id.to_string(),
                values: values.into_iter().map(Some).collect(),
            })
            .collect();
        Self::new(
            id_column,
            columns.iter().map(|c| c.to_string()).collect(),
            cases,
        )
    }

    /// Read a CSV file whose header names `id_column`
    pub fn from_path(path: impl AsRef<Path>, id_column: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to open {}: {}", path.display(), e),
            ))
        })?;
        Self::from_reader(file, id_column)
    }

    /// Read CSV from any reader
    pub fn from_reader<R: Read>(reader: R, id_column: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let id_index = headers
            .iter()
            .position(|h| h == id_column)
            .ok_or_else(|| {
                Error::DataShape(format!("case label column '{}' not found in header", id_column))
            })?;

        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id_index)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut cases = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let id = record.get(id_index).unwrap_or_default().to_string();
            if id.is_empty() {
                return Err(Error::DataShape(format!(
                    "row {} has no case label in column '{}'",
                    row + 1,
                    id_column
                )));
            }
            let values = record
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != id_index)
                .map(|(_, cell)| parse_cell(cell))
                .collect();
            cases.push(Case { id, values });
        }

        Self::new(id_column, columns, cases)
    }

    /// Number of cases
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Case labels in row order
    pub fn case_ids(&self) -> Vec<String> {
        self.cases.iter().map(|c| c.id.clone()).collect()
    }

    /// Position of a column, if present
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of a numeric column in row order
    ///
    /// Fails if the column is absent or any case lacks a numeric value in it.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let index = self
            .column_index(name)
            .ok_or_else(|| Error::DataShape(format!("column '{}' not found in input table", name)))?;

        self.cases
            .iter()
            .map(|case| {
                case.values[index].ok_or_else(|| {
                    Error::DataShape(format!(
                        "case '{}' has no numeric value in column '{}'",
                        case.id, name
                    ))
                })
            })
            .collect()
    }

    fn check_shape(&self) -> Result<()> {
        let mut seen_columns = HashSet::new();
        for column in &self.columns {
            if column == &self.id_column || !seen_columns.insert(column.as_str()) {
                return Err(Error::DataShape(format!("duplicate column '{}'", column)));
            }
        }

        let mut seen_ids = HashSet::new();
        for case in &self.cases {
            if case.id.is_empty() {
                return Err(Error::DataShape("case with an empty label".to_string()));
            }
            if !seen_ids.insert(case.id.as_str()) {
                return Err(Error::DataShape(format!("duplicate case label '{}'", case.id)));
            }
            if case.values.len() != self.columns.len() {
                return Err(Error::DataShape(format!(
                    "case '{}' has {} values, expected {}",
                    case.id,
                    case.values.len(),
                    self.columns.len()
                )));
            }
        }
        Ok(())
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("na") {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
country,democracy,press,gdp
Norway,0.95,0.91,89000
Chile, 0.80 ,0.70,15000
Kenya,0.45,,1800
";

    #[test]
    fn test_reads_header_and_cases() {
        let table = RawTable::from_reader(CSV.as_bytes(), "country").unwrap();
        assert_eq!(table.columns, vec!["democracy", "press", "gdp"]);
        assert_eq!(table.case_ids(), vec!["Norway", "Chile", "Kenya"]);
        assert_eq!(table.column("democracy").unwrap(), vec![0.95, 0.80, 0.45]);
    }

    #[test]
    fn test_blank_cell_fails_only_when_column_is_used() {
        let table = RawTable::from_reader(CSV.as_bytes(), "country").unwrap();
        assert!(table.column("gdp").is_ok());
        let err = table.column("press").unwrap_err();
        assert!(err.to_string().contains("Kenya"));
    }

    #[test]
    fn test_missing_label_column() {
        let err = RawTable::from_reader(CSV.as_bytes(), "iso3").unwrap_err();
        assert!(matches!(err, Error::DataShape(_)));
    }

    #[test]
    fn test_missing_case_label() {
        let csv = "country,x\n,0.5\n";
        let err = RawTable::from_reader(csv.as_bytes(), "country").unwrap_err();
        assert!(matches!(err, Error::DataShape(_)));
    }

    #[test]
    fn test_duplicate_case_label() {
        let csv = "country,x\nPeru,0.1\nPeru,0.2\n";
        let err = RawTable::from_reader(csv.as_bytes(), "country").unwrap_err();
        assert!(err.to_string().contains("Peru"));
    }

    #[test]
    fn test_unknown_column() {
        let table = RawTable::from_reader(CSV.as_bytes(), "country").unwrap();
        assert!(matches!(table.column("trust"), Err(Error::DataShape(_))));
    }
}
