use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use itertools::Itertools;
use tracing::{debug, info};

use crate::error::DataError;
use crate::models::{HappinessRecord, ReportRow};

/// Default location of the cleaned report.
pub const DEFAULT_DATA_PATH: &str = "world_happiness_clean.csv";

/// Columns every report file must carry; factor columns are optional.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Country", "Year", "Happiness Score"];

/// Read-only table of report rows, in file order.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<ReportRow>,
}

impl Dataset {
    /// Builds a dataset from rows, rejecting duplicate (Country, Year) pairs.
    pub fn from_rows(rows: Vec<ReportRow>) -> Result<Self, DataError> {
        let mut seen = HashSet::new();
        for row in &rows {
            if !seen.insert((row.country.as_str(), row.year)) {
                return Err(DataError::DuplicateRow {
                    country: row.country.clone(),
                    year: row.year,
                });
            }
        }
        Ok(Dataset { rows })
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<u16> {
        self.rows.iter().map(|r| r.year).unique().sorted().collect()
    }

    /// Distinct countries, ascending.
    pub fn countries(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.country.as_str())
            .unique()
            .sorted()
            .collect()
    }
}

// Load the cleaned report
pub fn load_dataset(file_path: &Path) -> Result<Dataset, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(file_path)
        .map_err(|e| read_error(file_path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| read_error(file_path, e))?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DataError::MissingColumn {
                column,
                path: file_path.to_path_buf(),
            });
        }
    }
    debug!(columns = headers.len(), "report header accepted");

    let mut rows = Vec::new();
    let mut raw = StringRecord::new();
    while reader
        .read_record(&mut raw)
        .map_err(|e| read_error(file_path, e))?
    {
        let record: HappinessRecord = raw
            .deserialize(Some(&headers))
            .map_err(|e| parse_error(file_path, e))?;
        if !record.score.is_finite() {
            return Err(DataError::Parse {
                path: file_path.to_path_buf(),
                line: raw.position().map(|p| p.line()).unwrap_or(0),
                message: format!("happiness score is not a finite number: {}", record.score),
            });
        }
        rows.push(record.into_row());
    }

    if rows.is_empty() {
        return Err(DataError::Empty {
            path: file_path.to_path_buf(),
        });
    }

    let dataset = Dataset::from_rows(rows)?;
    info!(
        path = %file_path.display(),
        rows = dataset.len(),
        years = dataset.years().len(),
        countries = dataset.countries().len(),
        "loaded report data"
    );
    Ok(dataset)
}

fn read_error(path: &Path, err: csv::Error) -> DataError {
    if let csv::ErrorKind::Io(io) = err.kind() {
        if io.kind() == std::io::ErrorKind::NotFound {
            return DataError::NotFound {
                path: path.to_path_buf(),
            };
        }
    }
    DataError::Read {
        path: path.to_path_buf(),
        source: err,
    }
}

fn parse_error(path: &Path, err: csv::Error) -> DataError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    if let csv::ErrorKind::Deserialize { err: de, .. } = err.kind() {
        return DataError::Parse {
            path: path.to_path_buf(),
            line,
            message: de.to_string(),
        };
    }
    read_error(path, err)
}
