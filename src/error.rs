//! Error types for loading the report data and rendering views.

use std::path::PathBuf;
use thiserror::Error;

/// The report data could not be made available.
#[derive(Debug, Error)]
pub enum DataError {
    /// Data file does not exist.
    #[error("data file not found: {path}")]
    NotFound { path: PathBuf },

    /// Data file exists but could not be read.
    #[error("failed to read data file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A record could not be parsed into a report row.
    #[error("malformed record {line} in {path}: {message}")]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// A required column is absent from the header.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: &'static str, path: PathBuf },

    /// The same (Country, Year) pair appears more than once.
    #[error("duplicate row for {country} in {year}")]
    DuplicateRow { country: String, year: u16 },

    /// No data rows at all.
    #[error("data file has no rows: {path}")]
    Empty { path: PathBuf },
}

/// A filter value that is not present in the loaded data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("year {year} is not in the data (available: {available})")]
    UnknownYear { year: u16, available: String },

    #[error("country '{country}' is not in the data (available: {available})")]
    UnknownCountry { country: String, available: String },

    /// A view asked for a filter that the selection does not carry.
    #[error("view '{view}' needs a {filter} selection")]
    MissingFilter {
        view: &'static str,
        filter: &'static str,
    },
}

/// Drawing or writing a chart failed.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to draw chart: {message}")]
    Draw { message: String },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Any failure surfaced by the dashboard library.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;
