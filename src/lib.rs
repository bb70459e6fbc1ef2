//! World Happiness dashboard: loads the cleaned report once, aggregates it
//! per view and renders one of six charts.

pub mod charts;
pub mod eda_statistics;
pub mod error;
pub mod load_clean;
pub mod logging;
pub mod models;
pub mod page;
pub mod summary;
pub mod views;

pub use charts::{Plot, Prepared, Rendered};
pub use error::{DashboardError, DataError, RenderError, SelectionError};
pub use load_clean::{load_dataset, Dataset};
pub use models::{Factor, MissingPolicy, ReportRow};
pub use views::{Selection, View};
