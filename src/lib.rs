//! Load a CSV of monitoring records, narrow it with range and membership
//! filters, and compute summary views over what remains.

pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod state;

pub use data::correlation::{correlate, CorrelationMatrix};
pub use data::filter::{
    apply_categorical_filter, apply_numeric_filter, filtered_indices, Filter, FilterSet,
};
pub use data::loader::{load_csv, read_csv, LoadOptions};
pub use data::model::{classify_columns, Column, ColumnKind, Table, Value};
pub use data::summary::{column_profile, describe, missing_report};
pub use error::PipelineError;
pub use report::{build_report, DashboardReport, ReportOptions};
pub use state::DashboardState;
