use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the load / filter / summary pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read CSV '{}'", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV row {row} has {found} fields but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("column '{column}' has {found} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
