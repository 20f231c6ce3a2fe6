use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{PipelineError, Result};

use super::model::{Column, Table, Value};

/// Cell texts treated as missing unless overridden.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Trimmed cell texts that become [`Value::Null`].
    pub na_values: BTreeSet<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LoadOptions {
    pub fn with_na_value(mut self, token: impl Into<String>) -> Self {
        self.na_values.insert(token.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a comma-separated file with a header row.
///
/// A missing file is reported as [`PipelineError::NotFound`] so callers can show
/// a message and stop; nothing is substituted.
pub fn load_csv(path: &Path, options: &LoadOptions) -> Result<Table> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PipelineError::NotFound(path.to_path_buf()),
        _ => PipelineError::Csv {
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        },
    })?;

    let table = read_csv(file, options).map_err(|e| match e {
        PipelineError::Csv { source, .. } => PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        table.len(),
        table.column_names(),
        path.display()
    );
    Ok(table)
}

/// Parse CSV text from any reader. Errors from the CSV layer carry an empty path.
pub fn read_csv<R: Read>(source: R, options: &LoadOptions) -> Result<Table> {
    let csv_err = |source: csv::Error| PipelineError::Csv {
        path: Default::default(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = dedupe_headers(reader.headers().map_err(csv_err)?.iter());
    let width = headers.len();

    // Raw cells per column; `None` marks an NA token or a padded short row.
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); width];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        if record.len() > width {
            return Err(PipelineError::RaggedRow {
                row: row_no,
                expected: width,
                found: record.len(),
            });
        }
        for (col_idx, cells) in raw.iter_mut().enumerate() {
            let cell = record
                .get(col_idx)
                .filter(|text| !options.na_values.contains(text.trim()))
                .map(str::to_string);
            cells.push(cell);
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, type_cells(cells)))
        .collect();
    Table::new(columns)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Blank names become `Unnamed: <i>`; repeats get `.1`, `.2`, ... appended.
fn dedupe_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::new();
    for (i, name) in names.enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.to_string()
        };
        let mut candidate = base.clone();
        while let Some(count) = seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{base}.{}", *count);
        }
        seen.insert(candidate.clone(), 0);
        out.push(candidate);
    }
    out
}

/// Pick one representation for a whole column: all integers, else all floats,
/// else raw text.
fn type_cells(cells: Vec<Option<String>>) -> Vec<Value> {
    let present = || cells.iter().flatten().map(|s| s.trim());

    if present().all(|s| s.parse::<i64>().is_ok()) {
        return cells
            .iter()
            .map(|c| match c.as_deref().map(|s| s.trim().parse::<i64>()) {
                Some(Ok(i)) => Value::Integer(i),
                _ => Value::Null,
            })
            .collect();
    }
    if present().all(|s| s.parse::<f64>().is_ok()) {
        return cells
            .iter()
            .map(|c| match c.as_deref().map(|s| s.trim().parse::<f64>()) {
                Some(Ok(f)) if !f.is_nan() => Value::Float(f),
                _ => Value::Null,
            })
            .collect();
    }
    cells
        .into_iter()
        .map(|c| c.map(Value::Text).unwrap_or(Value::Null))
        .collect()
}
