use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::error::{PipelineError, Result};

use super::model::{Table, Value};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// One predicate on one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Closed interval `lo <= value <= hi`. Missing cells never match.
    Range { lo: f64, hi: f64 },
    /// Cell must be one of the listed values. `Null` may be listed.
    Members { values: BTreeSet<Value> },
}

impl Filter {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Filter::Range { lo, hi } => value
                .as_f64()
                .is_some_and(|v| *lo <= v && v <= *hi),
            Filter::Members { values } => values.contains(value),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Range { lo, hi } => write!(f, "in [{lo}, {hi}]"),
            Filter::Members { values } => {
                let labels: Vec<String> = values.iter().map(Value::to_string).collect();
                write!(f, "in {{{}}}", labels.join(", "))
            }
        }
    }
}

/// Active predicates keyed by column name; at most one per column.
/// Rows must satisfy every entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilterSet {
    filters: BTreeMap<String, Filter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the predicate for `column`, checking it against `table`.
    pub fn set(&mut self, table: &Table, column: &str, filter: Filter) -> Result<()> {
        let col = table.require(column)?;
        if matches!(filter, Filter::Range { .. }) && !col.kind().is_numeric() {
            return Err(PipelineError::NotNumeric(column.to_string()));
        }
        self.filters.insert(column.to_string(), filter);
        Ok(())
    }

    pub fn get(&self, column: &str) -> Option<&Filter> {
        self.filters.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Filter> {
        self.filters.remove(column)
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Filter)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Filtered copy of `table`.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        Ok(table.take(&filtered_indices(table, self)?))
    }
}

/// Return indices of rows that pass all filters, in table order.
///
/// A filter naming a column the table does not have is an error rather than
/// a silent pass.
pub fn filtered_indices(table: &Table, filters: &FilterSet) -> Result<Vec<usize>> {
    let resolved = filters
        .iter()
        .map(|(name, filter)| table.require(name).map(|col| (col, filter)))
        .collect::<Result<Vec<_>>>()?;

    let indices: Vec<usize> = (0..table.len())
        .filter(|&row| {
            resolved
                .iter()
                .all(|(col, filter)| filter.matches(&col.values()[row]))
        })
        .collect();

    log::debug!(
        "{} of {} rows pass {} filter(s)",
        indices.len(),
        table.len(),
        filters.len()
    );
    Ok(indices)
}

/// Keep rows whose `column` value lies in `[lo, hi]`. `lo > hi` keeps nothing.
pub fn apply_numeric_filter(table: &Table, column: &str, lo: f64, hi: f64) -> Result<Table> {
    let mut filters = FilterSet::new();
    filters.set(table, column, Filter::Range { lo, hi })?;
    filters.apply(table)
}

/// Keep rows whose `column` value is one of `allowed`. An empty set keeps nothing.
pub fn apply_categorical_filter(
    table: &Table,
    column: &str,
    allowed: &BTreeSet<Value>,
) -> Result<Table> {
    let mut filters = FilterSet::new();
    filters.set(
        table,
        column,
        Filter::Members {
            values: allowed.clone(),
        },
    )?;
    filters.apply(table)
}
