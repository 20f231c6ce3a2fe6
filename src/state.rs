use std::collections::BTreeSet;
use std::sync::Arc;

use crate::data::filter::{filtered_indices, Filter, FilterSet};
use crate::data::model::{Table, Value};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything a presentation layer needs between requests.
///
/// The table is loaded once and shared read-only; only the filters change.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Loaded dataset, never mutated.
    pub table: Arc<Table>,

    /// Active predicates; only changed through methods that refresh the cache.
    filters: FilterSet,

    /// Indices of rows passing the current filters (cached).
    visible_indices: Vec<usize>,
}

impl DashboardState {
    /// Start a session with every row visible.
    pub fn new(table: impl Into<Arc<Table>>) -> Self {
        let table = table.into();
        let visible_indices = (0..table.len()).collect();
        Self {
            table,
            filters: FilterSet::new(),
            visible_indices,
        }
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn visible_indices(&self) -> &[usize] {
        &self.visible_indices
    }

    pub fn visible_count(&self) -> usize {
        self.visible_indices.len()
    }

    /// The filtered table.
    pub fn view(&self) -> Table {
        self.table.take(&self.visible_indices)
    }

    /// Recompute `visible_indices` after a filter change.
    fn refilter(&mut self) -> Result<()> {
        self.visible_indices = filtered_indices(&self.table, &self.filters)?;
        Ok(())
    }

    fn set(&mut self, column: &str, filter: Filter) -> Result<()> {
        self.filters.set(&self.table, column, filter)?;
        self.refilter()
    }

    /// Restrict `column` to `[lo, hi]`.
    pub fn set_range(&mut self, column: &str, lo: f64, hi: f64) -> Result<()> {
        self.set(column, Filter::Range { lo, hi })
    }

    /// Restrict `column` to the given values.
    pub fn set_members(&mut self, column: &str, values: BTreeSet<Value>) -> Result<()> {
        self.set(column, Filter::Members { values })
    }

    /// Toggle a single value in a column's membership filter. A column without one
    /// starts from "everything selected".
    pub fn toggle_value(&mut self, column: &str, value: &Value) -> Result<()> {
        let mut selected = match self.filters.get(column) {
            Some(Filter::Members { values }) => values.clone(),
            _ => self.table.require(column)?.distinct_values(),
        };
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.set_members(column, selected)
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: &str) -> Result<()> {
        let all = self.table.require(column)?.distinct_values();
        self.set_members(column, all)
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: &str) -> Result<()> {
        self.set_members(column, BTreeSet::new())
    }

    pub fn clear_filter(&mut self, column: &str) -> Result<()> {
        if self.filters.remove(column).is_some() {
            self.refilter()?;
        }
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.filters.clear();
        self.visible_indices = (0..self.table.len()).collect();
    }
}
