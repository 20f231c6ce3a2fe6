use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Used in `BTreeSet`s for membership filters, so `Value` must be `Ord`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Numeric view of the value, `None` for text and missing cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Column classification
// ---------------------------------------------------------------------------

/// Derived type of a column. `Integer` and `Float` are numeric, `Text` is categorical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        !matches!(self, ColumnKind::Text)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Text => "text",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column – one named sequence of cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Classified once from the cells at construction; kept by row subsets so
    /// the schema does not change when a filter empties the table.
    kind: ColumnKind,
    values: Vec<Value>,
}

impl Column {
    /// Float NaN cells are stored as `Null` and `-0.0` as `0.0`, so missing
    /// counts and membership tests see one representation.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let values: Vec<Value> = values.into_iter().map(normalise).collect();
        Self {
            name: name.into(),
            kind: classify(&values),
            values,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Non-missing numeric cells, in row order.
    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    /// Sorted set of distinct cells, `Null` included when present.
    pub fn distinct_values(&self) -> BTreeSet<Value> {
        self.values.iter().cloned().collect()
    }

    /// Interpret user-supplied text as a cell of this column, so that filter
    /// arguments compare equal to stored values.
    pub fn parse_value(&self, text: &str) -> Value {
        let trimmed = text.trim();
        match self.kind() {
            ColumnKind::Integer => trimmed
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(text.to_string())),
            ColumnKind::Float => trimmed
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or_else(|_| Value::Text(text.to_string())),
            ColumnKind::Text => Value::Text(text.to_string()),
        }
    }

    fn take(&self, indices: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            kind: self.kind,
            values: indices.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Ordered, equal-length columns. Immutable once built; filters produce new tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table, checking that every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self, PipelineError> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(PipelineError::ColumnLength {
                column: bad.name.clone(),
                expected: n_rows,
                found: bad.len(),
            });
        }
        Ok(Table { columns, n_rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`Table::column`] but reports an unknown name as an error.
    pub fn require(&self, name: &str) -> Result<&Column, PipelineError> {
        self.column(name)
            .ok_or_else(|| PipelineError::UnknownColumn(name.to_string()))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Cells of row `index` in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.n_rows {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// New table holding the given rows, in the order given.
    /// Every index must be below `len()`.
    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let indices: Vec<usize> = (0..n.min(self.n_rows)).collect();
        self.take(&indices)
    }
}

fn normalise(value: Value) -> Value {
    match value {
        Value::Float(f) if f.is_nan() => Value::Null,
        Value::Float(f) if f == 0.0 => Value::Float(0.0),
        other => other,
    }
}

/// Numeric when every non-missing cell is a number. A column with no data at
/// all counts as `Float`.
fn classify(values: &[Value]) -> ColumnKind {
    let mut saw_float = false;
    for value in values {
        match value {
            Value::Null | Value::Integer(_) => {}
            Value::Float(_) => saw_float = true,
            Value::Text(_) => return ColumnKind::Text,
        }
    }
    if saw_float || values.iter().all(Value::is_null) {
        ColumnKind::Float
    } else {
        ColumnKind::Integer
    }
}

/// Partition column names into (numeric, categorical), keeping column order.
pub fn classify_columns(table: &Table) -> (Vec<String>, Vec<String>) {
    let mut numeric = Vec::new();
    let mut categorical = Vec::new();
    for column in table.columns() {
        if column.kind().is_numeric() {
            numeric.push(column.name.clone());
        } else {
            categorical.push(column.name.clone());
        }
    }
    (numeric, categorical)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(values: &[Option<f64>]) -> Vec<Value> {
        values
            .iter()
            .map(|v| v.map(Value::Float).unwrap_or(Value::Null))
            .collect()
    }

    #[test]
    fn kind_follows_cells() {
        let ints = Column::new("a", vec![Value::Integer(1), Value::Null]);
        let mixed = Column::new("b", vec![Value::Integer(1), Value::Float(2.5)]);
        let text = Column::new("c", vec![Value::Null, Value::Text("x".into())]);
        let empty = Column::new("d", vec![Value::Null, Value::Null]);
        assert_eq!(ints.kind(), ColumnKind::Integer);
        assert_eq!(mixed.kind(), ColumnKind::Float);
        assert_eq!(text.kind(), ColumnKind::Text);
        assert_eq!(empty.kind(), ColumnKind::Float);
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = Table::new(vec![
            Column::new("a", floats(&[Some(1.0), Some(2.0)])),
            Column::new("b", floats(&[Some(1.0)])),
        ])
        .unwrap_err();
        assert!(matches!(err, PipelineError::ColumnLength { found: 1, .. }));
    }

    #[test]
    fn classify_keeps_column_order() {
        let table = Table::new(vec![
            Column::new("name", vec![Value::Text("x".into())]),
            Column::new("temp", floats(&[Some(36.6)])),
            Column::new("ward", vec![Value::Text("b".into())]),
            Column::new("hr", vec![Value::Integer(120)]),
        ])
        .unwrap();
        let (numeric, categorical) = classify_columns(&table);
        assert_eq!(numeric, vec!["temp", "hr"]);
        assert_eq!(categorical, vec!["name", "ward"]);
    }

    #[test]
    fn take_preserves_requested_order() {
        let table = Table::new(vec![Column::new(
            "v",
            vec![Value::Integer(10), Value::Integer(20), Value::Integer(30)],
        )])
        .unwrap();
        let taken = table.take(&[2, 0]);
        assert_eq!(taken.len(), 2);
        assert_eq!(
            taken.column("v").unwrap().values(),
            vec![Value::Integer(30), Value::Integer(10)]
        );
        assert_eq!(table.head(10).len(), 3);
        assert!(table.row(3).is_none());
    }

    #[test]
    fn kind_survives_empty_subset() {
        let table = Table::new(vec![Column::new("baby", vec![Value::Text("A".into())])]).unwrap();
        assert_eq!(table.take(&[]).column("baby").unwrap().kind(), ColumnKind::Text);
    }

    #[test]
    fn nan_cells_count_as_missing() {
        let col = Column::new(
            "temperature_c",
            vec![
                Value::Float(36.5),
                Value::Float(37.0),
                Value::Float(38.2),
                Value::Float(f64::NAN),
            ],
        );
        assert_eq!(col.null_count(), 1);
        assert_eq!(col.numbers(), vec![36.5, 37.0, 38.2]);
        assert_eq!(col.kind(), ColumnKind::Float);
    }

    #[test]
    fn equality_agrees_with_ordering() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let hash = |v: &Value| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        let (pos, neg) = (Value::Float(0.0), Value::Float(-0.0));
        assert_eq!(pos == neg, pos.cmp(&neg) == std::cmp::Ordering::Equal);
        assert_ne!(pos, neg);
        assert_ne!(hash(&pos), hash(&neg));

        let col = Column::new("v", vec![Value::Float(-0.0), Value::Float(1.0)]);
        assert_eq!(col.values()[0], Value::Float(0.0));
        assert!(col.distinct_values().contains(&Value::Float(0.0)));
    }

    #[test]
    fn parse_value_matches_column_kind() {
        let ints = Column::new("id", vec![Value::Integer(7)]);
        let text = Column::new("baby", vec![Value::Text("7".into())]);
        assert_eq!(ints.parse_value(" 7"), Value::Integer(7));
        assert_eq!(text.parse_value("7"), Value::Text("7".into()));
    }

    #[test]
    fn distinct_values_include_null() {
        let col = Column::new(
            "b",
            vec![
                Value::Text("B".into()),
                Value::Null,
                Value::Text("A".into()),
                Value::Text("B".into()),
            ],
        );
        let distinct: Vec<Value> = col.distinct_values().into_iter().collect();
        assert_eq!(
            distinct,
            vec![Value::Null, Value::Text("A".into()), Value::Text("B".into())]
        );
    }
}
