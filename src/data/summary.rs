use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::{PipelineError, Result};

use super::model::{Column, ColumnKind, Table, Value};

// ---------------------------------------------------------------------------
// Describe
// ---------------------------------------------------------------------------

/// Descriptive statistics of one numeric column.
///
/// `std` is the sample standard deviation (N−1 divisor) and is `None` below two
/// observations; the other statistics are `None` only when there is no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    pub fn from_values(column: impl Into<String>, values: &[f64]) -> Self {
        let count = values.len();
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count >= 2).map(|m| {
            let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        NumericSummary {
            column: column.into(),
            count,
            mean,
            std,
            min: sorted.first().copied(),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

/// Linear-interpolated quantile of already sorted data.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Summaries for every numeric column, in column order.
pub fn describe(table: &Table) -> Vec<NumericSummary> {
    table
        .columns()
        .iter()
        .filter(|c| c.kind().is_numeric())
        .map(|c| NumericSummary::from_values(&c.name, &c.numbers()))
        .collect()
}

/// Summary of a single named numeric column.
pub fn describe_column(table: &Table, column: &str) -> Result<NumericSummary> {
    let col = numeric_column(table, column)?;
    Ok(NumericSummary::from_values(&col.name, &col.numbers()))
}

// ---------------------------------------------------------------------------
// Missing values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingEntry {
    pub column: String,
    pub missing: usize,
    /// `100 * missing / rows`, or 0 for an empty table.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingReport {
    pub total_rows: usize,
    pub entries: Vec<MissingEntry>,
}

impl MissingReport {
    pub fn total_missing(&self) -> usize {
        self.entries.iter().map(|e| e.missing).sum()
    }

    /// Entries with at least one missing cell.
    pub fn with_missing(&self) -> impl Iterator<Item = &MissingEntry> {
        self.entries.iter().filter(|e| e.missing > 0)
    }
}

pub fn missing_report(table: &Table) -> MissingReport {
    let total_rows = table.len();
    let entries = table
        .columns()
        .iter()
        .map(|c| {
            let missing = c.null_count();
            let percentage = if total_rows == 0 {
                0.0
            } else {
                100.0 * missing as f64 / total_rows as f64
            };
            MissingEntry {
                column: c.name.clone(),
                missing,
                percentage,
            }
        })
        .collect();
    MissingReport {
        total_rows,
        entries,
    }
}

// ---------------------------------------------------------------------------
// Column profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub column: String,
    pub kind: ColumnKind,
    pub non_missing: usize,
    pub distinct: usize,
}

pub fn column_profile(table: &Table) -> Vec<ColumnInfo> {
    table
        .columns()
        .iter()
        .map(|c| {
            let distinct: BTreeSet<&Value> = c.values().iter().filter(|v| !v.is_null()).collect();
            ColumnInfo {
                column: c.name.clone(),
                kind: c.kind(),
                non_missing: c.len() - c.null_count(),
                distinct: distinct.len(),
            }
        })
        .collect()
}

/// How many columns of each kind the table has.
pub fn kind_counts(table: &Table) -> BTreeMap<ColumnKind, usize> {
    let mut counts = BTreeMap::new();
    for column in table.columns() {
        *counts.entry(column.kind()).or_insert(0) += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Value counts and histograms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: Value,
    pub count: usize,
}

/// Distinct non-missing values with their frequency, most frequent first;
/// ties are broken by value order.
pub fn value_counts(table: &Table, column: &str) -> Result<Vec<ValueCount>> {
    let col = table.require(column)?;
    let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
    for value in col.values().iter().filter(|v| !v.is_null()) {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut out: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount {
            value: value.clone(),
            count,
        })
        .collect();
    // Stable sort keeps the ascending value order among equal counts.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over the observed range. The last bin includes its upper edge.
/// Infinite values are left out.
pub fn histogram(table: &Table, column: &str, bins: usize) -> Result<Vec<HistogramBin>> {
    let values: Vec<f64> = numeric_column(table, column)?
        .numbers()
        .into_iter()
        .filter(|v| v.is_finite())
        .collect();
    let Some((min, max)) = min_max(&values) else {
        return Ok(Vec::new());
    };
    if bins == 0 {
        return Ok(Vec::new());
    }
    if min == max {
        return Ok(vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }]);
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    Ok(out)
}

/// Smallest and largest finite value of a numeric column, `None` when it has none.
pub fn numeric_range(table: &Table, column: &str) -> Result<Option<(f64, f64)>> {
    Ok(min_max(&numeric_column(table, column)?.numbers()))
}

/// Column names containing any keyword, compared case-insensitively.
pub fn related_columns(table: &Table, keywords: &[String]) -> Vec<String> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    table
        .columns()
        .iter()
        .filter(|c| {
            let name = c.name.to_lowercase();
            keywords.iter().any(|k| name.contains(k.as_str()))
        })
        .map(|c| c.name.clone())
        .collect()
}

fn numeric_column<'a>(table: &'a Table, column: &str) -> Result<&'a Column> {
    let col = table.require(column)?;
    if !col.kind().is_numeric() {
        return Err(PipelineError::NotNumeric(column.to_string()));
    }
    Ok(col)
}

/// Bounds over the finite values only.
fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let finite = || values.iter().copied().filter(|v| v.is_finite());
    let min = finite().reduce(f64::min)?;
    let max = finite().reduce(f64::max)?;
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-3)
    }

    fn sample() -> Table {
        Table::new(vec![
            Column::new(
                "temperature_c",
                vec![
                    Value::Float(36.5),
                    Value::Float(37.0),
                    Value::Float(38.2),
                    Value::Null,
                ],
            ),
            Column::new(
                "baby_id",
                ["A", "B", "A", "B"]
                    .iter()
                    .map(|s| Value::Text(s.to_string()))
                    .collect(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn describe_uses_sample_std() {
        let stats = describe(&sample());
        assert_eq!(stats.len(), 1);
        let t = &stats[0];
        assert_eq!(t.column, "temperature_c");
        assert_eq!(t.count, 3);
        assert!(approx(t.mean, 37.2333));
        assert!(approx(t.std, 0.8737));
        assert_eq!(t.min, Some(36.5));
        assert_eq!(t.median, Some(37.0));
        assert_eq!(t.max, Some(38.2));
        assert!(approx(t.q25, 36.75));
    }

    #[test]
    fn describe_degrades_with_few_values() {
        let one = NumericSummary::from_values("x", &[5.0]);
        assert_eq!(one.mean, Some(5.0));
        assert_eq!(one.std, None);
        let none = NumericSummary::from_values("x", &[]);
        assert_eq!(none.count, 0);
        assert_eq!(none.mean, None);
        assert_eq!(none.max, None);
    }

    #[test]
    fn missing_report_counts_and_percentages() {
        let report = missing_report(&sample());
        assert_eq!(report.total_rows, 4);
        let temp = &report.entries[0];
        assert_eq!(temp.missing, 1);
        assert!((temp.percentage - 25.0).abs() < 1e-9);
        assert_eq!(report.entries[1].percentage, 0.0);
        assert_eq!(report.total_missing(), 1);
        assert_eq!(report.with_missing().count(), 1);
    }

    #[test]
    fn missing_report_on_empty_table_is_zero() {
        let empty = sample().take(&[]);
        let report = missing_report(&empty);
        assert!(report.entries.iter().all(|e| e.percentage == 0.0));
    }

    #[test]
    fn profile_counts_distinct_non_missing() {
        let profile = column_profile(&sample());
        assert_eq!(
            profile[0],
            ColumnInfo {
                column: "temperature_c".into(),
                kind: ColumnKind::Float,
                non_missing: 3,
                distinct: 3,
            }
        );
        assert_eq!(profile[1].kind, ColumnKind::Text);
        assert_eq!(profile[1].distinct, 2);
        let kinds = kind_counts(&sample());
        assert_eq!(kinds.get(&ColumnKind::Float), Some(&1));
        assert_eq!(kinds.get(&ColumnKind::Text), Some(&1));
    }

    #[test]
    fn value_counts_most_frequent_first() {
        let table = Table::new(vec![Column::new(
            "alarm",
            ["low", "high", "low", "none", "high", "low"]
                .iter()
                .map(|s| Value::Text(s.to_string()))
                .chain(std::iter::once(Value::Null))
                .collect(),
        )])
        .unwrap();
        let counts = value_counts(&table, "alarm").unwrap();
        let flat: Vec<(String, usize)> = counts
            .iter()
            .map(|c| (c.value.to_string(), c.count))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("low".to_string(), 3),
                ("high".to_string(), 2),
                ("none".to_string(), 1)
            ]
        );
    }

    #[test]
    fn histogram_covers_every_value() {
        let bins = histogram(&sample(), "temperature_c", 2).unwrap();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].start, 36.5);
        assert_eq!(bins[1].end, 38.2);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
        assert_eq!(bins[1].count, 1);
        assert!(histogram(&sample(), "temperature_c", 0).unwrap().is_empty());
        assert!(matches!(
            histogram(&sample(), "baby_id", 4),
            Err(PipelineError::NotNumeric(_))
        ));
    }

    #[test]
    fn nan_cells_are_reported_missing() {
        let table = Table::new(vec![Column::new(
            "temperature_c",
            vec![
                Value::Float(36.5),
                Value::Float(37.0),
                Value::Float(38.2),
                Value::Float(f64::NAN),
            ],
        )])
        .unwrap();
        let missing = missing_report(&table);
        assert_eq!(missing.total_missing(), 1);
        let entry = missing.with_missing().next().unwrap();
        assert_eq!(entry.missing, 1);
        assert!((entry.percentage - 25.0).abs() < 1e-9);
        assert_eq!(describe(&table)[0].count, 3);
    }

    #[test]
    fn histogram_skips_infinite_values() {
        let table = Table::new(vec![Column::new(
            "v",
            vec![Value::Float(1.0), Value::Float(2.0), Value::Float(f64::INFINITY)],
        )])
        .unwrap();
        let bins = histogram(&table, "v", 4).unwrap();
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].start, 1.0);
        assert_eq!(bins[3].end, 2.0);
        assert!(bins.iter().all(|b| b.start.is_finite() && b.end.is_finite()));
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(numeric_range(&table, "v").unwrap(), Some((1.0, 2.0)));
    }

    #[test]
    fn range_and_related_columns() {
        assert_eq!(
            numeric_range(&sample(), "temperature_c").unwrap(),
            Some((36.5, 38.2))
        );
        assert_eq!(
            related_columns(&sample(), &["BABY".to_string(), "birth".to_string()]),
            vec!["baby_id"]
        );
    }
}
