use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::data::correlation::{correlate, CorrelationMatrix};
use crate::data::filter::FilterSet;
use crate::data::model::{classify_columns, ColumnKind, Table, Value};
use crate::data::summary::{
    column_profile, describe, describe_column, histogram, kind_counts, missing_report,
    related_columns, value_counts, ColumnInfo, HistogramBin, MissingReport, NumericSummary,
    ValueCount,
};
use crate::state::DashboardState;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// Rows in the data sample; clamped to 5..=100.
    pub sample_rows: usize,
    pub histogram_bins: usize,
    /// Numeric column given its own statistics and histogram.
    pub focus_column: String,
    /// Columns whose name contains one of these get value counts.
    pub keywords: Vec<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            sample_rows: 10,
            histogram_bins: 20,
            focus_column: "temperature_c".to_string(),
            keywords: vec!["baby".to_string(), "birth".to_string()],
        }
    }
}

impl ReportOptions {
    pub fn sample_rows(&self) -> usize {
        self.sample_rows.clamp(5, 100)
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    /// Row count before filtering.
    pub total_records: usize,
    pub total_columns: usize,
    pub kinds: BTreeMap<ColumnKind, usize>,
    pub visible_records: usize,
    pub filters: FilterSet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusAnalysis {
    pub column: String,
    pub summary: NumericSummary,
    pub histogram: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedColumn {
    pub column: String,
    pub kind: ColumnKind,
    pub counts: Vec<ValueCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSample {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl DataSample {
    fn from_table(table: &Table) -> Self {
        DataSample {
            columns: table.column_names().into_iter().map(str::to_string).collect(),
            rows: (0..table.len())
                .filter_map(|i| table.row(i))
                .map(|row| row.into_iter().cloned().collect())
                .collect(),
        }
    }
}

/// Every dashboard section, computed from one filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub info: DatasetInfo,
    pub describe: Vec<NumericSummary>,
    pub missing: MissingReport,
    pub focus: Option<FocusAnalysis>,
    pub related: Vec<RelatedColumn>,
    pub sample: DataSample,
    pub profile: Vec<ColumnInfo>,
    /// Absent when fewer than two numeric columns are available.
    pub correlation: Option<CorrelationMatrix>,
}

pub fn build_report(state: &DashboardState, options: &ReportOptions) -> DashboardReport {
    let view = state.view();

    let info = DatasetInfo {
        total_records: state.table.len(),
        total_columns: state.table.width(),
        kinds: kind_counts(&state.table),
        visible_records: view.len(),
        filters: state.filters().clone(),
    };

    let related = related_columns(&view, &options.keywords)
        .into_iter()
        .filter_map(|name| {
            let kind = view.column(&name)?.kind();
            let counts = value_counts(&view, &name).ok()?;
            Some(RelatedColumn {
                column: name,
                kind,
                counts,
            })
        })
        .collect::<Vec<_>>();
    if related.is_empty() {
        log::info!("No columns match keywords {:?}", options.keywords);
    }

    let (numeric, _) = classify_columns(&view);
    let correlation = if numeric.len() >= 2 {
        Some(correlate(&view, &numeric))
    } else {
        log::info!("Correlation needs two numeric columns, found {}", numeric.len());
        None
    };

    DashboardReport {
        info,
        describe: describe(&view),
        missing: missing_report(&view),
        focus: focus_analysis(&view, options),
        related,
        sample: DataSample::from_table(&view.head(options.sample_rows())),
        profile: column_profile(&view),
        correlation,
    }
}

fn focus_analysis(view: &Table, options: &ReportOptions) -> Option<FocusAnalysis> {
    let column = &options.focus_column;
    let summary = match describe_column(view, column) {
        Ok(summary) => summary,
        Err(e) => {
            log::warn!("{column} analysis not available: {e}");
            return None;
        }
    };
    let histogram = histogram(view, column, options.histogram_bins).ok()?;
    Some(FocusAnalysis {
        column: column.clone(),
        summary,
        histogram,
    })
}

// ---------------------------------------------------------------------------
// Plain-text rendering
// ---------------------------------------------------------------------------

fn num(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = &self.info;
        writeln!(f, "== Dataset info ==")?;
        writeln!(f, "Total records: {}", info.total_records)?;
        writeln!(f, "Total columns: {}", info.total_columns)?;
        writeln!(f, "Column kinds:")?;
        for (kind, count) in &info.kinds {
            writeln!(f, "  - {kind}: {count}")?;
        }
        if !info.filters.is_empty() {
            writeln!(f, "Filters:")?;
            for (column, filter) in info.filters.iter() {
                writeln!(f, "  - {column} {filter}")?;
            }
        }
        writeln!(f, "Visible records: {}", info.visible_records)?;

        writeln!(f, "\n== Basic statistics ==")?;
        if self.describe.is_empty() {
            writeln!(f, "No numeric columns.")?;
        } else {
            writeln!(
                f,
                "{:<20} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
                "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
            )?;
            for s in &self.describe {
                writeln!(
                    f,
                    "{:<20} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
                    s.column,
                    s.count,
                    num(s.mean),
                    num(s.std),
                    num(s.min),
                    num(s.q25),
                    num(s.median),
                    num(s.q75),
                    num(s.max)
                )?;
            }
        }

        writeln!(f, "\n== Missing values ==")?;
        if self.missing.total_missing() == 0 {
            writeln!(f, "No missing values found!")?;
        } else {
            for e in self.missing.with_missing() {
                writeln!(f, "{:<20} {:>6} {:>7.2}%", e.column, e.missing, e.percentage)?;
            }
        }

        match &self.focus {
            Some(focus) => {
                writeln!(f, "\n== {} analysis ==", focus.column)?;
                let s = &focus.summary;
                writeln!(f, "Mean: {}", num(s.mean))?;
                writeln!(f, "Standard deviation: {}", num(s.std))?;
                writeln!(f, "Minimum: {}", num(s.min))?;
                writeln!(f, "Maximum: {}", num(s.max))?;
                let peak = focus.histogram.iter().map(|b| b.count).max().unwrap_or(0);
                for bin in &focus.histogram {
                    let bar = if peak == 0 { 0 } else { bin.count * 40 / peak };
                    writeln!(
                        f,
                        "  [{:>8.2}, {:>8.2}] {:>5} {}",
                        bin.start,
                        bin.end,
                        bin.count,
                        "#".repeat(bar)
                    )?;
                }
            }
            None => writeln!(f, "\nFocus column data not available.")?,
        }

        writeln!(f, "\n== Related columns ==")?;
        if self.related.is_empty() {
            writeln!(f, "No related columns found.")?;
        }
        for related in &self.related {
            writeln!(f, "{} ({}):", related.column, related.kind)?;
            for vc in &related.counts {
                writeln!(f, "  {:<20} {:>6}", vc.value.to_string(), vc.count)?;
            }
        }

        writeln!(f, "\n== Data sample ({} rows) ==", self.sample.rows.len())?;
        writeln!(f, "{}", self.sample.columns.join(" | "))?;
        for row in &self.sample.rows {
            let cells: Vec<String> = row.iter().map(Value::to_string).collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }

        writeln!(f, "\n== Column information ==")?;
        writeln!(
            f,
            "{:<20} {:<8} {:>10} {:>8}",
            "column", "kind", "non-null", "unique"
        )?;
        for c in &self.profile {
            writeln!(
                f,
                "{:<20} {:<8} {:>10} {:>8}",
                c.column,
                c.kind.to_string(),
                c.non_missing,
                c.distinct
            )?;
        }

        if let Some(m) = &self.correlation {
            writeln!(f, "\n== Correlation matrix ==")?;
            write!(f, "{:<20}", "")?;
            for c in &m.columns {
                write!(f, " {c:>12.12}")?;
            }
            writeln!(f)?;
            for (name, row) in m.columns.iter().zip(&m.correlations) {
                write!(f, "{name:<20}")?;
                for r in row {
                    write!(f, " {:>12}", num(*r))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
