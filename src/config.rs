//! Command-line configuration.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};

use crate::data::loader::LoadOptions;
use crate::data::model::Value;
use crate::error::Result;
use crate::report::ReportOptions;
use crate::state::DashboardState;

/// Output rendering for the report.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain-text sections
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// `COLUMN=LO:HI`
#[derive(Debug, Clone, PartialEq)]
pub struct RangeArg {
    pub column: String,
    pub lo: f64,
    pub hi: f64,
}

/// `COLUMN=V1,V2,...`; `COLUMN=` selects nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeArg {
    pub column: String,
    pub values: Vec<String>,
}

fn parse_range(s: &str) -> anyhow::Result<RangeArg> {
    let (column, bounds) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected COLUMN=LO:HI, got '{s}'"))?;
    let (lo, hi) = bounds
        .split_once(':')
        .ok_or_else(|| anyhow!("expected LO:HI bounds, got '{bounds}'"))?;
    Ok(RangeArg {
        column: column.to_string(),
        lo: lo.trim().parse().with_context(|| format!("bad lower bound '{lo}'"))?,
        hi: hi.trim().parse().with_context(|| format!("bad upper bound '{hi}'"))?,
    })
}

fn parse_include(s: &str) -> anyhow::Result<IncludeArg> {
    let (column, values) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected COLUMN=V1,V2,..., got '{s}'"))?;
    let values = if values.is_empty() {
        Vec::new()
    } else {
        values.split(',').map(str::to_string).collect()
    };
    Ok(IncludeArg {
        column: column.to_string(),
        values,
    })
}

/// Filter and summarise a medical monitoring CSV export.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// CSV file with a header row
    #[arg(default_value = "monitoringdata.csv")]
    pub path: PathBuf,

    /// Keep rows where COLUMN lies in [LO, HI] (repeatable)
    #[arg(long = "range", value_name = "COLUMN=LO:HI", value_parser = parse_range)]
    pub ranges: Vec<RangeArg>,

    /// Keep rows whose COLUMN is one of the listed values (repeatable)
    #[arg(long = "include", value_name = "COLUMN=V1,V2", value_parser = parse_include)]
    pub includes: Vec<IncludeArg>,

    /// Rows in the data sample (5-100)
    #[arg(long, default_value_t = 10)]
    pub rows: usize,

    /// Histogram bins for the focus column
    #[arg(long, default_value_t = 20)]
    pub bins: usize,

    /// Numeric column analysed in detail
    #[arg(long, default_value = "temperature_c")]
    pub focus: String,

    /// Keyword selecting related columns for value counts (repeatable)
    #[arg(long = "keyword", default_values_t = ["baby".to_string(), "birth".to_string()])]
    pub keywords: Vec<String>,

    /// Extra cell text treated as missing (repeatable)
    #[arg(long = "na-value")]
    pub na_values: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub path: PathBuf,
    pub load: LoadOptions,
    pub ranges: Vec<RangeArg>,
    pub includes: Vec<IncludeArg>,
    pub report: ReportOptions,
    pub format: OutputFormat,
}

impl From<Cli> for DashboardConfig {
    fn from(cli: Cli) -> Self {
        let load = cli
            .na_values
            .into_iter()
            .fold(LoadOptions::default(), LoadOptions::with_na_value);
        DashboardConfig {
            path: cli.path,
            load,
            ranges: cli.ranges,
            includes: cli.includes,
            report: ReportOptions {
                sample_rows: cli.rows,
                histogram_bins: cli.bins,
                focus_column: cli.focus,
                keywords: cli.keywords,
            },
            format: cli.format,
        }
    }
}

impl DashboardConfig {
    /// Install the configured filters on a session. Membership values are
    /// parsed with the target column's type so `--include id=7` matches integers;
    /// NA tokens select missing cells.
    pub fn apply_filters(&self, state: &mut DashboardState) -> Result<()> {
        for range in &self.ranges {
            state.set_range(&range.column, range.lo, range.hi)?;
        }
        for include in &self.includes {
            let column = state.table.require(&include.column)?;
            let values = include
                .values
                .iter()
                .map(|v| {
                    if self.load.na_values.contains(v.trim()) {
                        Value::Null
                    } else {
                        column.parse_value(v)
                    }
                })
                .collect();
            state.set_members(&include.column, values)?;
        }
        Ok(())
    }
}
