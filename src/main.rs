use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use rusty_vitals::config::{Cli, DashboardConfig, OutputFormat};
use rusty_vitals::{build_report, load_csv, DashboardState, PipelineError};

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let config = DashboardConfig::from(Cli::parse());

    let table = match load_csv(&config.path, &config.load) {
        Ok(table) => table,
        Err(PipelineError::NotFound(path)) => {
            log::error!("Input file {} not found", path.display());
            eprintln!(
                "File '{}' not found. Please make sure it exists.",
                path.display()
            );
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).context("loading monitoring data"),
    };

    let mut state = DashboardState::new(table);
    config
        .apply_filters(&mut state)
        .context("applying filters")?;

    let report = build_report(&state, &config.report);
    match config.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("serialising report")?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{report}"),
    }
    Ok(ExitCode::SUCCESS)
}
