mod common;

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use rusty_vitals::{
    apply_categorical_filter, apply_numeric_filter, build_report, classify_columns,
    column_profile, correlate, describe, load_csv, missing_report, ColumnKind, DashboardState,
    LoadOptions, PipelineError, ReportOptions, Value,
};

use common::{write_csv, MONITORING_CSV};

#[test]
fn test_load_missing_file_halts() {
    let err = load_csv(Path::new("no/such/monitoringdata.csv"), &LoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_worked_example() -> Result<()> {
    let file = write_csv(MONITORING_CSV);
    let table = load_csv(file.path(), &LoadOptions::default())?;
    assert_eq!(table.len(), 4);

    let (numeric, categorical) = classify_columns(&table);
    assert_eq!(numeric, vec!["temperature_c", "heart_rate_bpm", "birth_weight_kg"]);
    assert_eq!(categorical, vec!["baby_id"]);

    let by_temp = apply_numeric_filter(&table, "temperature_c", 36.5, 37.0)?;
    assert_eq!(by_temp, table.take(&[0, 1]));

    let allowed: BTreeSet<Value> = [Value::Text("A".into())].into();
    let by_baby = apply_categorical_filter(&table, "baby_id", &allowed)?;
    assert_eq!(by_baby, table.take(&[0, 2]));

    let missing = missing_report(&table);
    let temp = missing
        .entries
        .iter()
        .find(|e| e.column == "temperature_c")
        .unwrap();
    assert_eq!(temp.missing, 1);
    assert!((temp.percentage - 25.0).abs() < 1e-9);
    for entry in &missing.entries {
        assert!(entry.percentage <= 100.0);
        if entry.missing == 0 {
            assert_eq!(entry.percentage, 0.0);
        }
    }

    let stats = describe(&table);
    let temp = &stats[0];
    assert_eq!(temp.count, 3);
    assert!((temp.mean.unwrap() - 37.2333).abs() < 1e-3);
    assert!((temp.std.unwrap() - 0.8737).abs() < 1e-3);
    assert_eq!(temp.min, Some(36.5));
    assert_eq!(temp.max, Some(38.2));
    Ok(())
}

#[test]
fn test_filters_are_idempotent_and_keep_order() -> Result<()> {
    let file = write_csv(MONITORING_CSV);
    let table = load_csv(file.path(), &LoadOptions::default())?;

    let once = apply_numeric_filter(&table, "heart_rate_bpm", 135.0, 170.0)?;
    let twice = apply_numeric_filter(&once, "heart_rate_bpm", 135.0, 170.0)?;
    assert_eq!(once, twice);
    assert_eq!(once, table.take(&[1, 2, 3]));

    assert!(apply_numeric_filter(&table, "heart_rate_bpm", 170.0, 135.0)?.is_empty());
    assert!(apply_categorical_filter(&table, "baby_id", &BTreeSet::new())?.is_empty());
    Ok(())
}

#[test]
fn test_profile_and_correlation() -> Result<()> {
    let file = write_csv(MONITORING_CSV);
    let table = load_csv(file.path(), &LoadOptions::default())?;

    let profile = column_profile(&table);
    assert_eq!(profile[0].kind, ColumnKind::Float);
    assert_eq!(profile[0].non_missing, 3);
    assert_eq!(profile[1].kind, ColumnKind::Text);
    assert_eq!(profile[1].distinct, 2);
    assert_eq!(profile[2].kind, ColumnKind::Integer);

    let (numeric, _) = classify_columns(&table);
    let matrix = correlate(&table, &numeric);
    assert_eq!(matrix.len(), 3);
    for i in 0..matrix.len() {
        assert_eq!(matrix.correlations[i][i], Some(1.0));
        for j in 0..matrix.len() {
            assert_eq!(matrix.correlations[i][j], matrix.correlations[j][i]);
        }
    }
    assert_eq!(matrix.sample_sizes[0][1], 3);
    Ok(())
}

#[test]
fn test_session_report_end_to_end() -> Result<()> {
    let file = write_csv(MONITORING_CSV);
    let table = load_csv(file.path(), &LoadOptions::default())?;

    let mut state = DashboardState::new(table);
    state.set_range("temperature_c", 36.0, 37.5)?;
    state.set_members("baby_id", [Value::Text("A".into())].into())?;
    assert_eq!(state.visible_indices(), &[0]);

    let report = build_report(&state, &ReportOptions::default());
    assert_eq!(report.info.total_records, 4);
    assert_eq!(report.info.visible_records, 1);
    assert_eq!(report.info.filters.len(), 2);
    let related: Vec<&str> = report.related.iter().map(|r| r.column.as_str()).collect();
    assert_eq!(related, vec!["baby_id", "birth_weight_kg"]);
    assert!(report.correlation.is_some());

    let json = serde_json::to_string(&report)?;
    assert!(json.contains("\"visible_records\":1"));
    Ok(())
}
