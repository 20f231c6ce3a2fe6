use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

/// Write a synthetic monitoring export for trying out the dashboard.
#[derive(Debug, Parser)]
struct Args {
    /// Output CSV path
    #[arg(default_value = "monitoringdata.csv")]
    path: PathBuf,

    /// Readings per baby
    #[arg(long, default_value_t = 48)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// One monitoring reading. `None` fields are written as empty cells.
#[derive(Debug, Serialize)]
struct Reading {
    record_id: u64,
    baby_id: String,
    birth_weight_kg: f64,
    timestamp: String,
    temperature_c: Option<f64>,
    heart_rate_bpm: Option<i64>,
    spo2_pct: Option<f64>,
    alarm: &'static str,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// `Some(value)` except for a `rate` fraction of draws.
    fn maybe<T>(&mut self, rate: f64, value: T) -> Option<T> {
        (self.next_f64() >= rate).then_some(value)
    }
}

fn round(v: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (v * scale).round() / scale
}

fn alarm_for(temperature: f64, heart_rate: i64, spo2: f64) -> &'static str {
    if temperature > 37.8 || heart_rate > 170 {
        "high"
    } else if temperature < 36.2 || spo2 < 92.0 {
        "low"
    } else {
        "none"
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    // (id, birth weight in kg, baseline temperature)
    let babies = [
        ("BABY_001", 3.4, 36.8),
        ("BABY_002", 2.9, 36.9),
        ("BABY_003", 3.8, 37.1),
        ("BABY_004", 2.4, 36.6),
    ];

    let mut writer = csv::Writer::from_path(&args.path)
        .with_context(|| format!("creating {}", args.path.display()))?;

    let mut record_id = 0u64;
    for &(baby_id, weight, base_temp) in &babies {
        for reading in 0..args.rows {
            let temperature = rng.gauss(base_temp, 0.35);
            let heart_rate = rng.gauss(140.0, 14.0).round() as i64;
            let spo2 = rng.gauss(96.5, 1.8).min(100.0);

            let row = Reading {
                record_id,
                baby_id: baby_id.to_string(),
                birth_weight_kg: weight,
                timestamp: format!(
                    "2024-03-{:02}T{:02}:00:00",
                    1 + reading / 24,
                    reading % 24
                ),
                temperature_c: rng.maybe(0.05, round(temperature, 1)),
                heart_rate_bpm: rng.maybe(0.03, heart_rate),
                spo2_pct: rng.maybe(0.08, round(spo2, 1)),
                alarm: alarm_for(temperature, heart_rate, spo2),
            };
            writer
                .serialize(&row)
                .with_context(|| format!("writing record {record_id}"))?;
            record_id += 1;
        }
    }
    writer.flush().context("flushing CSV")?;

    log::info!("Wrote {record_id} readings to {}", args.path.display());
    println!(
        "Wrote {record_id} readings for {} babies to {}",
        babies.len(),
        args.path.display()
    );
    Ok(())
}
