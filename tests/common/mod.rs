use std::io::Write;

use tempfile::NamedTempFile;

/// The worked example: four readings, one missing temperature.
pub const MONITORING_CSV: &str = "\
temperature_c,baby_id,heart_rate_bpm,birth_weight_kg
36.5,A,130,3.1
37.0,B,142,2.8
38.2,A,165,3.1
,B,151,2.8
";

pub fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
