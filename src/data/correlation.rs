use serde::Serialize;

use super::model::{Column, Table};

/// Square Pearson matrix over numeric columns.
///
/// A coefficient is `None` when the pair has fewer than two complete
/// observations or one side is constant over them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub correlations: Vec<Vec<Option<f64>>>,
    /// Number of rows where both columns are present.
    pub sample_sizes: Vec<Vec<usize>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.correlations[i][j]
    }
}

/// Pairwise-complete Pearson correlation between the named columns.
/// Names that are unknown or not numeric are skipped.
pub fn correlate<S: AsRef<str>>(table: &Table, columns: &[S]) -> CorrelationMatrix {
    let selected: Vec<&Column> = columns
        .iter()
        .filter_map(|name| table.column(name.as_ref()))
        .filter(|c| c.kind().is_numeric())
        .collect();
    if selected.len() < columns.len() {
        log::debug!(
            "Correlation skipped {} non-numeric or unknown column(s)",
            columns.len() - selected.len()
        );
    }

    let n = selected.len();
    let mut correlations = vec![vec![None; n]; n];
    let mut sample_sizes = vec![vec![0; n]; n];

    for i in 0..n {
        for j in i..n {
            let (r, size) = pearson(selected[i], selected[j]);
            let r = if i == j { r.map(|_| 1.0) } else { r };
            correlations[i][j] = r;
            correlations[j][i] = r;
            sample_sizes[i][j] = size;
            sample_sizes[j][i] = size;
        }
    }

    CorrelationMatrix {
        columns: selected.iter().map(|c| c.name.clone()).collect(),
        correlations,
        sample_sizes,
    }
}

fn pearson(a: &Column, b: &Column) -> (Option<f64>, usize) {
    let pairs: Vec<(f64, f64)> = a
        .values()
        .iter()
        .zip(b.values())
        .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return (None, n);
    }

    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return (None, n);
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    (Some(r.clamp(-1.0, 1.0)), n)
}
