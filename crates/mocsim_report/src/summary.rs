//! Per-variable statistical summaries and the rendered report.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Summary statistics for one recorded variable's values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population variance.
    pub variance: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Most frequent value (first seen wins a tie).
    pub mode: f64,
    /// First quartile (nearest rank).
    pub q1: f64,
    /// Median (nearest rank).
    pub median: f64,
    /// Third quartile (nearest rank).
    pub q3: f64,
    /// Interquartile range.
    pub iqr: f64,
}

/// One recorded variable's name paired with its summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSummary {
    /// Variable name.
    pub name: String,
    /// Its summary statistics.
    pub summary: Summary,
}

/// The full aggregation report, one section per recorded variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// How many rows were aggregated.
    pub row_count: usize,
    /// Per-variable sections, in recorded-variable declaration order.
    pub variables: Vec<VariableSummary>,
}

impl Summary {
    /// Computes summary statistics over a set of values.
    ///
    /// Returns `None` for an empty slice. Quartiles use the nearest-rank
    /// indices of the sorted values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values
            .iter()
            .map(|value| (value - mean) * (value - mean))
            .sum::<f64>()
            / count;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let q1 = sorted[values.len() / 4];
        let median = sorted[values.len() / 2];
        let q3 = sorted[(values.len() * 3) / 4];

        Some(Self {
            mean,
            variance,
            std_dev: variance.sqrt(),
            mode: mode_of(values),
            q1,
            median,
            q3,
            iqr: q3 - q1,
        })
    }
}

/// Most frequent value; the earliest-seen value wins a tie.
///
/// Values are compared by bit pattern, as exact repeats are what a mode
/// over simulation output means (the inputs are integer-valued draws and
/// arithmetic over them).
fn mode_of(values: &[f64]) -> f64 {
    let mut counts: HashMap<u64, (usize, usize)> = HashMap::new();
    for (index, value) in values.iter().enumerate() {
        let entry = counts.entry(value.to_bits()).or_insert((0, index));
        entry.0 += 1;
    }

    let (bits, _) = counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .unwrap_or((0, (0, 0)));

    f64::from_bits(bits)
}

impl Report {
    /// Aggregates collected rows into per-variable summaries.
    ///
    /// `names` is the recorded-variable order; each row must carry one
    /// value per name, in that order. Rows are transposed into columns
    /// and each column summarized independently.
    pub fn from_rows(names: &[&str], rows: &[Vec<f64>]) -> Self {
        let variables = names
            .iter()
            .enumerate()
            .filter_map(|(column, name)| {
                let values: Vec<f64> = rows
                    .iter()
                    .filter_map(|row| row.get(column).copied())
                    .collect();
                Summary::from_values(&values).map(|summary| VariableSummary {
                    name: (*name).to_string(),
                    summary,
                })
            })
            .collect();

        Self {
            row_count: rows.len(),
            variables,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Collected {} result rows", self.row_count)?;

        for variable in &self.variables {
            let s = &variable.summary;
            writeln!(f)?;
            writeln!(f, "{}:", variable.name)?;
            writeln!(f, "Mean\t\t{}", s.mean)?;
            writeln!(f, "Std Dev.\t{}", s.std_dev)?;
            writeln!(f, "Variance\t{}", s.variance)?;
            writeln!(f, "Mode\t\t{}", s.mode)?;
            writeln!(f, "Q1\t\t{}", s.q1)?;
            writeln!(f, "Median\t\t{}", s.median)?;
            writeln!(f, "Q3\t\t{}", s.q3)?;
            writeln!(f, "IQR\t\t{}", s.iqr)?;
        }

        Ok(())
    }
}
