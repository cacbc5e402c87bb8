use crate::rounding::{round2, to_cents};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Forecast cadence in minutes.
pub const FORECAST_STEP_MINUTES: u32 = 5;

pub fn time_axis(len: usize) -> Vec<u32> {
    (0..len as u32).map(|i| i * FORECAST_STEP_MINUTES).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TidyForecastRow {
    pub time: u32,
    pub forecast: f64,
    pub dose_label: f64,
}

/// Long-format table: one row per (time, dose_label), grouped by ascending
/// dose label. Every label owns the same contiguous time axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SweepTable {
    rows: Vec<TidyForecastRow>,
}

impl SweepTable {
    /// Builds the table from per-candidate series. Series are reordered by
    /// label so callers may hand them over in completion order. The caller
    /// guarantees every series has the same length.
    pub fn from_series(mut series: Vec<(f64, Vec<f64>)>) -> Self {
        series.sort_by_key(|(label, _)| to_cents(*label));
        let rows = series
            .into_iter()
            .flat_map(|(label, forecast)| {
                let dose_label = round2(label);
                forecast
                    .into_iter()
                    .enumerate()
                    .map(move |(i, forecast)| TidyForecastRow {
                        time: i as u32 * FORECAST_STEP_MINUTES,
                        forecast,
                        dose_label,
                    })
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[TidyForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn labels(&self) -> Vec<f64> {
        let mut labels: Vec<f64> = Vec::new();
        for row in &self.rows {
            if labels.last().map(|l| to_cents(*l)) != Some(to_cents(row.dose_label)) {
                labels.push(row.dose_label);
            }
        }
        labels
    }

    /// Forecast for `dose`, matched after rounding both sides to 2 decimals.
    pub fn forecast_for(&self, dose: f64) -> Option<Vec<f64>> {
        let wanted = to_cents(dose);
        let series: Vec<f64> = self
            .rows
            .iter()
            .filter(|row| to_cents(row.dose_label) == wanted)
            .map(|row| row.forecast)
            .collect();
        (!series.is_empty()).then_some(series)
    }

    pub fn max_forecast(&self) -> Option<f64> {
        self.rows.iter().map(|row| row.forecast).reduce(f64::max)
    }

    /// True when every label carries exactly `0, 5, .., 5(n-1)`.
    pub fn has_uniform_axes(&self, n: usize) -> bool {
        let expected = time_axis(n);
        let mut by_label: BTreeMap<i64, Vec<u32>> = BTreeMap::new();
        for row in &self.rows {
            by_label
                .entry(to_cents(row.dose_label))
                .or_default()
                .push(row.time);
        }
        by_label.values().all(|times| *times == expected)
    }
}
