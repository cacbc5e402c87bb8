#![allow(dead_code)]

use loop_core::{EngineError, EngineOutput, ScenarioState};
use serde_json::json;
use std::path::PathBuf;

pub const FORECAST_POINTS: usize = 73;

/// 30 g of carbs at a 1:10 ratio, one current dose of 0 U.
pub fn scenario(carbs: f64, carb_ratio: f64) -> ScenarioState {
    let mut state = ScenarioState {
        carb_dates: vec!["2020-05-09T12:00:00".into()],
        carb_values: vec![carbs],
        carb_absorption_times: vec![180.0],
        carb_ratio_start_times: vec!["00:00:00".into()],
        carb_ratio_values: vec![carb_ratio],
        dose_types: vec!["bolus".into(), "basal".into()],
        dose_start_times: vec!["2020-05-09T12:00:00".into(), "2020-05-09T11:00:00".into()],
        dose_end_times: vec!["2020-05-09T12:00:00".into(), "2020-05-09T11:30:00".into()],
        dose_values: vec![0.0, 0.8],
        glucose_dates: vec!["2020-05-09T11:55:00".into(), "2020-05-09T12:00:00".into()],
        glucose_values: vec![150.0, 155.0],
        target_range_start_times: vec!["00:00:00".into()],
        target_range_end_times: vec!["00:00:00".into()],
        target_range_minimum_values: vec![70.0],
        target_range_maximum_values: vec![180.0],
        ..ScenarioState::default()
    };
    state.settings.insert("suspend_threshold".into(), json!(70));
    state
}

/// Deterministic linear forecaster: carbs push glucose up, the current dose
/// pulls it down.
pub fn linear_forecast(state: &ScenarioState, len: usize) -> Vec<f64> {
    let dose = state.dose_values.first().copied().unwrap_or(0.0);
    let carbs = state.carb_values.first().copied().unwrap_or(0.0);
    let start = state.glucose_values.last().copied().unwrap_or(120.0);
    (0..len)
        .map(|i| start + (carbs * 0.05 - dose * 0.4) * i as f64)
        .collect()
}

pub fn stub_engine(
    recommended: f64,
) -> impl Fn(&ScenarioState) -> Result<EngineOutput, EngineError> + Send + Sync {
    move |state: &ScenarioState| {
        Ok(EngineOutput::new(
            linear_forecast(state, FORECAST_POINTS),
            recommended,
            state.clone(),
        ))
    }
}

/// Writes `state` to a fresh file under the system temp dir.
pub fn write_scenario(name: &str, state: &ScenarioState) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dose-sweep-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(format!("{name}.json"));
    std::fs::write(&path, serde_json::to_vec_pretty(state).expect("encode")).expect("write");
    path
}
