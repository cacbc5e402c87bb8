use crate::{encode_text, InstrumentedEngine, SweepMetrics};
use dose_sweep::{simulate, SweepConfig};
use loop_core::{EngineError, EngineOutput, ScenarioState};
use prometheus::Registry;
use serde_json::json;

fn dummy_state(carb_ratio: f64) -> ScenarioState {
    let mut state = ScenarioState {
        carb_values: vec![2.0],
        carb_ratio_values: vec![carb_ratio],
        dose_values: vec![0.0],
        glucose_values: vec![140.0],
        target_range_minimum_values: vec![100.0],
        target_range_maximum_values: vec![110.0],
        ..ScenarioState::default()
    };
    state.settings.insert("suspend_threshold".into(), json!(75));
    state
}

fn engine(state: &ScenarioState) -> Result<EngineOutput, EngineError> {
    if state.dose_values[0] > 0.12 {
        return Err(EngineError::Timeout { after_ms: 50 });
    }
    Ok(EngineOutput::new(vec![140.0, 138.0, 136.0], 0.1, state.clone()))
}

#[test]
fn aborted_sweep_counts_every_call() {
    let registry = Registry::new();
    let metrics = SweepMetrics::new(&registry).unwrap();
    let instrumented = InstrumentedEngine::new(engine, &metrics);

    // rec 0.1, carbs 2/10 -> bound 0.25 -> 0.00..0.20; the 0.15 candidate times out
    let result = simulate(&instrumented, &dummy_state(10.0), &SweepConfig::default());
    metrics.observe_sweep(&result);
    assert!(result.is_err());

    let ok = metrics.forecast_calls_total.with_label_values(&["ok"]).get();
    let timeouts = metrics.forecast_calls_total.with_label_values(&["timeout"]).get();
    assert_eq!(ok, 4);
    assert_eq!(timeouts, 1);
    assert_eq!(metrics.forecast_call_seconds.get_sample_count(), 5);
    assert_eq!(metrics.sweeps_total.with_label_values(&["engine_failure"]).get(), 1);
}

#[test]
fn malformed_scenarios_are_labelled() {
    let registry = Registry::new();
    let metrics = SweepMetrics::new(&registry).unwrap();
    let instrumented = InstrumentedEngine::new(engine, &metrics);

    let result = simulate(&instrumented, &dummy_state(0.0), &SweepConfig::default());
    metrics.observe_sweep(&result);

    assert_eq!(
        metrics.sweeps_total.with_label_values(&["malformed_scenario"]).get(),
        1
    );
    let text = encode_text(&registry).unwrap();
    assert!(text.contains("sweeps_total{outcome=\"malformed_scenario\"} 1"));
    assert!(text.contains("forecast_calls_total{outcome=\"ok\"} 1"));
}

#[test]
fn double_registration_is_an_error() {
    let registry = Registry::new();
    let _first = SweepMetrics::new(&registry).unwrap();
    assert!(SweepMetrics::new(&registry).is_err());
}
