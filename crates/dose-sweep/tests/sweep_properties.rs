mod common;

use common::{scenario, stub_engine, write_scenario, FORECAST_POINTS};
use dose_sweep::{run_scenario, simulate, SweepConfig, SweepError};
use loop_core::{round2, time_axis, to_cents, EngineError, EngineOutput, ScenarioState};
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn sweep_is_deterministic() {
    let engine = stub_engine(4.5);
    let state = scenario(30.0, 10.0);
    let config = SweepConfig::default();

    let first = simulate(&engine, &state, &config).unwrap();
    let second = simulate(&engine, &state, &config).unwrap();

    assert_eq!(
        serde_json::to_vec(&first.sweep).unwrap(),
        serde_json::to_vec(&second.sweep).unwrap()
    );
}

#[test]
fn every_label_shares_the_baseline_axis() {
    let engine = stub_engine(4.5);
    let simulation = simulate(&engine, &scenario(30.0, 10.0), &SweepConfig::default()).unwrap();

    let n = simulation.baseline.len();
    assert_eq!(n, FORECAST_POINTS);
    assert!(simulation.sweep.has_uniform_axes(n));
    for label in simulation.sweep.labels() {
        let times: Vec<u32> = simulation
            .sweep
            .rows()
            .iter()
            .filter(|row| to_cents(row.dose_label) == to_cents(label))
            .map(|row| row.time)
            .collect();
        assert_eq!(times, time_axis(n));
    }
    assert_eq!(simulation.sweep.len(), n * simulation.plan.len());
}

#[test]
fn sweep_covers_recommended_and_carb_only_doses() {
    for (recommended, carbs, ratio) in [(4.5, 30.0, 10.0), (1.0, 45.0, 12.0), (4.53, 20.0, 8.0)] {
        let engine = stub_engine(recommended);
        let simulation = simulate(&engine, &scenario(carbs, ratio), &SweepConfig::default()).unwrap();
        let labels = simulation.sweep.labels();

        let near = |target: f64| labels.iter().any(|l| (l - round2(target)).abs() <= 0.05 + 1e-9);
        assert!(near(simulation.recommended_dose()), "recommended {recommended}");
        assert!(near(simulation.insulin_for_carbs()), "carbs {carbs}/{ratio}");
        assert_eq!(labels.first(), Some(&0.0));
        assert!(labels.windows(2).all(|w| to_cents(w[1]) - to_cents(w[0]) == 5));
    }
}

#[test]
fn carb_math_splits_the_recommendation() {
    let engine = stub_engine(4.5);
    let simulation = simulate(&engine, &scenario(30.0, 10.0), &SweepConfig::default()).unwrap();
    assert_eq!(simulation.insulin_for_carbs(), 3.0);
    assert_eq!(simulation.insulin_as_correction(), 1.5);
    assert_eq!(simulation.recommended_dose(), 4.5);
}

#[test]
fn zero_carb_ratio_is_rejected() {
    let engine = stub_engine(4.5);
    let err = simulate(&engine, &scenario(30.0, 0.0), &SweepConfig::default()).unwrap_err();
    match err {
        SweepError::MalformedScenario(inner) => assert_eq!(inner.field(), "carb_ratio_values"),
        other => panic!("expected malformed scenario, got {other}"),
    }
}

#[test]
fn failing_candidate_aborts_the_whole_sweep() {
    // rec 0.4 and 4 g / 10 -> sweep bound 0.50 -> ten candidates 0.00..0.45
    let calls = AtomicUsize::new(0);
    let engine = |state: &ScenarioState| -> Result<EngineOutput, EngineError> {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        // call 0 is the baseline; call 5 is the fifth candidate
        if call == 5 {
            return Err(EngineError::Rejected("solver diverged".into()));
        }
        Ok(EngineOutput::new(vec![120.0; 10], 0.4, state.clone()))
    };

    let result = simulate(&engine, &scenario(4.0, 10.0), &SweepConfig::default());
    let err = result.unwrap_err();
    assert!(err.is_engine_failure());
    match err {
        SweepError::ForecastEngineFailure { dose, .. } => assert_eq!(dose, Some(0.2)),
        other => panic!("unexpected {other}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[test]
fn ten_candidates_for_a_half_unit_bound() {
    let engine = |state: &ScenarioState| -> Result<EngineOutput, EngineError> {
        Ok(EngineOutput::new(vec![120.0; 10], 0.4, state.clone()))
    };
    let simulation = simulate(&engine, &scenario(4.0, 10.0), &SweepConfig::default()).unwrap();
    assert_eq!(simulation.plan.len(), 10);
    assert_eq!(simulation.sweep.labels().last(), Some(&0.45));
}

#[test]
fn parallel_dispatch_matches_sequential() {
    let engine = stub_engine(4.5);
    let state = scenario(30.0, 10.0);
    let sequential = simulate(&engine, &state, &SweepConfig::default()).unwrap();
    let parallel_config = SweepConfig {
        parallel: true,
        ..SweepConfig::default()
    };
    let parallel = simulate(&engine, &state, &parallel_config).unwrap();
    assert_eq!(sequential.sweep, parallel.sweep);
}

#[test]
fn parallel_failure_still_aborts() {
    let engine = |state: &ScenarioState| -> Result<EngineOutput, EngineError> {
        if to_cents(state.dose_values[0]) == 20 {
            return Err(EngineError::Rejected("solver diverged".into()));
        }
        Ok(EngineOutput::new(vec![120.0; 10], 0.4, state.clone()))
    };
    let config = SweepConfig {
        parallel: true,
        ..SweepConfig::default()
    };
    let err = simulate(&engine, &scenario(4.0, 10.0), &config).unwrap_err();
    assert!(err.is_engine_failure());
}

#[test]
fn run_scenario_loads_sweeps_and_assembles() {
    let path = write_scenario("dosing-threshold-example-1", &scenario(30.0, 10.0));
    let engine = stub_engine(4.5);

    let report = run_scenario(&path, &engine, &SweepConfig::default()).unwrap();

    assert_eq!(report.scenario, "dosing-threshold-example-1");
    assert_eq!(report.guides.safety_curve.correction_mid, 125);
    assert_eq!(report.guides.correction_band.time.len(), FORECAST_POINTS);
    let recommended = report.highlights.recommended.as_ref().expect("rec trace");
    assert_eq!(
        Some(recommended.forecast.clone()),
        report.simulation.sweep.forecast_for(4.5)
    );
    assert_eq!(report.highlights.overdose.as_ref().map(|t| t.dose), Some(4.55));
    assert_eq!(report.hints.y_range[0], 40.0);

    let encoded = serde_json::to_string(&report).unwrap();
    assert!(encoded.contains("\"dose_label\":4.55"));
}

#[test]
fn missing_scenario_file_is_an_io_error() {
    let engine = stub_engine(4.5);
    let err = run_scenario(
        std::path::Path::new("/nonexistent/scenario.json"),
        &engine,
        &SweepConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SweepError::Io { .. }));
}
