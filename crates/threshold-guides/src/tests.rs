use crate::{derive, linspace, SafetyCurve, SAFETY_CURVE_FLAT_POINTS, SAFETY_CURVE_MINUTES};
use loop_core::{ScenarioError, Settings, TargetRange};
use rand::Rng;
use serde_json::json;

fn settings_with(suspend_threshold: serde_json::Value) -> Settings {
    let mut settings = Settings::default();
    settings.0.insert("suspend_threshold".into(), suspend_threshold);
    settings
}

fn target(min: f64, max: f64) -> TargetRange {
    TargetRange {
        start_times: vec!["00:00:00".into()],
        end_times: vec!["00:00:00".into()],
        minimum_values: vec![min],
        maximum_values: vec![max],
    }
}

#[test]
fn safety_curve_is_flat_then_ramps_to_the_midpoint() {
    let guides = derive(&settings_with(json!(70)), &target(70.0, 180.0), 73).unwrap();
    let curve = &guides.safety_curve;

    assert_eq!(curve.correction_mid, 125);
    assert_eq!(curve.len(), SAFETY_CURVE_MINUTES);
    assert_eq!(curve.time.first(), Some(&0));
    assert_eq!(curve.time.last(), Some(&369));
    assert!(curve.threshold[..SAFETY_CURVE_FLAT_POINTS]
        .iter()
        .all(|v| *v == 70.0));

    let ramp = &curve.threshold[SAFETY_CURVE_FLAT_POINTS..];
    assert_eq!(ramp.len(), 185);
    assert_eq!(ramp[0], 70.0);
    assert!(ramp.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(curve.threshold[369], 125.0);
}

#[test]
fn band_and_suspend_line_follow_the_forecast_axis() {
    let guides = derive(&settings_with(json!(75.0)), &target(100.0, 115.0), 4).unwrap();

    assert_eq!(guides.correction_band.time, vec![0, 5, 10, 15]);
    assert_eq!(guides.correction_band.lower(), vec![100.0; 4]);
    assert_eq!(guides.correction_band.upper(), vec![115.0; 4]);
    assert_eq!(guides.correction_band.label, "Correction Range = 100-115 mg/dL");
    assert_eq!(guides.suspend_line.values(), vec![75.0; 4]);
    assert_eq!(guides.suspend_line.label, "Suspend Threshold = 75 mg/dL");
    // 107.5 rounds half away from zero
    assert_eq!(guides.safety_curve.correction_mid, 108);
}

#[test]
fn missing_suspend_threshold_is_malformed() {
    let err = derive(&Settings::default(), &target(70.0, 180.0), 10).unwrap_err();
    assert!(matches!(err, ScenarioError::MissingField(_)));
    assert_eq!(err.field(), "settings.suspend_threshold");

    let err = derive(&settings_with(json!("low")), &target(70.0, 180.0), 10).unwrap_err();
    assert!(matches!(err, ScenarioError::NonNumeric { .. }));
}

#[test]
fn empty_target_range_is_malformed() {
    let err = derive(&settings_with(json!(70)), &TargetRange::default(), 10).unwrap_err();
    assert_eq!(err.field(), "target_range_minimum_values");
}

#[test]
fn ramp_endpoints_hold_for_random_settings() {
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let suspend = rng.gen_range(55.0..90.0_f64).round();
        let mid = rng.gen_range(90..160_i64);
        let curve = SafetyCurve::new(suspend, mid);
        assert_eq!(curve.threshold[SAFETY_CURVE_FLAT_POINTS - 1], suspend);
        assert_eq!(curve.threshold[SAFETY_CURVE_FLAT_POINTS], suspend);
        assert_eq!(curve.threshold[SAFETY_CURVE_MINUTES - 1], mid as f64);
        assert!(curve.threshold.windows(2).all(|w| w[1] >= w[0]));
    }
}

#[test]
fn linspace_edges() {
    assert!(linspace(1.0, 2.0, 0).is_empty());
    assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
    assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
}
