use serde::{Deserialize, Serialize};

/// Horizon of the dosing-safety curve, one point per minute.
pub const SAFETY_CURVE_MINUTES: usize = 370;
/// Points held flat at the suspend threshold before the ramp starts.
pub const SAFETY_CURVE_FLAT_POINTS: usize = 185;

/// Two-phase guide: flat at the suspend threshold, then a straight ramp to the
/// correction-range midpoint. Drawn at 1-minute resolution; it is not a
/// resampled forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyCurve {
    pub suspend_threshold: f64,
    pub correction_mid: i64,
    pub time: Vec<u32>,
    pub threshold: Vec<f64>,
}

impl SafetyCurve {
    pub fn new(suspend_threshold: f64, correction_mid: i64) -> Self {
        let ramp_points = SAFETY_CURVE_MINUTES - SAFETY_CURVE_FLAT_POINTS;
        let mut threshold = vec![suspend_threshold; SAFETY_CURVE_FLAT_POINTS];
        threshold.extend(linspace(suspend_threshold, correction_mid as f64, ramp_points));
        Self {
            suspend_threshold,
            correction_mid,
            time: (0..SAFETY_CURVE_MINUTES as u32).collect(),
            threshold,
        }
    }

    pub fn len(&self) -> usize {
        self.threshold.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threshold.is_empty()
    }
}

/// `n` evenly spaced values from `start` to `stop`, both included. The last
/// value is exactly `stop`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            values[n - 1] = stop;
            values
        }
    }
}
