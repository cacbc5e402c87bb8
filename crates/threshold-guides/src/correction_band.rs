use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionBand {
    pub target_min: i64,
    pub target_max: i64,
    pub time: Vec<u32>,
    pub label: String,
}

impl CorrectionBand {
    pub fn new(target_min: i64, target_max: i64, time: Vec<u32>) -> Self {
        Self {
            target_min,
            target_max,
            time,
            label: format!("Correction Range = {target_min}-{target_max} mg/dL"),
        }
    }

    pub fn lower(&self) -> Vec<f64> {
        vec![self.target_min as f64; self.time.len()]
    }

    pub fn upper(&self) -> Vec<f64> {
        vec![self.target_max as f64; self.time.len()]
    }

    pub fn midpoint(&self) -> i64 {
        loop_core::round_to_int((self.target_min + self.target_max) as f64 / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspendLine {
    pub suspend_threshold: f64,
    pub time: Vec<u32>,
    pub label: String,
}

impl SuspendLine {
    pub fn new(suspend_threshold: f64, time: Vec<u32>) -> Self {
        Self {
            suspend_threshold,
            time,
            label: format!("Suspend Threshold = {suspend_threshold} mg/dL"),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        vec![self.suspend_threshold; self.time.len()]
    }
}
