use crate::error::SweepError;
use loop_core::to_cents;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Sweep knobs. Every field has a default so a partial JSON file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Increment between candidate doses, in units. Whole hundredths only.
    #[serde(default = "SweepConfig::default_dose_step")]
    pub dose_step: f64,
    /// Margin added above the recommended dose.
    #[serde(default = "SweepConfig::default_recommended_margin")]
    pub recommended_margin: f64,
    /// Margin added above the carb-only dose.
    #[serde(default = "SweepConfig::default_carb_margin")]
    pub carb_margin: f64,
    /// Dispatch candidate forecasts on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
    /// Per-call timeout. Only [`CommandEngine::with_config`] reads it; the
    /// sweep itself never interrupts a call, so closure and custom engines
    /// must bound their own calls.
    ///
    /// [`CommandEngine::with_config`]: crate::CommandEngine::with_config
    #[serde(default)]
    pub call_timeout_ms: Option<u64>,
    #[serde(default = "SweepConfig::default_max_candidates")]
    pub max_candidates: usize,
}

impl SweepConfig {
    fn default_dose_step() -> f64 {
        0.05
    }
    fn default_recommended_margin() -> f64 {
        0.10
    }
    fn default_carb_margin() -> f64 {
        0.05
    }
    fn default_max_candidates() -> usize {
        400
    }

    pub fn validate(&self) -> Result<(), SweepError> {
        let step_cents = to_cents(self.dose_step);
        if !self.dose_step.is_finite() || step_cents < 1 {
            return Err(SweepError::Config(format!(
                "dose_step must be at least 0.01, got {}",
                self.dose_step
            )));
        }
        if (self.dose_step * 100.0 - step_cents as f64).abs() > 1e-6 {
            return Err(SweepError::Config(format!(
                "dose_step must be a whole number of hundredths, got {}",
                self.dose_step
            )));
        }
        for (name, margin) in [
            ("recommended_margin", self.recommended_margin),
            ("carb_margin", self.carb_margin),
        ] {
            if !margin.is_finite() || margin < 0.0 {
                return Err(SweepError::Config(format!(
                    "{name} must be a non-negative number, got {margin}"
                )));
            }
        }
        if self.max_candidates == 0 {
            return Err(SweepError::Config("max_candidates must be positive".into()));
        }
        if self.call_timeout_ms == Some(0) {
            return Err(SweepError::Config("call_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            dose_step: Self::default_dose_step(),
            recommended_margin: Self::default_recommended_margin(),
            carb_margin: Self::default_carb_margin(),
            parallel: false,
            call_timeout_ms: None,
            max_candidates: Self::default_max_candidates(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<SweepConfig, SweepError> {
    let raw = fs::read_to_string(path).map_err(|source| SweepError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: SweepConfig = serde_json::from_str(&raw).map_err(|source| SweepError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}
