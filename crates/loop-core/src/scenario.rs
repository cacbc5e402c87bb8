use crate::error::ScenarioError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Structured dosing state handed to the forecast engine.
///
/// Timestamps are carried as the engine formats them; nothing here interprets
/// them. `dose_values[0]` is the dose under test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioState {
    pub basal_rate_start_times: Vec<String>,
    pub basal_rate_minutes: Vec<f64>,
    pub basal_rate_values: Vec<f64>,

    pub carb_dates: Vec<String>,
    pub carb_values: Vec<f64>,
    pub carb_absorption_times: Vec<f64>,

    pub carb_ratio_start_times: Vec<String>,
    pub carb_ratio_values: Vec<f64>,

    pub dose_types: Vec<String>,
    pub dose_start_times: Vec<String>,
    pub dose_end_times: Vec<String>,
    pub dose_values: Vec<f64>,

    pub glucose_dates: Vec<String>,
    pub glucose_values: Vec<f64>,

    pub last_temporary_basal: Vec<Value>,
    pub offset_applied_to_dates: Option<f64>,
    pub time_to_calculate_at: Option<String>,

    pub sensitivity_ratio_start_times: Vec<String>,
    pub sensitivity_ratio_end_times: Vec<String>,
    pub sensitivity_ratio_values: Vec<f64>,

    pub settings: BTreeMap<String, Value>,

    pub target_range_start_times: Vec<String>,
    pub target_range_end_times: Vec<String>,
    pub target_range_minimum_values: Vec<f64>,
    pub target_range_maximum_values: Vec<f64>,
}

impl ScenarioState {
    pub fn current_dose(&self) -> Result<f64, ScenarioError> {
        SchedulePolicy::FirstValueOnly.resolve("dose_values", &self.dose_values)
    }

    /// A fully independent copy with `dose_values[0]` replaced.
    pub fn with_current_dose(&self, dose: f64) -> Result<ScenarioState, ScenarioError> {
        if !dose.is_finite() {
            return Err(ScenarioError::invalid("dose_values", "candidate dose is not finite"));
        }
        let mut next = self.clone();
        match next.dose_values.first_mut() {
            Some(slot) => *slot = dose,
            None => return Err(ScenarioError::missing("dose_values")),
        }
        Ok(next)
    }

    pub fn setting_number(&self, key: &str) -> Result<f64, ScenarioError> {
        setting_number(&self.settings, key)
    }
}

pub(crate) fn setting_number(
    settings: &BTreeMap<String, Value>,
    key: &str,
) -> Result<f64, ScenarioError> {
    let field = format!("settings.{key}");
    match settings.get(key) {
        None | Some(Value::Null) => Err(ScenarioError::MissingField(field)),
        Some(value) => value
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or(ScenarioError::NonNumeric { field }),
    }
}

/// How a schedule-shaped field collapses to the single value the sweep uses.
///
/// Only `FirstValueOnly` exists: time-varying schedules (several target-range
/// or suspend-threshold segments) are not resolved against the time of the
/// forecast. Every caller names the policy so the limitation stays visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulePolicy {
    #[default]
    FirstValueOnly,
}

impl SchedulePolicy {
    pub fn resolve(self, field: &str, values: &[f64]) -> Result<f64, ScenarioError> {
        match self {
            Self::FirstValueOnly => {
                let first = *values.first().ok_or_else(|| ScenarioError::missing(field))?;
                if !first.is_finite() {
                    return Err(ScenarioError::NonNumeric {
                        field: field.to_string(),
                    });
                }
                Ok(first)
            }
        }
    }
}
