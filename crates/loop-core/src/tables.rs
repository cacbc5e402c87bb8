//! Named sub-tables decoded from a [`ScenarioState`].
//!
//! Decoding is lossless: [`ScenarioTables::encode`] rebuilds the exact state
//! that [`ScenarioTables::decode`] was given.

use crate::error::ScenarioError;
use crate::scenario::{setting_number, SchedulePolicy, ScenarioState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasalRates {
    pub start_times: Vec<String>,
    pub minutes: Vec<f64>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarbEvents {
    pub dates: Vec<String>,
    pub values: Vec<f64>,
    pub absorption_times: Vec<f64>,
}

impl CarbEvents {
    pub fn first_amount(&self, policy: SchedulePolicy) -> Result<f64, ScenarioError> {
        policy.resolve("carb_values", &self.values)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarbRatios {
    pub start_times: Vec<String>,
    pub values: Vec<f64>,
}

impl CarbRatios {
    pub fn first_ratio(&self, policy: SchedulePolicy) -> Result<f64, ScenarioError> {
        policy.resolve("carb_ratio_values", &self.values)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoseEvents {
    pub types: Vec<String>,
    pub start_times: Vec<String>,
    pub end_times: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BloodGlucose {
    pub dates: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LastTemporaryBasal(pub Vec<Value>);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Misc {
    pub offset_applied_to_dates: Option<f64>,
    pub time_to_calculate_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRatios {
    pub start_times: Vec<String>,
    pub end_times: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub BTreeMap<String, Value>);

impl Settings {
    pub fn number(&self, key: &str) -> Result<f64, ScenarioError> {
        setting_number(&self.0, key)
    }

    pub fn suspend_threshold(&self) -> Result<f64, ScenarioError> {
        self.number("suspend_threshold")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetRange {
    pub start_times: Vec<String>,
    pub end_times: Vec<String>,
    pub minimum_values: Vec<f64>,
    pub maximum_values: Vec<f64>,
}

impl TargetRange {
    /// `(min, max)` in whole mg/dL, truncated toward zero.
    pub fn first_pair(&self, policy: SchedulePolicy) -> Result<(i64, i64), ScenarioError> {
        let min = policy.resolve("target_range_minimum_values", &self.minimum_values)?;
        let max = policy.resolve("target_range_maximum_values", &self.maximum_values)?;
        let (min, max) = (min.trunc() as i64, max.trunc() as i64);
        if min > max {
            return Err(ScenarioError::invalid(
                "target_range_minimum_values",
                format!("minimum {min} exceeds maximum {max}"),
            ));
        }
        Ok((min, max))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTables {
    pub basal_rates: BasalRates,
    pub carb_events: CarbEvents,
    pub carb_ratios: CarbRatios,
    pub dose_events: DoseEvents,
    pub blood_glucose: BloodGlucose,
    pub last_temporary_basal: LastTemporaryBasal,
    pub misc: Misc,
    pub sensitivity_ratios: SensitivityRatios,
    pub settings: Settings,
    pub target_range: TargetRange,
}

impl ScenarioTables {
    pub fn decode(state: &ScenarioState) -> Self {
        let s = state.clone();
        Self {
            basal_rates: BasalRates {
                start_times: s.basal_rate_start_times,
                minutes: s.basal_rate_minutes,
                values: s.basal_rate_values,
            },
            carb_events: CarbEvents {
                dates: s.carb_dates,
                values: s.carb_values,
                absorption_times: s.carb_absorption_times,
            },
            carb_ratios: CarbRatios {
                start_times: s.carb_ratio_start_times,
                values: s.carb_ratio_values,
            },
            dose_events: DoseEvents {
                types: s.dose_types,
                start_times: s.dose_start_times,
                end_times: s.dose_end_times,
                values: s.dose_values,
            },
            blood_glucose: BloodGlucose {
                dates: s.glucose_dates,
                values: s.glucose_values,
            },
            last_temporary_basal: LastTemporaryBasal(s.last_temporary_basal),
            misc: Misc {
                offset_applied_to_dates: s.offset_applied_to_dates,
                time_to_calculate_at: s.time_to_calculate_at,
            },
            sensitivity_ratios: SensitivityRatios {
                start_times: s.sensitivity_ratio_start_times,
                end_times: s.sensitivity_ratio_end_times,
                values: s.sensitivity_ratio_values,
            },
            settings: Settings(s.settings),
            target_range: TargetRange {
                start_times: s.target_range_start_times,
                end_times: s.target_range_end_times,
                minimum_values: s.target_range_minimum_values,
                maximum_values: s.target_range_maximum_values,
            },
        }
    }

    pub fn encode(self) -> ScenarioState {
        ScenarioState {
            basal_rate_start_times: self.basal_rates.start_times,
            basal_rate_minutes: self.basal_rates.minutes,
            basal_rate_values: self.basal_rates.values,
            carb_dates: self.carb_events.dates,
            carb_values: self.carb_events.values,
            carb_absorption_times: self.carb_events.absorption_times,
            carb_ratio_start_times: self.carb_ratios.start_times,
            carb_ratio_values: self.carb_ratios.values,
            dose_types: self.dose_events.types,
            dose_start_times: self.dose_events.start_times,
            dose_end_times: self.dose_events.end_times,
            dose_values: self.dose_events.values,
            glucose_dates: self.blood_glucose.dates,
            glucose_values: self.blood_glucose.values,
            last_temporary_basal: self.last_temporary_basal.0,
            offset_applied_to_dates: self.misc.offset_applied_to_dates,
            time_to_calculate_at: self.misc.time_to_calculate_at,
            sensitivity_ratio_start_times: self.sensitivity_ratios.start_times,
            sensitivity_ratio_end_times: self.sensitivity_ratios.end_times,
            sensitivity_ratio_values: self.sensitivity_ratios.values,
            settings: self.settings.0,
            target_range_start_times: self.target_range.start_times,
            target_range_end_times: self.target_range.end_times,
            target_range_minimum_values: self.target_range.minimum_values,
            target_range_maximum_values: self.target_range.maximum_values,
        }
    }
}
