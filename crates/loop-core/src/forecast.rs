use crate::error::EngineError;
use crate::scenario::ScenarioState;
use crate::tidy::time_axis;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw engine answer as it crosses the boundary.
///
/// `recommended_bolus` is a sequence whose first element is the immediate
/// dose; trailing entries (pending insulin, notices) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineOutput {
    #[serde(default)]
    pub predicted_glucose_values: Option<Vec<f64>>,
    #[serde(default)]
    pub recommended_bolus: Option<Vec<Value>>,
    #[serde(default)]
    pub input_data: Option<ScenarioState>,
}

impl EngineOutput {
    pub fn new(predicted: Vec<f64>, recommended_dose: f64, input_data: ScenarioState) -> Self {
        Self {
            predicted_glucose_values: Some(predicted),
            recommended_bolus: Some(vec![Value::from(recommended_dose)]),
            input_data: Some(input_data),
        }
    }

    /// Validated predicted series: present, non-empty, finite.
    pub fn into_predicted(self) -> Result<Vec<f64>, EngineError> {
        let series = self
            .predicted_glucose_values
            .ok_or(EngineError::MissingField("predicted_glucose_values"))?;
        validate_series(&series)?;
        Ok(series)
    }

    pub fn recommended_dose(&self) -> Result<f64, EngineError> {
        self.recommended_bolus
            .as_deref()
            .and_then(<[Value]>::first)
            .and_then(Value::as_f64)
            .filter(|dose| dose.is_finite())
            .ok_or(EngineError::MissingField("recommended_bolus"))
    }
}

fn validate_series(series: &[f64]) -> Result<(), EngineError> {
    if series.is_empty() {
        return Err(EngineError::EmptyForecast);
    }
    if let Some(index) = series.iter().position(|v| !v.is_finite()) {
        return Err(EngineError::NonFiniteForecast { index });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predicted_glucose: Vec<f64>,
    pub recommended_dose: f64,
    /// State the engine actually used; falls back to the submitted state when
    /// the engine does not echo one.
    pub input_state: ScenarioState,
}

impl ForecastResult {
    pub fn from_output(mut output: EngineOutput, submitted: &ScenarioState) -> Result<Self, EngineError> {
        let recommended_dose = output.recommended_dose()?;
        let input_state = output
            .input_data
            .take()
            .unwrap_or_else(|| submitted.clone());
        let predicted_glucose = output.into_predicted()?;
        Ok(Self {
            predicted_glucose,
            recommended_dose,
            input_state,
        })
    }

    pub fn len(&self) -> usize {
        self.predicted_glucose.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicted_glucose.is_empty()
    }

    pub fn time_axis(&self) -> Vec<u32> {
        time_axis(self.len())
    }
}
