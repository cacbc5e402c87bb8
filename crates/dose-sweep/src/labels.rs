use crate::config::SweepConfig;
use loop_core::{round2, ScenarioError, ScenarioTables, SchedulePolicy};
use serde::{Deserialize, Serialize};

/// Scalars that label the sweep: how much of the recommendation covers the
/// carbs and how much is correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseLabels {
    pub recommended_dose: f64,
    pub carbs: f64,
    /// Carb ratio rounded to 2 decimals.
    pub carb_ratio: f64,
    pub insulin_for_carbs: f64,
    pub insulin_as_correction: f64,
}

impl DoseLabels {
    pub fn compute(tables: &ScenarioTables, recommended_dose: f64) -> Result<Self, ScenarioError> {
        let policy = SchedulePolicy::FirstValueOnly;
        let carbs = tables.carb_events.first_amount(policy)?;
        let carb_ratio = round2(tables.carb_ratios.first_ratio(policy)?);
        if carb_ratio == 0.0 {
            return Err(ScenarioError::invalid(
                "carb_ratio_values",
                "carb ratio must be non-zero",
            ));
        }
        let insulin_for_carbs = round2(carbs / carb_ratio);
        let insulin_as_correction = round2(recommended_dose - insulin_for_carbs);
        Ok(Self {
            recommended_dose,
            carbs,
            carb_ratio,
            insulin_for_carbs,
            insulin_as_correction,
        })
    }

    /// Upper bound of the sweep: covers both the recommended dose and the
    /// carb-only dose plus their margins.
    pub fn sweep_max(&self, config: &SweepConfig) -> f64 {
        (self.recommended_dose + config.recommended_margin)
            .max(self.insulin_for_carbs + config.carb_margin)
    }
}
