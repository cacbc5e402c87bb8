use crate::config::SweepConfig;
use crate::error::SweepError;
use crate::loader::load_scenario;
use crate::simulate::{Simulation, Simulator};
use chrono::Utc;
use loop_core::{round2, ForecastEngine};
use serde::{Deserialize, Serialize};
use std::path::Path;
use threshold_guides::{derive, ThresholdGuides};

/// Lower edge of the glucose axis, mg/dL.
const Y_FLOOR: f64 = 40.0;
/// Headroom above the highest swept forecast, mg/dL.
const Y_HEADROOM: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSeries {
    pub name: String,
    pub dose: f64,
    pub forecast: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightedTraces {
    pub time: Vec<u32>,
    pub original: TraceSeries,
    pub recommended: Option<TraceSeries>,
    /// One step above the recommendation.
    pub overdose: Option<TraceSeries>,
}

impl HighlightedTraces {
    fn select(simulation: &Simulation) -> Self {
        let recommended_dose = round2(simulation.recommended_dose());
        let overdose = round2(recommended_dose + simulation.plan.step);
        let pick = |dose: f64, name: String| {
            simulation
                .sweep
                .forecast_for(dose)
                .map(|forecast| TraceSeries { name, dose, forecast })
        };
        Self {
            time: simulation.baseline.time_axis(),
            original: TraceSeries {
                name: "Original Forecast".into(),
                dose: 0.0,
                forecast: simulation.baseline.predicted_glucose.clone(),
            },
            recommended: pick(
                recommended_dose,
                format!("Forecast with Bolus Rec. of {}U", simulation.recommended_dose()),
            ),
            overdose: pick(overdose, format!("Forecast with Dose of {overdose}U")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderHints {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub y_range: [f64; 2],
    pub animation_frame: String,
    pub safety_curve_name: String,
}

impl RenderHints {
    fn for_simulation(simulation: &Simulation) -> Self {
        let ceiling = simulation
            .sweep
            .max_forecast()
            .or_else(|| {
                simulation
                    .baseline
                    .predicted_glucose
                    .iter()
                    .copied()
                    .reduce(f64::max)
            })
            .unwrap_or(Y_FLOOR);
        Self {
            title: format!(
                "How the dosing decision works: recommended bolus of {}U",
                simulation.recommended_dose()
            ),
            x_axis_title: "Time".into(),
            y_axis_title: "Glucose (mg/dL)".into(),
            y_range: [Y_FLOOR, ceiling + Y_HEADROOM],
            animation_frame: "Forecast updated with Dose".into(),
            safety_curve_name: "Dosing Threshold".into(),
        }
    }
}

/// Hand-off to the renderer: sweep, scalars, guides and presentation hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosingReport {
    pub date: String,
    pub scenario: String,
    pub config: SweepConfig,
    pub simulation: Simulation,
    pub guides: ThresholdGuides,
    pub highlights: HighlightedTraces,
    pub hints: RenderHints,
}

impl DosingReport {
    pub fn assemble(
        scenario: impl Into<String>,
        config: &SweepConfig,
        simulation: Simulation,
    ) -> Result<Self, SweepError> {
        let guides = derive(
            &simulation.tables.settings,
            &simulation.tables.target_range,
            simulation.baseline.len(),
        )?;
        let highlights = HighlightedTraces::select(&simulation);
        let hints = RenderHints::for_simulation(&simulation);
        Ok(Self {
            date: Utc::now().format("%Y-%m-%d").to_string(),
            scenario: scenario.into(),
            config: config.clone(),
            simulation,
            guides,
            highlights,
            hints,
        })
    }
}

/// Loads the scenario at `path`, sweeps it and assembles the report.
pub fn run_scenario<E: ForecastEngine + ?Sized>(
    path: &Path,
    engine: &E,
    config: &SweepConfig,
) -> Result<DosingReport, SweepError> {
    let scenario = load_scenario(path)?;
    let simulation = Simulator::new(engine, config).simulate(&scenario.state)?;
    DosingReport::assemble(scenario.name, config, simulation)
}
