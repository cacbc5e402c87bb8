use crate::config::SweepConfig;
use crate::error::SweepError;
use crate::labels::DoseLabels;
use crate::plan::{DoseCandidate, SweepPlan};
use loop_core::{
    EngineError, ForecastEngine, ForecastResult, ScenarioState, ScenarioTables, SweepTable,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub baseline: ForecastResult,
    /// Sub-tables decoded from the state the baseline forecast used.
    pub tables: ScenarioTables,
    pub labels: DoseLabels,
    pub plan: SweepPlan,
    pub sweep: SweepTable,
}

impl Simulation {
    pub fn recommended_dose(&self) -> f64 {
        self.labels.recommended_dose
    }

    pub fn insulin_for_carbs(&self) -> f64 {
        self.labels.insulin_for_carbs
    }

    pub fn insulin_as_correction(&self) -> f64 {
        self.labels.insulin_as_correction
    }
}

pub struct Simulator<'a, E: ?Sized> {
    engine: &'a E,
    config: &'a SweepConfig,
}

impl<'a, E: ForecastEngine + ?Sized> Simulator<'a, E> {
    pub fn new(engine: &'a E, config: &'a SweepConfig) -> Self {
        Self { engine, config }
    }

    /// Baseline forecast, labeling scalars, then one forecast per candidate
    /// dose. The first failing candidate aborts the sweep.
    pub fn simulate(&self, state: &ScenarioState) -> Result<Simulation, SweepError> {
        let span = info_span!("dose_sweep", parallel = self.config.parallel);
        let _guard = span.enter();
        let started = Instant::now();

        self.config.validate()?;
        let current_dose = state.current_dose()?;
        let output = self.engine.forecast(state).map_err(SweepError::baseline)?;
        let baseline = ForecastResult::from_output(output, state).map_err(SweepError::baseline)?;

        let tables = ScenarioTables::decode(&baseline.input_state);
        let labels = DoseLabels::compute(&tables, baseline.recommended_dose)?;
        let plan = SweepPlan::new(labels.sweep_max(self.config), self.config)?;
        info!(
            recommended_dose = labels.recommended_dose,
            insulin_for_carbs = labels.insulin_for_carbs,
            sweep_max = plan.sweep_max,
            candidates = plan.len(),
            "sweep planned"
        );

        let expected_len = baseline.len();
        let run = |candidate: &DoseCandidate| {
            self.forecast_candidate(state, current_dose, candidate, expected_len)
                .map(|series| (candidate.delta, series))
        };
        let series = if self.config.parallel {
            plan.candidates
                .par_iter()
                .map(run)
                .collect::<Result<Vec<_>, _>>()
        } else {
            plan.candidates.iter().map(run).collect::<Result<Vec<_>, _>>()
        }
        .map_err(|err| {
            warn!(error = %err, "sweep aborted");
            err
        })?;

        let sweep = SweepTable::from_series(series);
        info!(
            rows = sweep.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sweep complete"
        );

        Ok(Simulation {
            baseline,
            tables,
            labels,
            plan,
            sweep,
        })
    }

    fn forecast_candidate(
        &self,
        state: &ScenarioState,
        current_dose: f64,
        candidate: &DoseCandidate,
        expected_len: usize,
    ) -> Result<Vec<f64>, SweepError> {
        let dose = candidate.delta;
        let perturbed = state.with_current_dose(current_dose + dose)?;
        debug!(index = candidate.index, dose, "forecasting candidate");

        let series = self
            .engine
            .forecast(&perturbed)
            .and_then(|output| output.into_predicted())
            .map_err(|source| SweepError::candidate(dose, source))?;
        if series.len() != expected_len {
            return Err(SweepError::candidate(
                dose,
                EngineError::InconsistentSeriesLength {
                    expected: expected_len,
                    actual: series.len(),
                },
            ));
        }
        Ok(series)
    }
}

pub fn simulate<E: ForecastEngine + ?Sized>(
    engine: &E,
    state: &ScenarioState,
    config: &SweepConfig,
) -> Result<Simulation, SweepError> {
    Simulator::new(engine, config).simulate(state)
}
