use crate::SweepMetrics;
use loop_core::{EngineError, EngineOutput, ForecastEngine, ScenarioState};
use std::time::Instant;
use tracing::trace;

pub struct InstrumentedEngine<'m, E> {
    inner: E,
    metrics: &'m SweepMetrics,
}

impl<'m, E: ForecastEngine> InstrumentedEngine<'m, E> {
    pub fn new(inner: E, metrics: &'m SweepMetrics) -> Self {
        Self { inner, metrics }
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<'m, E: ForecastEngine> ForecastEngine for InstrumentedEngine<'m, E> {
    fn forecast(&self, state: &ScenarioState) -> Result<EngineOutput, EngineError> {
        let started = Instant::now();
        let result = self.inner.forecast(state);
        let seconds = started.elapsed().as_secs_f64();
        let outcome = match &result {
            Ok(_) => "ok",
            Err(EngineError::Timeout { .. }) => "timeout",
            Err(_) => "error",
        };
        trace!(outcome, seconds, "forecast call observed");
        self.metrics.observe_call(outcome, seconds);
        result
    }
}
