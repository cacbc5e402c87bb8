use crate::error::EngineError;
use crate::forecast::EngineOutput;
use crate::scenario::ScenarioState;

/// The external forecaster. Treated as deterministic, blocking and possibly
/// expensive; implementations must not keep state between calls that would
/// make one candidate's answer depend on another's.
pub trait ForecastEngine: Send + Sync {
    fn forecast(&self, state: &ScenarioState) -> Result<EngineOutput, EngineError>;
}

impl<F> ForecastEngine for F
where
    F: Fn(&ScenarioState) -> Result<EngineOutput, EngineError> + Send + Sync,
{
    fn forecast(&self, state: &ScenarioState) -> Result<EngineOutput, EngineError> {
        self(state)
    }
}
