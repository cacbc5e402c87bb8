use loop_core::{EngineError, ScenarioError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("malformed scenario: {0}")]
    MalformedScenario(#[from] ScenarioError),
    /// Engine failed or answered incompletely. `dose` is the candidate delta,
    /// `None` for the baseline call.
    #[error("forecast engine failed for {}: {source}", describe_dose(.dose))]
    ForecastEngineFailure {
        dose: Option<f64>,
        #[source]
        source: EngineError,
    },
    #[error("sweep would need {count} candidates, limit is {limit}")]
    TooManyCandidates { count: usize, limit: usize },
    #[error("invalid sweep config: {0}")]
    Config(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn describe_dose(dose: &Option<f64>) -> String {
    match dose {
        Some(d) => format!("candidate dose +{d:.2}U"),
        None => "baseline forecast".to_string(),
    }
}

impl SweepError {
    pub(crate) fn baseline(source: EngineError) -> Self {
        Self::ForecastEngineFailure { dose: None, source }
    }

    pub(crate) fn candidate(dose: f64, source: EngineError) -> Self {
        Self::ForecastEngineFailure {
            dose: Some(dose),
            source,
        }
    }

    /// Engine failures, including a series whose length disagrees with the
    /// baseline.
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, Self::ForecastEngineFailure { .. })
    }

    pub fn is_inconsistent_series_length(&self) -> bool {
        matches!(
            self,
            Self::ForecastEngineFailure {
                source: EngineError::InconsistentSeriesLength { .. },
                ..
            }
        )
    }

    pub fn is_malformed_scenario(&self) -> bool {
        matches!(self, Self::MalformedScenario(_))
    }
}
