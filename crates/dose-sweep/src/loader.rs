use crate::error::SweepError;
use loop_core::ScenarioState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// A scenario file: the structured state plus the name it was loaded under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub state: ScenarioState,
}

/// Loads a JSON scenario. The scenario name is the file stem.
pub fn load_scenario(path: &Path) -> Result<Scenario, SweepError> {
    let raw = fs::read_to_string(path).map_err(|source| SweepError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let state: ScenarioState = serde_json::from_str(&raw).map_err(|source| SweepError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    state.current_dose()?;

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scenario".to_string());
    info!(scenario = %name, glucose_points = state.glucose_values.len(), "scenario loaded");
    Ok(Scenario { name, state })
}
