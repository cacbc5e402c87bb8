pub mod config;
pub mod engine;
pub mod error;
pub mod labels;
pub mod loader;
pub mod plan;
pub mod report;
pub mod simulate;


pub use config::{load_config, SweepConfig};
pub use engine::CommandEngine;
pub use error::SweepError;
pub use labels::DoseLabels;
pub use loader::{load_scenario, Scenario};
pub use plan::{DoseCandidate, SweepPlan};
pub use report::{run_scenario, DosingReport, HighlightedTraces, RenderHints, TraceSeries};
pub use simulate::{simulate, Simulation, Simulator};
