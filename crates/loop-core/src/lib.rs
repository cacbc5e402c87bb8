pub mod engine;
pub mod error;
pub mod forecast;
pub mod rounding;
pub mod scenario;
pub mod tables;
pub mod tidy;


pub use engine::ForecastEngine;
pub use error::{EngineError, ScenarioError};
pub use forecast::{EngineOutput, ForecastResult};
pub use rounding::{round2, round_to_int, to_cents};
pub use scenario::{SchedulePolicy, ScenarioState};
pub use tables::*;
pub use tidy::{time_axis, SweepTable, TidyForecastRow, FORECAST_STEP_MINUTES};
