mod instrumented;
mod metrics;

#[cfg(test)]
mod tests;

pub use instrumented::InstrumentedEngine;
pub use metrics::{encode_text, SweepMetrics};
