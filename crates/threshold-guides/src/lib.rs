mod correction_band;
mod guides;
mod safety_curve;

#[cfg(test)]
mod tests;

pub use correction_band::{CorrectionBand, SuspendLine};
pub use guides::{derive, ThresholdGuides};
pub use safety_curve::{linspace, SafetyCurve, SAFETY_CURVE_FLAT_POINTS, SAFETY_CURVE_MINUTES};
