use crate::{CorrectionBand, SafetyCurve, SuspendLine};
use loop_core::{time_axis, ScenarioError, SchedulePolicy, Settings, TargetRange};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Guide series derived from settings alone; no forecast is consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdGuides {
    pub policy: SchedulePolicy,
    pub safety_curve: SafetyCurve,
    pub correction_band: CorrectionBand,
    pub suspend_line: SuspendLine,
}

/// Derives the dosing-safety curve, the correction band and the suspend line.
///
/// Suspend threshold and target range are read under
/// [`SchedulePolicy::FirstValueOnly`]: multi-segment schedules contribute only
/// their first segment. `forecast_len` is the number of 5-minute points the
/// band and line are broadcast over.
pub fn derive(
    settings: &Settings,
    target_range: &TargetRange,
    forecast_len: usize,
) -> Result<ThresholdGuides, ScenarioError> {
    let policy = SchedulePolicy::FirstValueOnly;
    let suspend_threshold = settings.suspend_threshold()?;
    let (target_min, target_max) = target_range.first_pair(policy)?;

    let axis = time_axis(forecast_len);
    let correction_band = CorrectionBand::new(target_min, target_max, axis.clone());
    let correction_mid = correction_band.midpoint();
    debug!(
        suspend_threshold,
        target_min, target_max, correction_mid, "threshold guides derived"
    );

    Ok(ThresholdGuides {
        policy,
        safety_curve: SafetyCurve::new(suspend_threshold, correction_mid),
        correction_band,
        suspend_line: SuspendLine::new(suspend_threshold, axis),
    })
}
