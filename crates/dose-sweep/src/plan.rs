use crate::config::SweepConfig;
use crate::error::SweepError;
use loop_core::to_cents;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseCandidate {
    pub index: usize,
    /// Amount added to the current dose; also the row label.
    pub delta: f64,
}

/// Candidate deltas `0, step, 2*step, ..` strictly below `sweep_max`.
///
/// Candidates are generated from integer hundredths, so the k-th delta is
/// exactly `k * step` rounded to cents and nothing drifts near the bound.
/// `sweep_max` is itself rounded to cents before the exclusive comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    pub sweep_max: f64,
    pub step: f64,
    pub candidates: Vec<DoseCandidate>,
}

impl SweepPlan {
    pub fn new(sweep_max: f64, config: &SweepConfig) -> Result<Self, SweepError> {
        config.validate()?;
        if !sweep_max.is_finite() {
            return Err(SweepError::Config(format!("sweep bound is not finite: {sweep_max}")));
        }
        let step_cents = to_cents(config.dose_step);
        let max_cents = to_cents(sweep_max);
        // at least the zero-dose candidate; to_cents saturates on huge bounds
        let count = if max_cents <= 0 {
            1
        } else {
            usize::try_from((max_cents - 1) / step_cents + 1).unwrap_or(usize::MAX)
        };
        if count > config.max_candidates {
            return Err(SweepError::TooManyCandidates {
                count,
                limit: config.max_candidates,
            });
        }
        let candidates = (0..count)
            .map(|index| DoseCandidate {
                index,
                delta: (index as i64 * step_cents) as f64 / 100.0,
            })
            .collect();
        Ok(Self {
            sweep_max,
            step: step_cents as f64 / 100.0,
            candidates,
        })
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn last_delta(&self) -> f64 {
        self.candidates.last().map_or(0.0, |c| c.delta)
    }
}
