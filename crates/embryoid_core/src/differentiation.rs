//! Competing-feedback differentiation rule.
//!
//! A stem cell in state `U` can commit to `T` in two independent ways each step:
//!
//! - **basal**: a uniform draw below `a`, regardless of neighbors;
//! - **neighbor-driven**: with at least one network neighbor, two further draws are
//!   compared against a negative-feedback Hill term on the uncommitted fraction
//!   (`1 / (1 + (norm_u / k1)^n1)`) and a positive-feedback Hill term on the
//!   differentiated fraction (`norm_d^n2 / (k2^n2 + norm_d^n2)`). Either one
//!   succeeding is enough.
//!
//! Hill terms are not clamped. A non-finite intermediate is reported as
//! [`SimError::NumericOverflow`] so that out-of-range exponents stop the run.

use crate::error::{Result, SimError};
use embryoid_data::CellState;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ordered parameter vector `[a, k1, n1, k2, n2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferentiationParams {
    /// Basal probability of leaving `U` per step.
    pub a: f64,
    /// Negative-feedback half-maximal threshold.
    pub k1: f64,
    /// Negative-feedback Hill coefficient.
    pub n1: f64,
    /// Positive-feedback half-maximal threshold.
    pub k2: f64,
    /// Positive-feedback Hill coefficient.
    pub n2: f64,
}

impl DifferentiationParams {
    pub const LEN: usize = 5;

    #[must_use]
    pub const fn new(a: f64, k1: f64, n1: f64, k2: f64, n2: f64) -> Self {
        Self { a, k1, n1, k2, n2 }
    }

    /// Builds the parameters from an ordered slice `[a, k1, n1, k2, n2]`.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        if values.len() != Self::LEN {
            return Err(SimError::invalid_params(format!(
                "expected {} entries [a, k1, n1, k2, n2], found {}",
                Self::LEN,
                values.len()
            )));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(SimError::invalid_params(format!(
                "entry {pos} is not finite: {}",
                values[pos]
            )));
        }
        Ok(Self::new(values[0], values[1], values[2], values[3], values[4]))
    }

    #[must_use]
    pub fn as_array(&self) -> [f64; 5] {
        [self.a, self.k1, self.n1, self.k2, self.n2]
    }
}

/// Composition of a cell's network neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborTally {
    /// Neighbors in `U` or `T`.
    pub uncommitted: usize,
    /// Neighbors in `D`.
    pub differentiated: usize,
    /// All neighbors, including any in states counted by neither bucket.
    pub total: usize,
}

impl NeighborTally {
    pub fn from_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = CellState>,
    {
        let mut tally = Self::default();
        for state in states {
            tally.total += 1;
            if state.is_uncommitted() {
                tally.uncommitted += 1;
            } else if state == CellState::Differentiated {
                tally.differentiated += 1;
            }
        }
        tally
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// `(norm_u, norm_d)`, or `None` without neighbors.
    #[must_use]
    pub fn fractions(&self) -> Option<(f64, f64)> {
        if self.total == 0 {
            return None;
        }
        let total = self.total as f64;
        Some((
            self.uncommitted as f64 / total,
            self.differentiated as f64 / total,
        ))
    }
}

/// Transition probabilities contributed by the neighborhood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feedback {
    pub negative: f64,
    pub positive: f64,
}

fn finite(term: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::NumericOverflow { term, value })
    }
}

/// `1 / (1 + (norm_u / k1)^n1)`
pub fn negative_feedback(norm_u: f64, k1: f64, n1: f64) -> Result<f64> {
    let ratio = finite("norm_u / k1", norm_u / k1)?;
    let powered = finite("(norm_u / k1)^n1", ratio.powf(n1))?;
    Ok(1.0 / (1.0 + powered))
}

/// `norm_d^n2 / (k2^n2 + norm_d^n2)`
pub fn positive_feedback(norm_d: f64, k2: f64, n2: f64) -> Result<f64> {
    let d_term = finite("norm_d^n2", norm_d.powf(n2))?;
    let k_term = finite("k2^n2", k2.powf(n2))?;
    let denominator = k_term + d_term;
    if denominator == 0.0 {
        return Err(SimError::DegenerateHill);
    }
    finite("positive feedback", d_term / denominator)
}

/// Both feedback probabilities, or `None` when the cell has no neighbors.
pub fn feedback(tally: &NeighborTally, params: &DifferentiationParams) -> Result<Option<Feedback>> {
    let Some((norm_u, norm_d)) = tally.fractions() else {
        return Ok(None);
    };
    Ok(Some(Feedback {
        negative: negative_feedback(norm_u, params.k1, params.n1)?,
        positive: positive_feedback(norm_d, params.k2, params.n2)?,
    }))
}

/// Applies one step of the rule and returns the resulting state.
///
/// Only `U` can change. Draw order is basal, then negative, then positive; the
/// neighbor draws are consumed even if the basal draw already committed the cell.
pub fn decide<R: Rng + ?Sized>(
    state: CellState,
    tally: &NeighborTally,
    params: &DifferentiationParams,
    rng: &mut R,
) -> Result<CellState> {
    if state != CellState::Undifferentiated {
        return Ok(state);
    }

    let mut next = state;
    let basal: f64 = rng.gen();
    if basal < params.a {
        next = CellState::Transitioning;
    }

    if let Some(fb) = feedback(tally, params)? {
        let x1: f64 = rng.gen();
        let x2: f64 = rng.gen();
        // OR, not AND: either loop alone can push the cell out of U.
        if x1 < fb.negative || x2 < fb.positive {
            next = CellState::Transitioning;
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn close(actual: f64, expected: f64) -> bool {
        ((actual - expected) / expected).abs() < 1e-6
    }

    /// Draws 0.0 forever.
    fn low_draws() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Draws just under 1.0 forever.
    fn high_draws() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn test_from_slice_requires_five_entries() {
        assert!(DifferentiationParams::from_slice(&[0.01, 0.5, 10.0]).is_err());
        let p = DifferentiationParams::from_slice(&[0.01, 0.5, 10.0, 0.4, 25.0]).unwrap();
        assert_eq!(p.as_array(), [0.01, 0.5, 10.0, 0.4, 25.0]);
    }

    #[test]
    fn test_from_slice_rejects_nan() {
        let err = DifferentiationParams::from_slice(&[0.01, f64::NAN, 10.0, 0.4, 25.0]).unwrap_err();
        assert!(matches!(err, SimError::InvalidParams(_)));
    }

    #[test]
    fn test_tally_counts_transitioning_as_uncommitted() {
        let tally = NeighborTally::from_states([
            CellState::Undifferentiated,
            CellState::Transitioning,
            CellState::Differentiated,
            CellState::Apoptotic,
        ]);
        assert_eq!(tally.uncommitted, 2);
        assert_eq!(tally.differentiated, 1);
        assert_eq!(tally.total, 4);
        assert_eq!(tally.fractions(), Some((0.5, 0.25)));
    }

    #[test]
    fn test_closed_form_scenario() {
        let tally = NeighborTally {
            uncommitted: 8,
            differentiated: 2,
            total: 10,
        };
        let params = DifferentiationParams::new(0.0, 0.5, 10.0, 0.5, 10.0);
        let fb = feedback(&tally, &params).unwrap().unwrap();

        let expected_negative = 1.0 / (1.0 + (0.8f64 / 0.5).powf(10.0));
        let expected_positive = 0.2f64.powf(10.0) / (0.5f64.powf(10.0) + 0.2f64.powf(10.0));
        assert!(close(fb.negative, expected_negative));
        assert!(close(fb.positive, expected_positive));
        assert!(close(fb.negative, 0.009_012_974));
        assert!(close(fb.positive, 1.048_466e-4));
    }

    #[test]
    fn test_no_neighbors_gives_no_feedback() {
        let params = DifferentiationParams::new(0.0, 0.5, 10.0, 0.5, 10.0);
        assert_eq!(feedback(&NeighborTally::default(), &params).unwrap(), None);
    }

    #[test]
    fn test_basal_draw_below_a_commits() {
        let params = DifferentiationParams::new(0.01, 0.5, 10.0, 0.5, 10.0);
        let next = decide(
            CellState::Undifferentiated,
            &NeighborTally::default(),
            &params,
            &mut low_draws(),
        )
        .unwrap();
        assert_eq!(next, CellState::Transitioning);
    }

    #[test]
    fn test_basal_draw_at_or_above_a_does_not_commit() {
        let params = DifferentiationParams::new(0.01, 0.5, 10.0, 0.5, 10.0);
        let next = decide(
            CellState::Undifferentiated,
            &NeighborTally::default(),
            &params,
            &mut high_draws(),
        )
        .unwrap();
        assert_eq!(next, CellState::Undifferentiated);
    }

    #[test]
    fn test_positive_feedback_alone_commits() {
        // (0.1 / 1e-3)^10 = 1e20 absorbs the 1 in the denominator, so the negative
        // term is 1e-20 and positive feedback is the only realistic route.
        let tally = NeighborTally {
            uncommitted: 1,
            differentiated: 9,
            total: 10,
        };
        let params = DifferentiationParams::new(0.0, 1e-3, 10.0, 0.1, 10.0);
        let fb = feedback(&tally, &params).unwrap().unwrap();
        assert!(fb.negative < 1e-19);
        assert!(fb.positive > 0.999);

        // Draws alternate 0.0, 0.5, 0.0: basal misses (a = 0), x1 = 0.5 misses the
        // negative term, x2 = 0.0 hits the positive term.
        let mut rng = StepRng::new(0, 1 << 63);
        let next = decide(CellState::Undifferentiated, &tally, &params, &mut rng).unwrap();
        assert_eq!(next, CellState::Transitioning);
    }

    #[test]
    fn test_only_undifferentiated_cells_change() {
        let params = DifferentiationParams::new(1.0, 0.5, 10.0, 0.5, 10.0);
        for state in [
            CellState::Transitioning,
            CellState::Differentiated,
            CellState::Apoptotic,
        ] {
            let next = decide(state, &NeighborTally::default(), &params, &mut low_draws()).unwrap();
            assert_eq!(next, state);
        }
    }

    #[test]
    fn test_overflow_surfaces() {
        let err = negative_feedback(1.0, 1e-3, 400.0).unwrap_err();
        assert!(matches!(err, SimError::NumericOverflow { .. }));
    }

    #[test]
    fn test_zero_k1_surfaces() {
        let err = negative_feedback(0.5, 0.0, 10.0).unwrap_err();
        assert!(matches!(err, SimError::NumericOverflow { .. }));
    }

    #[test]
    fn test_degenerate_positive_feedback_surfaces() {
        // 1e-200^10 underflows to zero, as does 0^10.
        let err = positive_feedback(0.0, 1e-200, 10.0).unwrap_err();
        assert!(matches!(err, SimError::DegenerateHill));
    }
}
