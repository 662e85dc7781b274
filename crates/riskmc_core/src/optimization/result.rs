//! Optimizer result types
//!
//! Per-iteration records and the final outcome of an ERC run.

use serde::{Deserialize, Serialize};

use crate::model::WeightVector;

/// Diagnostics of a single optimizer iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,

    /// Weights the scenarios were generated with
    pub weights: Vec<f64>,

    /// Marginal ES contribution of each asset
    pub contributions: Vec<f64>,

    /// Portfolio expected shortfall (absolute value)
    pub expected_shortfall: f64,

    /// Equal share `ES / N`
    pub target: f64,

    /// `max |rc_i - target| / ES`
    pub rel_dev: f64,
}

/// All iterations of one optimizer run, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceHistory {
    pub iterations: Vec<IterationRecord>,
}

impl ConvergenceHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: IterationRecord) {
        self.iterations.push(record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&IterationRecord> {
        self.iterations.last()
    }

    /// Relative deviation per iteration.
    #[must_use]
    pub fn rel_devs(&self) -> Vec<f64> {
        self.iterations.iter().map(|r| r.rel_dev).collect()
    }

    /// Smallest relative deviation seen so far.
    #[must_use]
    pub fn best_rel_dev(&self) -> Option<f64> {
        self.iterations
            .iter()
            .map(|r| r.rel_dev)
            .min_by(f64::total_cmp)
    }
}

/// Reason why optimization terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Relative deviation dropped to the tolerance
    Converged,

    /// Iteration budget used up; weights are best effort
    MaxIterationsReached,
}

/// Final result of an ERC run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErcOutcome {
    pub weights: WeightVector,

    pub converged: bool,

    pub termination_reason: TerminationReason,

    /// Number of iterations evaluated
    pub iterations: usize,

    pub history: ConvergenceHistory,
}

impl ErcOutcome {
    /// Relative deviation of the last evaluated iteration.
    #[must_use]
    pub fn final_rel_dev(&self) -> Option<f64> {
        self.history.last().map(|r| r.rel_dev)
    }

    /// Expected shortfall of the last evaluated iteration.
    #[must_use]
    pub fn final_expected_shortfall(&self) -> Option<f64> {
        self.history.last().map(|r| r.expected_shortfall)
    }
}
