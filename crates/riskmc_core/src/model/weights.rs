use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Allowed distance of a weight vector's sum from 1.0
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Non-negative portfolio weights summing to 1, one per asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightVector(Vec<f64>);

impl WeightVector {
    /// Validate user supplied weights for a portfolio of `num_assets` assets.
    pub fn new(values: Vec<f64>, num_assets: usize) -> Result<Self> {
        if values.len() != num_assets {
            return Err(EngineError::InvalidWeights(format!(
                "expected {num_assets} weights, got {}",
                values.len()
            )));
        }
        if let Some((i, w)) = values
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(EngineError::InvalidWeights(format!(
                "weight {i} is {w}, weights must be finite and non-negative"
            )));
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(EngineError::InvalidWeights(format!(
                "weights sum to {sum}, expected 1"
            )));
        }
        Ok(Self(values))
    }

    /// Equal weights `1/n`.
    #[must_use]
    pub fn uniform(n: usize) -> Self {
        if n == 0 {
            return Self(Vec::new());
        }
        Self(vec![1.0 / n as f64; n])
    }

    /// Clamp negatives to zero and rescale to sum 1.
    ///
    /// Falls back to uniform weights when nothing positive is left.
    #[must_use]
    pub fn normalized(mut values: Vec<f64>) -> Self {
        for w in &mut values {
            if !w.is_finite() || *w < 0.0 {
                *w = 0.0;
            }
        }
        let sum: f64 = values.iter().sum();
        if sum <= 0.0 {
            return Self::uniform(values.len());
        }
        for w in &mut values {
            *w /= sum;
        }
        Self(values)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}
