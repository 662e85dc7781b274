//! Index samplers used to pick block start positions.
//!
//! Every resampling policy draws start indices through [`StartSampler`], which
//! is either a plain uniform draw or a cumulative distribution searched with
//! `partition_point`.

use rand::Rng;

/// Draws indices in `0..len()`.
pub trait IndexSampler {
    /// Size of the index domain
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Draw one index.
    fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize;
}

/// Uniform over `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformIndex {
    n: usize,
}

impl UniformIndex {
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl IndexSampler for UniformIndex {
    fn len(&self) -> usize {
        self.n
    }

    fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        if self.n <= 1 {
            return 0;
        }
        rng.random_range(0..self.n)
    }
}

/// Discrete distribution over `0..n` built from non-negative scores.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeIndex {
    cdf: Vec<f64>,
}

impl CumulativeIndex {
    /// Normalize `scores` into a cumulative distribution.
    ///
    /// Returns `None` if there are no scores, if any score is negative or
    /// non-finite, or if they sum to zero.
    #[must_use]
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() || scores.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return None;
        }
        let total: f64 = scores.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return None;
        }

        let mut acc = 0.0;
        let mut cdf: Vec<f64> = scores
            .iter()
            .map(|s| {
                acc += s / total;
                acc
            })
            .collect();
        // Rounding can leave the tail slightly below 1.
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }
        Some(Self { cdf })
    }

    /// Probability mass of index `i`.
    #[must_use]
    pub fn probability(&self, i: usize) -> f64 {
        match i {
            0 => self.cdf[0],
            _ => self.cdf[i] - self.cdf[i - 1],
        }
    }
}

impl IndexSampler for CumulativeIndex {
    fn len(&self) -> usize {
        self.cdf.len()
    }

    fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let u: f64 = rng.random();
        self.cdf
            .partition_point(|c| *c <= u)
            .min(self.cdf.len() - 1)
    }
}

/// Start-index sampler shared by all resampling policies.
#[derive(Debug, Clone, PartialEq)]
pub enum StartSampler {
    Uniform(UniformIndex),
    Weighted(CumulativeIndex),
}

impl StartSampler {
    #[must_use]
    pub fn uniform(n: usize) -> Self {
        StartSampler::Uniform(UniformIndex::new(n))
    }

    /// Weighted sampler, or uniform when the scores cannot form a distribution.
    #[must_use]
    pub fn from_scores(scores: &[f64]) -> Self {
        match CumulativeIndex::from_scores(scores) {
            Some(cdf) => StartSampler::Weighted(cdf),
            None => {
                tracing::trace!(n = scores.len(), "degenerate start scores, sampling uniformly");
                Self::uniform(scores.len())
            }
        }
    }

    #[must_use]
    pub fn probability(&self, i: usize) -> f64 {
        match self {
            StartSampler::Uniform(u) => 1.0 / u.len().max(1) as f64,
            StartSampler::Weighted(c) => c.probability(i),
        }
    }
}

impl IndexSampler for StartSampler {
    fn len(&self) -> usize {
        match self {
            StartSampler::Uniform(u) => u.len(),
            StartSampler::Weighted(c) => c.len(),
        }
    }

    fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            StartSampler::Uniform(u) => u.sample_index(rng),
            StartSampler::Weighted(c) => c.sample_index(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_cumulative_probabilities() {
        let cdf = CumulativeIndex::from_scores(&[1.0, 3.0, 0.0, 4.0]).unwrap();
        assert!((cdf.probability(0) - 0.125).abs() < 1e-12);
        assert!((cdf.probability(1) - 0.375).abs() < 1e-12);
        assert!(cdf.probability(2).abs() < 1e-12);
        assert!((cdf.probability(3) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_score_never_drawn() {
        let sampler = StartSampler::from_scores(&[0.0, 1.0, 0.0, 1.0]);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2000 {
            let i = sampler.sample_index(&mut rng);
            assert!(i == 1 || i == 3, "drew zero-probability index {i}");
        }
    }

    #[test]
    fn test_degenerate_scores_fall_back_to_uniform() {
        assert!(matches!(
            StartSampler::from_scores(&[0.0, 0.0, 0.0]),
            StartSampler::Uniform(_)
        ));
        assert!(matches!(
            StartSampler::from_scores(&[1.0, f64::NAN]),
            StartSampler::Uniform(_)
        ));
    }

    #[test]
    fn test_weighted_frequencies() {
        let sampler = StartSampler::from_scores(&[1.0, 9.0]);
        let mut rng = StdRng::seed_from_u64(7);
        let draws = 20_000;
        let ones = (0..draws)
            .filter(|_| sampler.sample_index(&mut rng) == 1)
            .count();
        let freq = ones as f64 / draws as f64;
        assert!((freq - 0.9).abs() < 0.02, "frequency {freq}");
    }

    #[test]
    fn test_uniform_single_index() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(UniformIndex::new(1).sample_index(&mut rng), 0);
    }
}
