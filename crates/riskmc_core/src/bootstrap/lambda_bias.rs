use crate::model::ReturnMatrix;

/// Start scores `lambda * loss^2 + (1 - lambda)` for every fixed-size block start.
///
/// `loss` is the positive part of the negated one-step portfolio return at the
/// start row. `block` must already be clamped to the number of periods.
#[must_use]
pub fn badness_scores(returns: &ReturnMatrix, weights: &[f64], block: usize, lambda: f64) -> Vec<f64> {
    let starts = returns.num_periods().saturating_sub(block) + 1;
    returns
        .portfolio_returns(weights, starts)
        .into_iter()
        .map(|r| {
            let loss = (-r).max(0.0);
            lambda * loss * loss + (1.0 - lambda)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssetList, Matrix};

    fn returns() -> ReturnMatrix {
        let rows = vec![vec![0.02], vec![-0.1], vec![0.0], vec![-0.2]];
        ReturnMatrix::from_returns(AssetList::from_iter(["A"]), Matrix::from_rows(&rows).unwrap())
            .unwrap()
    }

    #[test]
    fn test_lambda_zero_is_uniform() {
        let scores = badness_scores(&returns(), &[1.0], 1, 0.0);
        assert_eq!(scores, vec![1.0; 4]);
    }

    #[test]
    fn test_losses_score_higher() {
        let scores = badness_scores(&returns(), &[1.0], 2, 0.5);
        // Block of 2 leaves three starts.
        assert_eq!(scores.len(), 3);
        assert!((scores[0] - 0.5).abs() < 1e-12);
        assert!((scores[1] - (0.5 * 0.01 + 0.5)).abs() < 1e-12);
        assert!((scores[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_lambda_one_keeps_only_losses() {
        let scores = badness_scores(&returns(), &[1.0], 1, 1.0);
        assert_eq!(scores[0], 0.0);
        assert_eq!(scores[2], 0.0);
        assert!(scores[1] > 0.0 && scores[3] > scores[1]);
    }
}
