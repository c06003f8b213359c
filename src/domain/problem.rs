//! Portfolio problem instance: expected returns, covariance, risk aversion.
//!
//! A [`ProblemInstance`] is built once from external data via [`try_new`],
//! which enforces all shape invariants, and is immutable afterwards. The
//! formulator and solvers share it read-only.
//!
//! [`try_new`]: ProblemInstance::try_new

use super::error::DomainError;

/// Tolerance for the covariance symmetry check.
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// An immutable mean-variance portfolio selection problem.
///
/// Invariants, enforced at construction:
/// - `expected_returns` is non-empty,
/// - `covariance` is square with dimensions equal to the number of assets,
/// - `covariance` is symmetric within [`SYMMETRY_TOLERANCE`] and has a
///   non-negative diagonal,
/// - `risk_aversion` is finite and strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemInstance {
    expected_returns: Vec<f64>,
    covariance: Vec<Vec<f64>>,
    risk_aversion: f64,
}

impl ProblemInstance {
    /// Validate inputs and construct a problem instance.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidProblem`] when any shape or value
    /// invariant is violated.
    pub fn try_new(
        expected_returns: Vec<f64>,
        covariance: Vec<Vec<f64>>,
        risk_aversion: f64,
    ) -> Result<Self, DomainError> {
        let n = expected_returns.len();
        if n == 0 {
            return Err(invalid("expected returns vector is empty"));
        }
        if expected_returns.iter().any(|r| !r.is_finite()) {
            return Err(invalid("expected returns contain a non-finite value"));
        }
        if !risk_aversion.is_finite() || risk_aversion <= 0.0 {
            return Err(invalid(format!(
                "risk aversion must be a positive finite scalar, got {risk_aversion}"
            )));
        }
        if covariance.len() != n {
            return Err(invalid(format!(
                "covariance has {} rows for {} assets",
                covariance.len(),
                n
            )));
        }
        for (i, row) in covariance.iter().enumerate() {
            if row.len() != n {
                return Err(invalid(format!(
                    "covariance row {i} has {} columns, expected {n}",
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(invalid(format!("covariance row {i} contains a non-finite value")));
            }
        }
        for i in 0..n {
            if covariance[i][i] < 0.0 {
                return Err(invalid(format!(
                    "covariance diagonal entry {i} is negative: {}",
                    covariance[i][i]
                )));
            }
            for j in (i + 1)..n {
                let delta = (covariance[i][j] - covariance[j][i]).abs();
                if delta > SYMMETRY_TOLERANCE {
                    return Err(invalid(format!(
                        "covariance is not symmetric at ({i},{j}): |{} - {}| = {delta}",
                        covariance[i][j], covariance[j][i]
                    )));
                }
            }
        }

        Ok(Self {
            expected_returns,
            covariance,
            risk_aversion,
        })
    }

    /// Number of assets in the problem.
    #[must_use]
    pub fn num_assets(&self) -> usize {
        self.expected_returns.len()
    }

    /// Expected return per asset.
    #[must_use]
    pub fn expected_returns(&self) -> &[f64] {
        &self.expected_returns
    }

    /// Covariance matrix rows.
    #[must_use]
    pub fn covariance(&self) -> &[Vec<f64>] {
        &self.covariance
    }

    /// Risk-aversion scalar weighting return reward against risk penalty.
    #[must_use]
    pub const fn risk_aversion(&self) -> f64 {
        self.risk_aversion
    }

    /// Continuous mean-variance objective `wᵀΣw − λ·μᵀw` for a weight
    /// vector. Used by the classical solver path; lower is better.
    #[must_use]
    pub fn mean_variance_objective(&self, weights: &[f64]) -> f64 {
        let n = self.num_assets();
        debug_assert_eq!(weights.len(), n);
        let mut risk = 0.0;
        for i in 0..n {
            for j in 0..n {
                risk += weights[i] * self.covariance[i][j] * weights[j];
            }
        }
        let reward: f64 = weights
            .iter()
            .zip(&self.expected_returns)
            .map(|(w, r)| w * r)
            .sum();
        risk - self.risk_aversion * reward
    }
}

fn invalid(reason: impl Into<String>) -> DomainError {
    DomainError::InvalidProblem {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_asset() -> ProblemInstance {
        ProblemInstance::try_new(
            vec![0.1, 0.2],
            vec![vec![0.04, 0.01], vec![0.01, 0.09]],
            2.0,
        )
        .unwrap()
    }

    #[test]
    fn valid_instance_constructs() {
        let problem = two_asset();
        assert_eq!(problem.num_assets(), 2);
        assert_eq!(problem.risk_aversion(), 2.0);
    }

    #[test]
    fn rejects_empty_returns() {
        let result = ProblemInstance::try_new(vec![], vec![], 1.0);
        assert!(matches!(result, Err(DomainError::InvalidProblem { .. })));
    }

    #[test]
    fn rejects_non_square_covariance() {
        let result = ProblemInstance::try_new(
            vec![0.1, 0.2],
            vec![vec![0.04, 0.01, 0.0], vec![0.01, 0.09, 0.0]],
            1.0,
        );
        assert!(matches!(result, Err(DomainError::InvalidProblem { .. })));
    }

    #[test]
    fn rejects_row_count_mismatch() {
        let result = ProblemInstance::try_new(vec![0.1, 0.2], vec![vec![0.04, 0.01]], 1.0);
        assert!(matches!(result, Err(DomainError::InvalidProblem { .. })));
    }

    #[test]
    fn rejects_asymmetric_covariance() {
        let result = ProblemInstance::try_new(
            vec![0.1, 0.2],
            vec![vec![0.04, 0.01], vec![0.02, 0.09]],
            1.0,
        );
        assert!(matches!(result, Err(DomainError::InvalidProblem { .. })));
    }

    #[test]
    fn accepts_asymmetry_within_tolerance() {
        let result = ProblemInstance::try_new(
            vec![0.1, 0.2],
            vec![vec![0.04, 0.01], vec![0.01 + 1e-12, 0.09]],
            1.0,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_non_positive_risk_aversion() {
        let cov = vec![vec![0.04]];
        assert!(ProblemInstance::try_new(vec![0.1], cov.clone(), 0.0).is_err());
        assert!(ProblemInstance::try_new(vec![0.1], cov.clone(), -1.0).is_err());
        assert!(ProblemInstance::try_new(vec![0.1], cov, f64::NAN).is_err());
    }

    #[test]
    fn rejects_negative_variance() {
        let result = ProblemInstance::try_new(vec![0.1], vec![vec![-0.01]], 1.0);
        assert!(matches!(result, Err(DomainError::InvalidProblem { .. })));
    }

    #[test]
    fn mean_variance_objective_balances_risk_and_reward() {
        let problem = two_asset();
        let objective = problem.mean_variance_objective(&[0.5, 0.5]);
        // 0.25*0.04 + 2*0.25*0.01 + 0.25*0.09 - 2*(0.05 + 0.10)
        let expected = 0.0375 - 0.3;
        assert!((objective - expected).abs() < 1e-12);
    }
}
