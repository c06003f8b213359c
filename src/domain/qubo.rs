//! QUBO formulation of the mean-variance portfolio problem.
//!
//! The binary relaxation picks a subset of assets rather than continuous
//! weights. Expected return is rewarded on the diagonal, correlated risk
//! penalized off-diagonal:
//!
//! ```text
//! Q[i][i] = risk_aversion * returns[i] - cov[i][i]
//! Q[i][j] = -cov[i][j]                              (i != j)
//! ```
//!
//! Solvers minimize the quadratic form `xᵀQx` over binary vectors, so the
//! signs are flipped relative to the "maximize return" reading: a lower
//! energy means a better portfolio.

use serde::Serialize;

use super::error::DomainError;
use super::problem::ProblemInstance;

/// A symmetric QUBO coefficient matrix, stored dense row-major.
///
/// Immutable once formulated. Symmetry follows from the covariance
/// symmetry invariant on [`ProblemInstance`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuboMatrix {
    n: usize,
    coefficients: Vec<f64>,
}

impl QuboMatrix {
    /// Formulate the QUBO for a validated problem instance.
    ///
    /// Pure and deterministic; cannot fail because the instance's
    /// constructor already enforced every shape invariant.
    #[must_use]
    pub fn formulate(problem: &ProblemInstance) -> Self {
        let n = problem.num_assets();
        let returns = problem.expected_returns();
        let cov = problem.covariance();
        let lambda = problem.risk_aversion();

        let mut coefficients = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                coefficients[i * n + j] = if i == j {
                    lambda * returns[i] - cov[i][i]
                } else {
                    -cov[i][j]
                };
            }
        }
        Self { n, coefficients }
    }

    /// Formulate directly from raw parts, validating them first.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidProblem`] when the raw inputs violate
    /// the problem invariants.
    pub fn formulate_raw(
        expected_returns: Vec<f64>,
        covariance: Vec<Vec<f64>>,
        risk_aversion: f64,
    ) -> Result<Self, DomainError> {
        let problem = ProblemInstance::try_new(expected_returns, covariance, risk_aversion)?;
        Ok(Self::formulate(&problem))
    }

    /// Build a matrix from explicit coefficients, for tests and adapters.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidProblem`] if `coefficients` is not an
    /// `n * n` square.
    pub fn from_coefficients(n: usize, coefficients: Vec<f64>) -> Result<Self, DomainError> {
        if coefficients.len() != n * n {
            return Err(DomainError::InvalidProblem {
                reason: format!(
                    "expected {} coefficients for a {n}x{n} QUBO, got {}",
                    n * n,
                    coefficients.len()
                ),
            });
        }
        Ok(Self { n, coefficients })
    }

    /// Dimension of the matrix (number of binary variables).
    #[must_use]
    pub const fn size(&self) -> usize {
        self.n
    }

    /// Coefficient at `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.coefficients[i * self.n + j]
    }

    /// Exact quadratic form `xᵀQx` for a binary state.
    ///
    /// This is the energy every solver reports for its candidate; it is
    /// always evaluated exactly, never estimated.
    #[must_use]
    pub fn energy(&self, bits: &[u8]) -> f64 {
        debug_assert_eq!(bits.len(), self.n);
        let mut total = 0.0;
        for i in 0..self.n {
            if bits[i] == 0 {
                continue;
            }
            for j in 0..self.n {
                if bits[j] != 0 {
                    total += self.get(i, j);
                }
            }
        }
        total
    }

    /// Energy change from flipping a single bit, in O(n).
    ///
    /// Relies on symmetry: flipping bit `k` changes the energy by
    /// `±(Q[k][k] + 2·Σ_{j≠k, x_j=1} Q[k][j])`.
    #[must_use]
    pub fn flip_delta(&self, bits: &[u8], k: usize) -> f64 {
        let mut cross = 0.0;
        for j in 0..self.n {
            if j != k && bits[j] != 0 {
                cross += self.get(k, j);
            }
        }
        let magnitude = self.get(k, k) + 2.0 * cross;
        if bits[k] == 0 {
            magnitude
        } else {
            -magnitude
        }
    }

    /// Whether the matrix is symmetric within the given tolerance.
    #[must_use]
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                if (self.get(i, j) - self.get(j, i)).abs() > tolerance {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_asset() -> ProblemInstance {
        ProblemInstance::try_new(
            vec![0.10, 0.15, 0.12],
            vec![
                vec![0.040, 0.012, 0.006],
                vec![0.012, 0.090, 0.015],
                vec![0.006, 0.015, 0.060],
            ],
            2.5,
        )
        .unwrap()
    }

    #[test]
    fn diagonal_follows_return_risk_tradeoff() {
        let problem = three_asset();
        let qubo = QuboMatrix::formulate(&problem);
        for i in 0..3 {
            let expected =
                problem.risk_aversion() * problem.expected_returns()[i] - problem.covariance()[i][i];
            assert!((qubo.get(i, i) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn off_diagonal_is_negated_covariance() {
        let problem = three_asset();
        let qubo = QuboMatrix::formulate(&problem);
        assert!((qubo.get(0, 1) + 0.012).abs() < 1e-12);
        assert!((qubo.get(2, 1) + 0.015).abs() < 1e-12);
    }

    #[test]
    fn formulated_matrix_is_symmetric() {
        let qubo = QuboMatrix::formulate(&three_asset());
        assert!(qubo.is_symmetric(1e-12));
    }

    #[test]
    fn formulate_raw_rejects_bad_shapes() {
        let result = QuboMatrix::formulate_raw(vec![0.1, 0.2], vec![vec![0.04]], 1.0);
        assert!(matches!(result, Err(DomainError::InvalidProblem { .. })));
    }

    #[test]
    fn energy_is_exact_quadratic_form() {
        let qubo = QuboMatrix::from_coefficients(2, vec![1.0, -0.5, -0.5, 2.0]).unwrap();
        assert_eq!(qubo.energy(&[0, 0]), 0.0);
        assert_eq!(qubo.energy(&[1, 0]), 1.0);
        assert_eq!(qubo.energy(&[0, 1]), 2.0);
        // 1 + 2 - 0.5 - 0.5
        assert_eq!(qubo.energy(&[1, 1]), 2.0);
    }

    #[test]
    fn flip_delta_matches_recomputed_energy() {
        let qubo = QuboMatrix::formulate(&three_asset());
        let mut bits = vec![1, 0, 1];
        let before = qubo.energy(&bits);
        for k in 0..3 {
            let delta = qubo.flip_delta(&bits, k);
            bits[k] ^= 1;
            let after = qubo.energy(&bits);
            assert!(
                (after - (before + delta)).abs() < 1e-12,
                "flip {k}: delta {delta} but energy went {before} -> {after}"
            );
            bits[k] ^= 1;
        }
    }
}
