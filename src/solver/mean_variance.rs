//! Classical continuous mean-variance path.
//!
//! Gradient descent on the Markowitz objective `f(w) = wᵀΣw − λ·μᵀw`,
//! renormalizing the weights to sum to 1 after every step. This is the
//! only solver that consumes the raw [`ProblemInstance`] rather than the
//! QUBO formulation, and the only one producing [`ContinuousWeights`].

use serde::Deserialize;
use tracing::debug;

use super::SolverContext;
use crate::domain::{ContinuousWeights, DomainError, ProblemInstance, SolverResult};

/// Configuration for the continuous gradient-descent solver.
#[derive(Debug, Clone, Deserialize)]
pub struct MeanVarianceConfig {
    /// Gradient-descent step size.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Maximum descent iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_learning_rate() -> f64 {
    0.01
}

fn default_max_iterations() -> usize {
    1_000
}

impl Default for MeanVarianceConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Continuous Markowitz solver.
pub struct MeanVarianceSolver {
    config: MeanVarianceConfig,
}

impl MeanVarianceSolver {
    pub(crate) const NAME: &'static str = "mean_variance";

    /// Create a solver with the given configuration.
    #[must_use]
    pub const fn new(config: MeanVarianceConfig) -> Self {
        Self { config }
    }

    /// Get the solver configuration.
    #[must_use]
    pub const fn config(&self) -> &MeanVarianceConfig {
        &self.config
    }

    /// Minimize the mean-variance objective over weight vectors summing
    /// to 1, starting from the equal-weight portfolio.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotConfigured`] for an invalid step size and
    /// [`DomainError::InvalidProblem`] if renormalization degenerates.
    pub fn optimize(
        &self,
        problem: &ProblemInstance,
        ctx: &SolverContext,
    ) -> Result<SolverResult, DomainError> {
        if !(self.config.learning_rate > 0.0) {
            return Err(DomainError::NotConfigured {
                solver: Self::NAME,
                reason: "learning_rate must be positive".into(),
            });
        }

        let n = problem.num_assets();
        let mut weights = vec![1.0 / n as f64; n];
        let mut objective = problem.mean_variance_objective(&weights);

        for iteration in 0..self.config.max_iterations {
            if ctx.expired() {
                debug!(iteration, objective, "deadline hit, stopping descent");
                break;
            }

            let gradient = self.gradient(problem, &weights);
            let mut proposal: Vec<f64> = weights
                .iter()
                .zip(&gradient)
                .map(|(w, g)| w - self.config.learning_rate * g)
                .collect();
            let sum: f64 = proposal.iter().sum();
            if !sum.is_finite() || sum.abs() < f64::EPSILON {
                // A step that would make normalization undefined is
                // discarded; the previous iterate stands.
                break;
            }
            for w in &mut proposal {
                *w /= sum;
            }

            let proposed_objective = problem.mean_variance_objective(&proposal);
            if proposed_objective >= objective {
                break;
            }
            weights = proposal;
            objective = proposed_objective;
        }

        let solution = ContinuousWeights::normalized(weights)?;
        Ok(SolverResult::continuous(Self::NAME, solution, objective))
    }

    /// Gradient of `wᵀΣw − λ·μᵀw`: `2Σw − λμ`.
    fn gradient(&self, problem: &ProblemInstance, weights: &[f64]) -> Vec<f64> {
        let n = problem.num_assets();
        let cov = problem.covariance();
        let returns = problem.expected_returns();
        let lambda = problem.risk_aversion();
        (0..n)
            .map(|i| {
                let sigma_w: f64 = (0..n).map(|j| cov[i][j] * weights[j]).sum();
                2.0 * sigma_w - lambda * returns[i]
            })
            .collect()
    }
}
