//! VQE-style variational minimization of a linear Hamiltonian.
//!
//! The Hamiltonian here is a coefficient vector defining a linear energy
//! functional `E(p) = Σ h[i] * p[i]`; its gradient is the Hamiltonian
//! itself, constant with respect to the parameters. [`HamiltonianCost`]
//! exposes `value` and `gradient` as pure functions so any gradient-based
//! optimizer can reuse them; the solver ships a plain gradient-descent
//! minimizer standing in for the reference Levenberg-Marquardt. The
//! optimizer works on a private copy of the parameters and never mutates
//! the Hamiltonian.

use serde::Deserialize;
use tracing::debug;

use super::{Solver, SolverContext};
use crate::domain::{BinarySolution, DomainError, QuboMatrix, SolverResult};

/// Convergence threshold for the local minimizer, matching the classical
/// gradient-descent stop condition.
const CONVERGENCE_THRESHOLD: f64 = 1e-6;

/// Pure cost-function view over a stored Hamiltonian.
#[derive(Debug, Clone, PartialEq)]
pub struct HamiltonianCost {
    hamiltonian: Vec<f64>,
}

impl HamiltonianCost {
    /// Wrap a Hamiltonian coefficient vector.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyInput`] for an empty vector.
    pub fn new(hamiltonian: Vec<f64>) -> Result<Self, DomainError> {
        if hamiltonian.is_empty() {
            return Err(DomainError::EmptyInput {
                what: "hamiltonian",
            });
        }
        Ok(Self { hamiltonian })
    }

    /// The stored coefficients.
    #[must_use]
    pub fn hamiltonian(&self) -> &[f64] {
        &self.hamiltonian
    }

    /// Linear energy functional `Σ h[i] * params[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DimensionMismatch`] when `params` has a
    /// different length than the Hamiltonian.
    pub fn value(&self, params: &[f64]) -> Result<f64, DomainError> {
        self.check_dimensions(params)?;
        Ok(self
            .hamiltonian
            .iter()
            .zip(params)
            .map(|(h, p)| h * p)
            .sum())
    }

    /// Gradient of the functional: the Hamiltonian vector itself,
    /// independent of `params`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DimensionMismatch`] when `params` has a
    /// different length than the Hamiltonian.
    pub fn gradient(&self, params: &[f64]) -> Result<Vec<f64>, DomainError> {
        self.check_dimensions(params)?;
        Ok(self.hamiltonian.clone())
    }

    fn check_dimensions(&self, params: &[f64]) -> Result<(), DomainError> {
        if params.is_empty() {
            return Err(DomainError::EmptyInput { what: "params" });
        }
        if params.len() != self.hamiltonian.len() {
            return Err(DomainError::DimensionMismatch {
                expected: self.hamiltonian.len(),
                actual: params.len(),
            });
        }
        Ok(())
    }
}

/// Configuration for the variational minimizer.
#[derive(Debug, Clone, Deserialize)]
pub struct VariationalConfig {
    /// Gradient-descent step size.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Maximum optimizer iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_learning_rate() -> f64 {
    0.05
}

fn default_max_iterations() -> usize {
    200
}

impl Default for VariationalConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// VQE-style solver over linear Hamiltonians.
pub struct VariationalSolver {
    config: VariationalConfig,
}

impl VariationalSolver {
    pub(crate) const NAME: &'static str = "variational";

    /// Create a solver with the given configuration.
    #[must_use]
    pub const fn new(config: VariationalConfig) -> Self {
        Self { config }
    }

    /// Get the solver configuration.
    #[must_use]
    pub const fn config(&self) -> &VariationalConfig {
        &self.config
    }

    /// Evaluate the linear functional for a Hamiltonian/parameter pair
    /// without optimizing.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyInput`] or
    /// [`DomainError::DimensionMismatch`] on malformed inputs.
    pub fn evaluate_hamiltonian(
        &self,
        hamiltonian: &[f64],
        params: &[f64],
    ) -> Result<f64, DomainError> {
        HamiltonianCost::new(hamiltonian.to_vec())?.value(params)
    }

    /// Minimize the energy functional from the given starting parameters
    /// and return the optimized energy.
    ///
    /// The Hamiltonian is read-only throughout; the optimizer mutates only
    /// its private copy of the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyInput`] when either vector is empty and
    /// [`DomainError::DimensionMismatch`] when their lengths differ.
    pub fn compute_ground_state_energy(
        &self,
        hamiltonian: &[f64],
        initial_params: &[f64],
    ) -> Result<f64, DomainError> {
        let (params, cost) = self.optimize_parameters(hamiltonian, initial_params)?;
        cost.value(&params)
    }

    /// Run the local minimizer and return the optimized parameters along
    /// with the cost function.
    fn optimize_parameters(
        &self,
        hamiltonian: &[f64],
        initial_params: &[f64],
    ) -> Result<(Vec<f64>, HamiltonianCost), DomainError> {
        if initial_params.is_empty() {
            return Err(DomainError::EmptyInput { what: "params" });
        }
        let cost = HamiltonianCost::new(hamiltonian.to_vec())?;
        let mut params = initial_params.to_vec();
        // Validates the dimension match before the first step.
        cost.value(&params)?;

        for iteration in 0..self.config.max_iterations {
            let gradient = cost.gradient(&params)?;
            for (p, g) in params.iter_mut().zip(&gradient) {
                *p -= self.config.learning_rate * g;
            }
            let energy = cost.value(&params)?;
            if energy < CONVERGENCE_THRESHOLD {
                debug!(iteration, energy, "variational minimizer converged");
                break;
            }
        }
        Ok((params, cost))
    }
}

impl Solver for VariationalSolver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Adapt the linear-Hamiltonian path to the QUBO surface: the QUBO
    /// diagonal acts as the Hamiltonian, parameters start at 0.5, and the
    /// optimized parameters binarize by comparison against that starting
    /// point (descent pushes the parameter up exactly when including the
    /// asset lowers the diagonal energy). The reported energy is the exact
    /// quadratic form of the binarized state.
    fn solve(&self, qubo: &QuboMatrix, _ctx: &SolverContext) -> Result<SolverResult, DomainError> {
        let n = qubo.size();
        let hamiltonian: Vec<f64> = (0..n).map(|i| qubo.get(i, i)).collect();
        let initial = vec![0.5; n];
        let (params, _) = self.optimize_parameters(&hamiltonian, &initial)?;
        let bits: Vec<u8> = params.iter().map(|p| u8::from(*p > 0.5)).collect();
        let energy = qubo.energy(&bits);
        Ok(SolverResult::binary(Self::NAME, BinarySolution::new(bits, energy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_the_linear_functional() {
        let cost = HamiltonianCost::new(vec![1.0, -1.0, 0.5]).unwrap();
        let value = cost.value(&[2.0, 3.0, 4.0]).unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn gradient_equals_hamiltonian_regardless_of_params() {
        let cost = HamiltonianCost::new(vec![1.0, -1.0, 0.5]).unwrap();
        let at_origin = cost.gradient(&[0.0, 0.0, 0.0]).unwrap();
        let elsewhere = cost.gradient(&[9.0, -3.0, 7.5]).unwrap();
        assert_eq!(at_origin, vec![1.0, -1.0, 0.5]);
        assert_eq!(at_origin, elsewhere);
    }

    #[test]
    fn dimension_mismatch_is_rejected_everywhere() {
        let solver = VariationalSolver::new(VariationalConfig::default());
        let hamiltonian = [1.0, -1.0, 0.5];
        let short = [2.0, 3.0];

        let eval = solver.evaluate_hamiltonian(&hamiltonian, &short);
        assert!(matches!(
            eval,
            Err(DomainError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));

        let ground = solver.compute_ground_state_energy(&hamiltonian, &short);
        assert!(matches!(ground, Err(DomainError::DimensionMismatch { .. })));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let solver = VariationalSolver::new(VariationalConfig::default());
        assert!(matches!(
            solver.compute_ground_state_energy(&[], &[1.0]),
            Err(DomainError::EmptyInput { .. })
        ));
        assert!(matches!(
            solver.compute_ground_state_energy(&[1.0], &[]),
            Err(DomainError::EmptyInput { .. })
        ));
    }

    #[test]
    fn minimizer_lowers_the_energy() {
        let solver = VariationalSolver::new(VariationalConfig::default());
        let hamiltonian = [1.0, -1.0, 0.5];
        let initial = [2.0, 3.0, 4.0];
        let start = solver.evaluate_hamiltonian(&hamiltonian, &initial).unwrap();
        let optimized = solver
            .compute_ground_state_energy(&hamiltonian, &initial)
            .unwrap();
        assert!(optimized < start);
    }

    #[test]
    fn hamiltonian_is_not_mutated_by_optimization() {
        let solver = VariationalSolver::new(VariationalConfig::default());
        let hamiltonian = vec![0.3, -0.7];
        let before = hamiltonian.clone();
        let _ = solver
            .compute_ground_state_energy(&hamiltonian, &[1.0, 1.0])
            .unwrap();
        assert_eq!(hamiltonian, before);
    }

    #[test]
    fn solve_selects_assets_with_negative_diagonal() {
        // Diagonal [-1.0, 0.5]: descent raises the first parameter and
        // lowers the second, so only asset 0 is selected.
        let solver = VariationalSolver::new(VariationalConfig::default());
        let qubo = QuboMatrix::from_coefficients(2, vec![-1.0, 0.0, 0.0, 0.5]).unwrap();
        let result = solver.solve(&qubo, &SolverContext::seeded(0)).unwrap();
        let crate::domain::Solution::Binary(solution) = &result.solution else {
            panic!("variational solver returns binary solutions");
        };
        assert_eq!(solution.bits, vec![1, 0]);
        assert_eq!(result.objective, -1.0);
    }
}
