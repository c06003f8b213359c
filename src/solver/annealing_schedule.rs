//! Quantum-annealing-style schedule solver.
//!
//! The schedule starts at temperature 1.0 and decays geometrically while a
//! single-flip Metropolis walk transitions between binary states. Unlike
//! the classical annealer, the externally observable contract is only the
//! final state: a binary vector of the QUBO's dimension, scored with the
//! exact quadratic form. Worsening moves become vanishingly likely as the
//! temperature decays, so the walk makes progress toward lower energy on
//! average.

use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use super::{random_state, Solver, SolverContext};
use crate::domain::{BinarySolution, DomainError, QuboMatrix, SolverResult};

/// Starting temperature for every schedule run.
const INITIAL_TEMPERATURE: f64 = 1.0;

/// Temperature floor ending the schedule.
const MIN_TEMPERATURE: f64 = 1e-6;

/// Configuration for the annealing schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnealingScheduleConfig {
    /// Number of schedule steps.
    #[serde(default = "default_steps")]
    pub steps: usize,

    /// Geometric temperature decay per step, strictly between 0 and 1.
    #[serde(default = "default_decay")]
    pub decay: f64,
}

fn default_steps() -> usize {
    5_000
}

fn default_decay() -> f64 {
    0.997
}

impl Default for AnnealingScheduleConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            decay: default_decay(),
        }
    }
}

/// Annealing-schedule solver over QUBO instances.
pub struct AnnealingScheduleSolver {
    config: AnnealingScheduleConfig,
}

impl AnnealingScheduleSolver {
    pub(crate) const NAME: &'static str = "annealing_schedule";

    /// Create a solver with the given configuration.
    #[must_use]
    pub const fn new(config: AnnealingScheduleConfig) -> Self {
        Self { config }
    }

    /// Get the solver configuration.
    #[must_use]
    pub const fn config(&self) -> &AnnealingScheduleConfig {
        &self.config
    }

    /// Run the schedule and return the final binary state with its exact
    /// energy.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotConfigured`] for an invalid decay factor
    /// or a zero-step schedule.
    pub fn solve_qubo(
        &self,
        qubo: &QuboMatrix,
        ctx: &SolverContext,
    ) -> Result<BinarySolution, DomainError> {
        if self.config.steps == 0 {
            return Err(self.misconfigured("steps must be positive"));
        }
        if !(self.config.decay > 0.0 && self.config.decay < 1.0) {
            return Err(self.misconfigured("decay must be in (0, 1)"));
        }

        let n = qubo.size();
        let mut rng = ctx.rng();
        let mut state = random_state(&mut rng, n);
        let mut energy = qubo.energy(&state);
        let mut temperature = INITIAL_TEMPERATURE;

        for step in 0..self.config.steps {
            if ctx.expired() {
                debug!(step, energy, "deadline hit, returning current state");
                break;
            }

            let k = rng.gen_range(0..n);
            let delta = qubo.flip_delta(&state, k);
            if delta < 0.0 || rng.gen::<f64>() < (-delta / temperature).exp() {
                state[k] ^= 1;
                energy += delta;
            }

            temperature *= self.config.decay;
            if temperature < MIN_TEMPERATURE {
                break;
            }
        }

        // Report the exact quadratic form of the final state, not the
        // incrementally tracked value.
        let energy = qubo.energy(&state);
        Ok(BinarySolution::new(state, energy))
    }

    fn misconfigured(&self, reason: &str) -> DomainError {
        DomainError::NotConfigured {
            solver: Self::NAME,
            reason: reason.into(),
        }
    }
}

impl Solver for AnnealingScheduleSolver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn solve(&self, qubo: &QuboMatrix, ctx: &SolverContext) -> Result<SolverResult, DomainError> {
        let solution = self.solve_qubo(qubo, ctx)?;
        Ok(SolverResult::binary(Self::NAME, solution))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn qubo(n: usize) -> QuboMatrix {
        // Diagonal -1, off-diagonal 0.5, matching the classic small QUBO
        // exercise: favors sparse selections.
        let mut coefficients = vec![0.5; n * n];
        for i in 0..n {
            coefficients[i * n + i] = -1.0;
        }
        QuboMatrix::from_coefficients(n, coefficients).unwrap()
    }

    #[test]
    fn returns_valid_binary_state_of_matching_length() {
        let solver = AnnealingScheduleSolver::new(AnnealingScheduleConfig::default());
        for n in 1..=6 {
            let qubo = qubo(n);
            let solution = solver.solve_qubo(&qubo, &SolverContext::seeded(n as u64)).unwrap();
            assert_eq!(solution.bits.len(), n);
            assert!(solution.bits.iter().all(|b| *b == 0 || *b == 1));
        }
    }

    #[test]
    fn energy_matches_exact_quadratic_form() {
        let solver = AnnealingScheduleSolver::new(AnnealingScheduleConfig::default());
        let qubo = qubo(4);
        let solution = solver.solve_qubo(&qubo, &SolverContext::seeded(7)).unwrap();
        assert!((solution.energy - qubo.energy(&solution.bits)).abs() < 1e-9);
    }

    #[test]
    fn converges_to_single_selection_on_small_instance() {
        // For diag -1 / off-diag 0.5 the optimum selects exactly one bit.
        let solver = AnnealingScheduleSolver::new(AnnealingScheduleConfig {
            steps: 4_000,
            decay: 0.998,
        });
        let qubo = qubo(4);
        let solution = solver.solve_qubo(&qubo, &SolverContext::seeded(21)).unwrap();
        assert!((solution.energy - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn identical_seeds_reproduce_the_final_state() {
        let solver = AnnealingScheduleSolver::new(AnnealingScheduleConfig::default());
        let qubo = qubo(5);
        let a = solver.solve_qubo(&qubo, &SolverContext::seeded(13)).unwrap();
        let b = solver.solve_qubo(&qubo, &SolverContext::seeded(13)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn expired_deadline_still_returns_a_full_state() {
        let solver = AnnealingScheduleSolver::new(AnnealingScheduleConfig::default());
        let qubo = qubo(5);
        let ctx = SolverContext::seeded(2).with_deadline(Instant::now());
        let solution = solver.solve_qubo(&qubo, &ctx).unwrap();
        assert_eq!(solution.bits.len(), 5);
        assert!(solution.bits.iter().all(|b| *b == 0 || *b == 1));
        assert!((solution.energy - qubo.energy(&solution.bits)).abs() < 1e-9);
    }

    #[test]
    fn rejects_invalid_decay() {
        let solver = AnnealingScheduleSolver::new(AnnealingScheduleConfig {
            steps: 10,
            decay: 0.0,
        });
        let result = solver.solve_qubo(&qubo(2), &SolverContext::seeded(0));
        assert!(matches!(result, Err(DomainError::NotConfigured { .. })));
    }
}
