//! Simulated annealing over binary states.
//!
//! Single-bit-flip neighborhood with Metropolis acceptance and geometric
//! cooling. The solver always returns the best state seen across the whole
//! run, not the final one: the returned energy equals the minimum `xᵀQx`
//! among all visited states.

use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use super::{random_state, Solver, SolverContext};
use crate::domain::{BinarySolution, DomainError, QuboMatrix, SolverResult};

/// Temperature floor below which the schedule terminates.
const MIN_TEMPERATURE: f64 = 1e-6;

/// Configuration for simulated annealing.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatedAnnealingConfig {
    /// Maximum number of flip proposals.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Starting temperature; must be positive.
    #[serde(default = "default_initial_temperature")]
    pub initial_temperature: f64,

    /// Geometric cooling factor, strictly between 0 and 1.
    #[serde(default = "default_cooling_rate")]
    pub cooling_rate: f64,
}

fn default_max_iterations() -> usize {
    10_000
}

fn default_initial_temperature() -> f64 {
    10.0
}

fn default_cooling_rate() -> f64 {
    0.995
}

impl Default for SimulatedAnnealingConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            initial_temperature: default_initial_temperature(),
            cooling_rate: default_cooling_rate(),
        }
    }
}

impl SimulatedAnnealingConfig {
    fn validate(&self) -> Result<(), DomainError> {
        if self.max_iterations == 0 {
            return Err(misconfigured("max_iterations must be positive"));
        }
        if !(self.initial_temperature > 0.0) {
            return Err(misconfigured("initial_temperature must be positive"));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(misconfigured("cooling_rate must be in (0, 1)"));
        }
        Ok(())
    }
}

fn misconfigured(reason: &str) -> DomainError {
    DomainError::NotConfigured {
        solver: SimulatedAnnealingSolver::NAME,
        reason: reason.into(),
    }
}

/// Seed for the proposal walk's generator. The orchestrator hands out
/// consecutive seeds per registry slot, so the walk stream is mixed with
/// a 64-bit constant rather than offset by a small increment that would
/// collide with a neighboring solver's stream.
const fn walk_seed(seed: u64) -> u64 {
    seed ^ 0x9E37_79B9_7F4A_7C15
}

/// Metropolis simulated annealing solver.
pub struct SimulatedAnnealingSolver {
    config: SimulatedAnnealingConfig,
}

impl SimulatedAnnealingSolver {
    pub(crate) const NAME: &'static str = "simulated_annealing";

    /// Create a solver with the given configuration.
    #[must_use]
    pub const fn new(config: SimulatedAnnealingConfig) -> Self {
        Self { config }
    }

    /// Get the solver configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulatedAnnealingConfig {
        &self.config
    }

    /// Anneal starting from a caller-supplied state.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotConfigured`] for invalid configuration
    /// and [`DomainError::InvalidProblem`] when the initial state's length
    /// does not match the matrix.
    pub fn solve_from(
        &self,
        qubo: &QuboMatrix,
        initial: Vec<u8>,
        ctx: &SolverContext,
    ) -> Result<BinarySolution, DomainError> {
        self.config.validate()?;
        let n = qubo.size();
        if initial.len() != n {
            return Err(DomainError::InvalidProblem {
                reason: format!("initial state has {} bits for a {n}-variable QUBO", initial.len()),
            });
        }

        let mut rng = ctx.rng();
        let mut state = initial;
        let mut energy = qubo.energy(&state);
        let mut best_state = state.clone();
        let mut best_energy = energy;
        let mut temperature = self.config.initial_temperature;

        for iteration in 0..self.config.max_iterations {
            if ctx.expired() {
                debug!(iteration, best_energy, "deadline hit, returning best-seen");
                break;
            }

            let k = rng.gen_range(0..n);
            let delta = qubo.flip_delta(&state, k);

            // Metropolis criterion: always accept improvements, accept
            // worsening moves with probability exp(-delta / T).
            let accept = delta < 0.0 || rng.gen::<f64>() < (-delta / temperature).exp();
            if accept {
                state[k] ^= 1;
                energy += delta;
                if energy < best_energy {
                    best_energy = energy;
                    best_state.copy_from_slice(&state);
                }
            }

            temperature *= self.config.cooling_rate;
            if temperature < MIN_TEMPERATURE {
                break;
            }
        }

        // Incremental deltas track the walk; the reported energy is the
        // exact quadratic form of the chosen state.
        let best_energy = qubo.energy(&best_state);
        Ok(BinarySolution::new(best_state, best_energy))
    }
}

impl Solver for SimulatedAnnealingSolver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn solve(&self, qubo: &QuboMatrix, ctx: &SolverContext) -> Result<SolverResult, DomainError> {
        self.config.validate()?;
        let initial = random_state(&mut ctx.rng(), qubo.size());
        // Distinct stream for the walk so the initial state and the
        // proposal sequence stay independent.
        let walk_ctx = SolverContext {
            seed: walk_seed(ctx.seed),
            deadline: ctx.deadline,
        };
        let solution = self.solve_from(qubo, initial, &walk_ctx)?;
        Ok(SolverResult::binary(Self::NAME, solution))
    }
}
