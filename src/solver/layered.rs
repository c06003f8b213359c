//! QAOA-style layered variational heuristic.
//!
//! Parameterized by a depth `p` and two length-`p` angle vectors, gamma
//! (problem-Hamiltonian angles) and beta (mixer angles). The "circuit" is
//! a documented placeholder for true layered quantum evolution: it draws
//! one uniformly random bit per qubit and scores the assignment by its
//! 1-bit count. What this solver actually specifies is procedure, not
//! physics: parameters must be set, and must match the depth, before
//! [`optimize`] may run.
//!
//! [`optimize`]: LayeredHeuristicSolver::optimize

use serde::Deserialize;

use super::{random_state, Solver, SolverContext};
use crate::domain::{BinarySolution, DomainError, ProblemInstance, QuboMatrix, SolverResult};

/// Configuration for the layered heuristic.
#[derive(Debug, Clone, Deserialize)]
pub struct LayeredConfig {
    /// Number of layers `p`; must be positive.
    #[serde(default = "default_depth")]
    pub depth: usize,

    /// Problem-Hamiltonian angles, one per layer.
    #[serde(default)]
    pub gamma: Vec<f64>,

    /// Mixer angles, one per layer.
    #[serde(default)]
    pub beta: Vec<f64>,
}

fn default_depth() -> usize {
    1
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            gamma: Vec::new(),
            beta: Vec::new(),
        }
    }
}

/// Layered variational heuristic solver.
pub struct LayeredHeuristicSolver {
    num_qubits: usize,
    depth: usize,
    gamma: Vec<f64>,
    beta: Vec<f64>,
}

impl LayeredHeuristicSolver {
    pub(crate) const NAME: &'static str = "layered_heuristic";

    /// Create an unconfigured solver for `num_qubits` variables and
    /// `depth` layers. Parameters must be set before optimization.
    #[must_use]
    pub const fn new(num_qubits: usize, depth: usize) -> Self {
        Self {
            num_qubits,
            depth,
            gamma: Vec::new(),
            beta: Vec::new(),
        }
    }

    /// Build a solver from a configuration record.
    #[must_use]
    pub fn from_config(num_qubits: usize, config: LayeredConfig) -> Self {
        let mut solver = Self::new(num_qubits, config.depth);
        solver.set_parameters(config.gamma, config.beta);
        solver
    }

    /// Set the gamma and beta angle vectors.
    pub fn set_parameters(&mut self, gamma: Vec<f64>, beta: Vec<f64>) {
        self.gamma = gamma;
        self.beta = beta;
    }

    /// Check the procedural contract: both angle vectors set and matching
    /// the configured depth.
    fn check_configured(&self) -> Result<(), DomainError> {
        let misconfigured = |reason: String| DomainError::NotConfigured {
            solver: Self::NAME,
            reason,
        };
        if self.depth == 0 {
            return Err(misconfigured("depth must be positive".into()));
        }
        if self.gamma.is_empty() || self.beta.is_empty() {
            return Err(misconfigured("gamma/beta parameters not set".into()));
        }
        if self.gamma.len() != self.depth || self.beta.len() != self.depth {
            return Err(misconfigured(format!(
                "depth {} requires {} angles, got gamma={} beta={}",
                self.depth,
                self.depth,
                self.gamma.len(),
                self.beta.len()
            )));
        }
        Ok(())
    }

    /// Run the layered heuristic once and return its objective: the count
    /// of 1-bits in the sampled assignment.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotConfigured`] if parameters are unset or
    /// inconsistent with the depth.
    pub fn optimize(
        &self,
        _problem: &ProblemInstance,
        ctx: &SolverContext,
    ) -> Result<f64, DomainError> {
        self.check_configured()?;
        let bits = self.sample_assignment(ctx);
        Ok(bits.iter().map(|b| f64::from(*b)).sum())
    }

    /// Placeholder for layered circuit evolution: one random bit per
    /// qubit, drawn from the seeded context.
    fn sample_assignment(&self, ctx: &SolverContext) -> Vec<u8> {
        random_state(&mut ctx.rng(), self.num_qubits)
    }
}

impl Solver for LayeredHeuristicSolver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn solve(&self, qubo: &QuboMatrix, ctx: &SolverContext) -> Result<SolverResult, DomainError> {
        self.check_configured()?;
        if qubo.size() != self.num_qubits {
            return Err(DomainError::InvalidProblem {
                reason: format!(
                    "solver sized for {} qubits, QUBO has {}",
                    self.num_qubits,
                    qubo.size()
                ),
            });
        }
        let bits = self.sample_assignment(ctx);
        let energy = qubo.energy(&bits);
        Ok(SolverResult::binary(Self::NAME, BinarySolution::new(bits, energy)))
    }
}
