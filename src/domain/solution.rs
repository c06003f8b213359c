//! Solver outputs: binary and continuous solutions, per-run results, and
//! the session report the orchestrator assembles.

use serde::Serialize;

use super::error::DomainError;

/// A binary asset-selection vector paired with its exact QUBO energy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinarySolution {
    /// One bit per asset: 1 = include, 0 = exclude.
    pub bits: Vec<u8>,
    /// Exact quadratic form `xᵀQx` for `bits`.
    pub energy: f64,
}

impl BinarySolution {
    /// Create a solution, asserting every element is a valid bit.
    #[must_use]
    pub fn new(bits: Vec<u8>, energy: f64) -> Self {
        debug_assert!(bits.iter().all(|b| *b <= 1));
        Self { bits, energy }
    }
}

/// Continuous portfolio weights from the classical mean-variance path.
///
/// Weights are normalized to sum to 1 on construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuousWeights {
    weights: Vec<f64>,
}

impl ContinuousWeights {
    /// Normalize raw weights to sum to 1.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidProblem`] when the weights are empty
    /// or their sum is zero or non-finite, making normalization undefined.
    pub fn normalized(raw: Vec<f64>) -> Result<Self, DomainError> {
        if raw.is_empty() {
            return Err(DomainError::EmptyInput { what: "weights" });
        }
        let sum: f64 = raw.iter().sum();
        if !sum.is_finite() || sum.abs() < f64::EPSILON {
            return Err(DomainError::InvalidProblem {
                reason: format!("weights sum to {sum}, cannot normalize"),
            });
        }
        let weights = raw.into_iter().map(|w| w / sum).collect();
        Ok(Self { weights })
    }

    /// Normalized weights, summing to 1.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

/// Either kind of solver output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Solution {
    /// Binary inclusion/exclusion vector from a QUBO solver.
    Binary(BinarySolution),
    /// Continuous weights from the classical path.
    Continuous(ContinuousWeights),
}

/// The outcome of one solver run. Created fresh per run, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverResult {
    /// Name of the solver that produced this result.
    pub solver: String,
    /// The candidate solution.
    pub solution: Solution,
    /// Objective value; lower is better.
    pub objective: f64,
}

impl SolverResult {
    /// Build a result for a binary solution; the objective is its energy.
    #[must_use]
    pub fn binary(solver: impl Into<String>, solution: BinarySolution) -> Self {
        let objective = solution.energy;
        Self {
            solver: solver.into(),
            solution: Solution::Binary(solution),
            objective,
        }
    }

    /// Build a result for continuous weights with an explicit objective.
    #[must_use]
    pub fn continuous(
        solver: impl Into<String>,
        weights: ContinuousWeights,
        objective: f64,
    ) -> Self {
        Self {
            solver: solver.into(),
            solution: Solution::Continuous(weights),
            objective,
        }
    }
}

/// A solver the orchestrator excluded from the session, with the
/// recoverable error that caused the exclusion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSolver {
    /// Name of the skipped solver.
    pub solver: String,
    /// Rendered error message.
    pub reason: String,
}

/// Aggregated outcome of one optimization session.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct OptimizationReport {
    /// Results from every solver that completed.
    pub results: Vec<SolverResult>,
    /// Solvers excluded due to recoverable errors.
    pub skipped: Vec<SkippedSolver>,
    best: Option<usize>,
}

impl OptimizationReport {
    /// Assemble a report, selecting the minimum-objective result as best.
    ///
    /// Selection is a commutative min over the result set, so the order in
    /// which solvers completed does not matter.
    #[must_use]
    pub fn new(results: Vec<SolverResult>, skipped: Vec<SkippedSolver>) -> Self {
        let best = results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.objective.is_finite())
            .min_by(|(_, a), (_, b)| {
                a.objective
                    .partial_cmp(&b.objective)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(idx, _)| idx);
        Self {
            results,
            skipped,
            best,
        }
    }

    /// The primary recommendation: the result with the lowest objective.
    #[must_use]
    pub fn best(&self) -> Option<&SolverResult> {
        self.best.and_then(|idx| self.results.get(idx))
    }
}
