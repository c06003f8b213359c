//! Grover-style amplitude amplification over an index space.
//!
//! This is a classical heuristic that mirrors the shape of Grover's
//! algorithm, not a state-vector simulation: candidates are plain real
//! values indexed `0..2^n`, the oracle flips the sign of marked indices,
//! and diffusion reflects every value about the mean (`v <- 2*mean - v`).
//! The iteration count is the Grover-style `floor(sqrt(2^n))`.
//!
//! The externally observable [`search`] contract is deliberately mundane:
//! a linear scan of the supplied database for the target value, returning
//! `None` when absent. Amplification bookkeeping never changes that
//! answer.
//!
//! [`search`]: AmplitudeSearchSolver::search

use serde::Deserialize;
use tracing::debug;

use super::{Solver, SolverContext};
use crate::domain::{BinarySolution, DomainError, QuboMatrix, SolverResult};

/// Configuration for amplitude search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmplitudeSearchConfig {
    /// Indices the oracle marks. Out-of-range entries are ignored; an
    /// empty list degenerates the oracle to a no-op.
    #[serde(default)]
    pub marked_indices: Vec<usize>,
}

/// Grover-style search solver.
pub struct AmplitudeSearchSolver {
    config: AmplitudeSearchConfig,
}

impl AmplitudeSearchSolver {
    pub(crate) const NAME: &'static str = "amplitude_search";

    /// Create a solver with the given configuration.
    #[must_use]
    pub const fn new(config: AmplitudeSearchConfig) -> Self {
        Self { config }
    }

    /// Get the solver configuration.
    #[must_use]
    pub const fn config(&self) -> &AmplitudeSearchConfig {
        &self.config
    }

    /// Find the index of the first occurrence of `target` in `database`.
    ///
    /// Linear scan; `None` is the not-found sentinel.
    #[must_use]
    pub fn search(&self, database: &[i64], target: i64) -> Option<usize> {
        database.iter().position(|value| *value == target)
    }

    /// Run the amplification loop over the `2^num_qubits` index space and
    /// return the final candidate values.
    ///
    /// Runs exactly `floor(sqrt(2^num_qubits))` iterations regardless of
    /// how many indices are marked, including none.
    #[must_use]
    pub fn amplify(&self, num_qubits: u32, ctx: &SolverContext) -> Vec<f64> {
        let space = 1usize << num_qubits;
        let iterations = (space as f64).sqrt().floor() as usize;
        let mut candidates: Vec<f64> = (0..space).map(|i| i as f64).collect();

        for iteration in 0..iterations {
            if ctx.expired() {
                debug!(iteration, "deadline hit, stopping amplification");
                break;
            }
            self.apply_oracle(&mut candidates);
            apply_diffusion(&mut candidates);
        }
        candidates
    }

    /// Oracle step: negate the sign of every marked candidate.
    fn apply_oracle(&self, candidates: &mut [f64]) {
        for &index in &self.config.marked_indices {
            if let Some(value) = candidates.get_mut(index) {
                *value = -*value;
            }
        }
    }
}

/// Diffusion step: reflect every value about the mean of all values.
fn apply_diffusion(candidates: &mut [f64]) {
    if candidates.is_empty() {
        return;
    }
    let mean = candidates.iter().sum::<f64>() / candidates.len() as f64;
    for value in candidates.iter_mut() {
        *value = 2.0 * mean - *value;
    }
}

impl Solver for AmplitudeSearchSolver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Adapt amplification to the QUBO surface: amplify over the full
    /// `2^n` assignment space, take the first negatively signed candidate
    /// as the heuristically amplified marked index, decode it to bits, and
    /// score with the exact quadratic form. With nothing amplified the
    /// solver falls back to the all-zero portfolio.
    fn solve(&self, qubo: &QuboMatrix, ctx: &SolverContext) -> Result<SolverResult, DomainError> {
        let n = qubo.size();
        // Enumeration is exponential in n; refuse anything that would not
        // fit comfortably in memory. The instance itself is still valid,
        // so the refusal is recoverable and the session continues.
        if n > 24 {
            return Err(DomainError::Unsupported {
                solver: Self::NAME,
                reason: format!("cannot enumerate a 2^{n} index space"),
            });
        }

        let candidates = self.amplify(n as u32, ctx);
        let amplified = candidates.iter().position(|v| *v < 0.0);
        let index = amplified.unwrap_or(0);
        let bits = decode_bits(index, n);
        let energy = qubo.energy(&bits);
        Ok(SolverResult::binary(Self::NAME, BinarySolution::new(bits, energy)))
    }
}

/// Decode an index into its n-bit binary assignment, LSB first.
fn decode_bits(index: usize, n: usize) -> Vec<u8> {
    (0..n).map(|bit| ((index >> bit) & 1) as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_finds_target_index() {
        let solver = AmplitudeSearchSolver::new(AmplitudeSearchConfig::default());
        assert_eq!(solver.search(&[0, 0, 1, 0, 0], 1), Some(2));
    }

    #[test]
    fn search_returns_none_when_absent() {
        let solver = AmplitudeSearchSolver::new(AmplitudeSearchConfig::default());
        assert_eq!(solver.search(&[0, 0, 0, 0, 0], 1), None);
    }

    #[test]
    fn amplify_runs_fixed_iteration_count_with_empty_marks() {
        let solver = AmplitudeSearchSolver::new(AmplitudeSearchConfig::default());
        let candidates = solver.amplify(3, &SolverContext::seeded(0));
        assert_eq!(candidates.len(), 8);
        // Mean-reflection preserves the mean of 0..8.
        let mean = candidates.iter().sum::<f64>() / 8.0;
        assert!((mean - 3.5).abs() < 1e-9);
    }

    #[test]
    fn oracle_flips_marked_candidates() {
        let solver = AmplitudeSearchSolver::new(AmplitudeSearchConfig {
            marked_indices: vec![1, 99],
        });
        let mut candidates = vec![1.0, 2.0, 3.0];
        solver.apply_oracle(&mut candidates);
        // Out-of-range mark 99 is ignored.
        assert_eq!(candidates, vec![1.0, -2.0, 3.0]);
    }

    #[test]
    fn diffusion_reflects_about_mean() {
        let mut candidates = vec![0.0, 2.0, 4.0];
        apply_diffusion(&mut candidates);
        assert_eq!(candidates, vec![4.0, 2.0, 0.0]);
    }

    #[test]
    fn decode_bits_is_lsb_first() {
        assert_eq!(decode_bits(5, 4), vec![1, 0, 1, 0]);
    }

    #[test]
    fn solve_reports_exact_energy_for_decoded_state() {
        let solver = AmplitudeSearchSolver::new(AmplitudeSearchConfig {
            marked_indices: vec![5],
        });
        let qubo = QuboMatrix::from_coefficients(
            3,
            vec![-1.0, 0.2, -0.1, 0.2, 0.8, 0.3, -0.1, 0.3, -0.9],
        )
        .unwrap();
        let result = solver.solve(&qubo, &SolverContext::seeded(0)).unwrap();
        let crate::domain::Solution::Binary(solution) = &result.solution else {
            panic!("amplitude search returns binary solutions");
        };
        assert_eq!(solution.bits.len(), 3);
        assert_eq!(qubo.energy(&solution.bits), result.objective);
    }

    #[test]
    fn oversized_index_space_is_refused_recoverably() {
        let solver = AmplitudeSearchSolver::new(AmplitudeSearchConfig::default());
        let qubo = QuboMatrix::from_coefficients(25, vec![0.0; 625]).unwrap();
        match solver.solve(&qubo, &SolverContext::seeded(0)) {
            Err(err @ DomainError::Unsupported { .. }) => assert!(err.is_recoverable()),
            other => panic!("expected a recoverable refusal, got {other:?}"),
        }
    }

    #[test]
    fn solve_with_no_marks_falls_back_without_panicking() {
        let solver = AmplitudeSearchSolver::new(AmplitudeSearchConfig::default());
        let qubo = QuboMatrix::from_coefficients(2, vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let result = solver.solve(&qubo, &SolverContext::seeded(0)).unwrap();
        assert!(result.objective.is_finite());
    }
}
