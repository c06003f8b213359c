//! Domain validation errors for problem construction and solver invocation.
//!
//! These errors are returned by `try_new` constructors and solver entry
//! points that validate their inputs. The orchestrator treats some of them
//! as recoverable (the offending solver is skipped and the failure recorded
//! in the report) and others as fatal to the whole session.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The problem instance is malformed: non-square or asymmetric
    /// covariance, dimension mismatch with the returns vector, or an
    /// invalid risk-aversion scalar. Fatal to formulation.
    #[error("invalid problem: {reason}")]
    InvalidProblem {
        /// Human-readable description of the violated invariant.
        reason: String,
    },

    /// A solver was invoked before its required parameters were set.
    /// Recoverable: the orchestrator skips the solver.
    #[error("solver '{solver}' invoked before configuration: {reason}")]
    NotConfigured {
        /// Name of the misconfigured solver.
        solver: &'static str,
        /// What was missing or inconsistent.
        reason: String,
    },

    /// Hamiltonian and parameter vectors have different lengths.
    #[error("dimension mismatch: hamiltonian has {expected} coefficients, got {actual} parameters")]
    DimensionMismatch {
        /// Expected length (the Hamiltonian's).
        expected: usize,
        /// Actual length of the parameter vector.
        actual: usize,
    },

    /// An input vector that must be non-empty was empty.
    #[error("empty input: {what}")]
    EmptyInput {
        /// Which input was empty.
        what: &'static str,
    },

    /// The problem is valid but beyond what this solver can handle.
    /// Recoverable: the orchestrator skips the solver.
    #[error("solver '{solver}' cannot handle this problem: {reason}")]
    Unsupported {
        /// Name of the incapable solver.
        solver: &'static str,
        /// Why the solver cannot run.
        reason: String,
    },
}

impl DomainError {
    /// Whether the orchestrator may recover by skipping the solver that
    /// produced this error. Formulation errors are never recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidProblem { .. })
    }
}
