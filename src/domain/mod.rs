//! Core domain types: the portfolio problem, its QUBO formulation, and
//! solver outputs.
//!
//! Everything here is solver-agnostic and free of I/O. Construction goes
//! through validating `try_new`-style constructors so that downstream code
//! can rely on the shape invariants without re-checking them.

pub mod error;
pub mod problem;
pub mod qubo;
pub mod solution;

pub use error::DomainError;
pub use problem::{ProblemInstance, SYMMETRY_TOLERANCE};
pub use qubo::QuboMatrix;
pub use solution::{
    BinarySolution, ContinuousWeights, OptimizationReport, SkippedSolver, Solution, SolverResult,
};
