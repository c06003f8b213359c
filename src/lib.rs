//! qfolio - Quantum-inspired portfolio optimization over QUBO formulations.
//!
//! This crate formulates mean-variance portfolio selection as a Quadratic
//! Unconstrained Binary Optimization problem and solves it with a family
//! of interchangeable heuristic solvers. The "quantum" solvers are
//! classical heuristics that mimic the high-level behavior of their
//! namesake algorithms (oracle marking and diffusion, layered variational
//! search, annealing schedules, linear-Hamiltonian minimization) - not
//! physically faithful simulations.
//!
//! # Architecture
//!
//! Data flows one way: a validated [`domain::ProblemInstance`] is
//! formulated into a [`domain::QuboMatrix`], every registered solver
//! consumes the same read-only matrix, and the [`app::Orchestrator`]
//! selects the minimum-objective result.
//!
//! # Modules
//!
//! - [`domain`] - problem instance, QUBO formulation, solutions, reports
//! - [`solver`] - the [`solver::Solver`] trait and all implementations
//! - [`app`] - session orchestration
//! - [`config`] - TOML configuration with per-solver sections
//! - [`loader`] - flat-file returns/covariance loading
//! - [`cli`] - command-line surface
//! - [`error`] - crate error types
//!
//! # Example
//!
//! ```
//! use qfolio::app::Orchestrator;
//! use qfolio::domain::ProblemInstance;
//! use qfolio::solver::{SimulatedAnnealingConfig, SimulatedAnnealingSolver, SolverRegistry};
//!
//! let problem = ProblemInstance::try_new(
//!     vec![0.10, 0.15],
//!     vec![vec![0.04, 0.01], vec![0.01, 0.09]],
//!     2.0,
//! )?;
//!
//! let mut registry = SolverRegistry::new();
//! registry.register(Box::new(SimulatedAnnealingSolver::new(
//!     SimulatedAnnealingConfig::default(),
//! )));
//!
//! let report = Orchestrator::new(registry, 42).run_all(&problem)?;
//! assert!(report.best().is_some());
//! # Ok::<(), qfolio::error::Error>(())
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod solver;
