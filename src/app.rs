//! Session orchestration: run every enabled solver on one problem.
//!
//! The orchestrator formulates the QUBO exactly once and hands the same
//! read-only matrix to every registered solver. Solvers are pure CPU
//! loops with no shared mutable state, so the parallel mode simply fans
//! them out over scoped worker threads and joins before building the
//! report; min-selection over the collected results is commutative, so
//! completion order never matters.
//!
//! Recoverable solver errors (misconfiguration, dimension mismatches,
//! empty inputs) are recorded in the report and skipped; formulation
//! errors abort the session before any solver runs.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{
    DomainError, OptimizationReport, ProblemInstance, QuboMatrix, SkippedSolver, SolverResult,
};
use crate::error::Result;
use crate::solver::{
    AmplitudeSearchSolver, AnnealingScheduleSolver, LayeredHeuristicSolver, MeanVarianceSolver,
    SimulatedAnnealingSolver, Solver, SolverContext, SolverRegistry, VariationalSolver,
};

/// Runs a solver session over one problem instance.
pub struct Orchestrator {
    registry: SolverRegistry,
    mean_variance: Option<MeanVarianceSolver>,
    seed: u64,
    parallel: bool,
    timeout: Option<Duration>,
}

impl Orchestrator {
    /// Build an orchestrator with an explicit registry.
    #[must_use]
    pub fn new(registry: SolverRegistry, seed: u64) -> Self {
        Self {
            registry,
            mean_variance: None,
            seed,
            parallel: false,
            timeout: None,
        }
    }

    /// Attach the classical continuous solver.
    #[must_use]
    pub fn with_mean_variance(mut self, solver: MeanVarianceSolver) -> Self {
        self.mean_variance = Some(solver);
        self
    }

    /// Run solvers on worker threads.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Bound the whole session by a deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Assemble an orchestrator from configuration. The layered solver is
    /// sized for the problem at hand.
    #[must_use]
    pub fn from_config(config: &Config, num_assets: usize) -> Self {
        let solvers = &config.solvers;
        let mut registry = SolverRegistry::new();
        if solvers.annealing.enabled {
            registry.register(Box::new(SimulatedAnnealingSolver::new(
                solvers.annealing.config.clone(),
            )));
        }
        if solvers.schedule.enabled {
            registry.register(Box::new(AnnealingScheduleSolver::new(
                solvers.schedule.config.clone(),
            )));
        }
        if solvers.amplitude.enabled {
            registry.register(Box::new(AmplitudeSearchSolver::new(
                solvers.amplitude.config.clone(),
            )));
        }
        if solvers.layered.enabled {
            registry.register(Box::new(LayeredHeuristicSolver::from_config(
                num_assets,
                solvers.layered.config.clone(),
            )));
        }
        if solvers.variational.enabled {
            registry.register(Box::new(VariationalSolver::new(
                solvers.variational.config.clone(),
            )));
        }

        let mut orchestrator = Self::new(registry, config.orchestrator.seed)
            .with_parallel(config.orchestrator.parallel);
        if solvers.mean_variance.enabled {
            orchestrator = orchestrator
                .with_mean_variance(MeanVarianceSolver::new(solvers.mean_variance.config.clone()));
        }
        if config.orchestrator.timeout_ms > 0 {
            orchestrator =
                orchestrator.with_timeout(Duration::from_millis(config.orchestrator.timeout_ms));
        }
        orchestrator
    }

    /// Formulate the QUBO once, run every solver, and report the best
    /// result by objective value.
    ///
    /// # Errors
    ///
    /// Only unrecoverable errors surface here; per-solver recoverable
    /// failures are recorded in the report instead.
    pub fn run_all(&self, problem: &ProblemInstance) -> Result<OptimizationReport> {
        let qubo = QuboMatrix::formulate(problem);
        let deadline = self.timeout.map(|t| Instant::now() + t);
        info!(
            assets = problem.num_assets(),
            solvers = self.registry.len(),
            parallel = self.parallel,
            "optimization session starting"
        );

        let outcomes = if self.parallel {
            self.run_parallel(&qubo, deadline)
        } else {
            self.run_sequential(&qubo, deadline)
        };

        let mut results = Vec::new();
        let mut skipped = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    info!(solver = name, objective = result.objective, "solver finished");
                    results.push(result);
                }
                Err(err) if err.is_recoverable() => {
                    warn!(solver = name, error = %err, "solver skipped");
                    skipped.push(SkippedSolver {
                        solver: name.to_string(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(solver) = &self.mean_variance {
            let ctx = self.context_for(self.registry.len(), deadline);
            match solver.optimize(problem, &ctx) {
                Ok(result) => {
                    info!(
                        solver = MeanVarianceSolver::NAME,
                        objective = result.objective,
                        "solver finished"
                    );
                    results.push(result);
                }
                Err(err) if err.is_recoverable() => {
                    warn!(solver = MeanVarianceSolver::NAME, error = %err, "solver skipped");
                    skipped.push(SkippedSolver {
                        solver: MeanVarianceSolver::NAME.to_string(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }

        let report = OptimizationReport::new(results, skipped);
        if let Some(best) = report.best() {
            info!(solver = %best.solver, objective = best.objective, "best result selected");
        } else {
            warn!("no solver produced a result");
        }
        Ok(report)
    }

    fn run_sequential(
        &self,
        qubo: &QuboMatrix,
        deadline: Option<Instant>,
    ) -> Vec<(&'static str, std::result::Result<SolverResult, DomainError>)> {
        self.registry
            .solvers()
            .iter()
            .enumerate()
            .map(|(idx, solver)| {
                let ctx = self.context_for(idx, deadline);
                (solver.name(), solver.solve(qubo, &ctx))
            })
            .collect()
    }

    fn run_parallel(
        &self,
        qubo: &QuboMatrix,
        deadline: Option<Instant>,
    ) -> Vec<(&'static str, std::result::Result<SolverResult, DomainError>)> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .registry
                .solvers()
                .iter()
                .enumerate()
                .map(|(idx, solver)| {
                    let ctx = self.context_for(idx, deadline);
                    scope.spawn(move || (solver.name(), solver.solve(qubo, &ctx)))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(outcome) => outcome,
                    Err(_) => (
                        "unknown",
                        Err(DomainError::InvalidProblem {
                            reason: "solver thread panicked".into(),
                        }),
                    ),
                })
                .collect()
        })
    }

    /// Seed derivation: base seed plus registry position, so concurrent
    /// runs never share generator state and reruns reproduce exactly.
    fn context_for(&self, index: usize, deadline: Option<Instant>) -> SolverContext {
        let mut ctx = SolverContext::seeded(self.seed.wrapping_add(index as u64));
        if let Some(deadline) = deadline {
            ctx = ctx.with_deadline(deadline);
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{
        AnnealingScheduleConfig, LayeredHeuristicSolver, SimulatedAnnealingConfig,
    };

    fn problem() -> ProblemInstance {
        ProblemInstance::try_new(
            vec![0.10, 0.15, 0.12],
            vec![
                vec![0.040, 0.012, 0.006],
                vec![0.012, 0.090, 0.015],
                vec![0.006, 0.015, 0.060],
            ],
            2.5,
        )
        .unwrap()
    }

    fn registry() -> SolverRegistry {
        let mut registry = SolverRegistry::new();
        registry.register(Box::new(SimulatedAnnealingSolver::new(
            SimulatedAnnealingConfig::default(),
        )));
        registry.register(Box::new(AnnealingScheduleSolver::new(
            AnnealingScheduleConfig::default(),
        )));
        registry
    }

    #[test]
    fn run_all_reports_every_registered_solver() {
        let orchestrator = Orchestrator::new(registry(), 42);
        let report = orchestrator.run_all(&problem()).unwrap();
        assert_eq!(report.results.len(), 2);
        assert!(report.skipped.is_empty());
        assert!(report.best().is_some());
    }

    #[test]
    fn misconfigured_solver_is_skipped_not_fatal() {
        let mut registry = registry();
        // Unconfigured layered solver: gamma/beta never set.
        registry.register(Box::new(LayeredHeuristicSolver::new(3, 2)));
        let orchestrator = Orchestrator::new(registry, 42);
        let report = orchestrator.run_all(&problem()).unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].solver, "layered_heuristic");
    }

    #[test]
    fn oversized_instance_skips_amplitude_search_without_aborting() {
        // 30 assets is past the amplitude solver's enumeration capacity
        // but a perfectly valid instance for everyone else.
        let n = 30;
        let returns: Vec<f64> = (0..n).map(|i| 0.08 + 0.001 * i as f64).collect();
        let mut covariance = vec![vec![0.0; n]; n];
        for (i, row) in covariance.iter_mut().enumerate() {
            row[i] = 0.05;
        }
        let problem = ProblemInstance::try_new(returns, covariance, 2.0).unwrap();

        let mut registry = SolverRegistry::new();
        registry.register(Box::new(SimulatedAnnealingSolver::new(
            SimulatedAnnealingConfig::default(),
        )));
        registry.register(Box::new(AmplitudeSearchSolver::new(Default::default())));
        let report = Orchestrator::new(registry, 11).run_all(&problem).unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].solver, "amplitude_search");
        assert!(report.best().is_some());
    }

    #[test]
    fn expired_session_deadline_still_yields_a_complete_report() {
        let mut registry = registry();
        registry.register(Box::new(AmplitudeSearchSolver::new(Default::default())));
        let orchestrator = Orchestrator::new(registry, 3)
            .with_mean_variance(MeanVarianceSolver::new(Default::default()))
            .with_timeout(Duration::ZERO);
        let report = orchestrator.run_all(&problem()).unwrap();
        assert_eq!(report.results.len(), 4);
        assert!(report.skipped.is_empty());
        for result in &report.results {
            assert!(result.objective.is_finite());
            if let crate::domain::Solution::Binary(solution) = &result.solution {
                assert_eq!(solution.bits.len(), 3);
                assert!(solution.bits.iter().all(|b| *b == 0 || *b == 1));
            }
        }
    }

    #[test]
    fn identical_seeds_yield_identical_reports() {
        let problem = problem();
        let a = Orchestrator::new(registry(), 7).run_all(&problem).unwrap();
        let b = Orchestrator::new(registry(), 7).run_all(&problem).unwrap();
        let objectives =
            |r: &OptimizationReport| r.results.iter().map(|x| x.objective).collect::<Vec<_>>();
        assert_eq!(objectives(&a), objectives(&b));
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let problem = problem();
        let sequential = Orchestrator::new(registry(), 5).run_all(&problem).unwrap();
        let parallel = Orchestrator::new(registry(), 5)
            .with_parallel(true)
            .run_all(&problem)
            .unwrap();
        assert_eq!(sequential.results, parallel.results);
    }

    #[test]
    fn best_is_minimum_over_all_results() {
        let orchestrator = Orchestrator::new(registry(), 42)
            .with_mean_variance(MeanVarianceSolver::new(Default::default()));
        let report = orchestrator.run_all(&problem()).unwrap();
        let best = report.best().unwrap().objective;
        assert!(report.results.iter().all(|r| best <= r.objective));
    }
}
