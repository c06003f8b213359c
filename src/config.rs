//! TOML configuration for the optimizer binary.
//!
//! Every solver section is optional and falls back to its defaults; a
//! missing `[solvers.*]` table still enables the solver. Set `enabled =
//! false` in a section to leave that solver out of the session.

use serde::Deserialize;
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::solver::{
    AmplitudeSearchConfig, AnnealingScheduleConfig, LayeredConfig, MeanVarianceConfig,
    SimulatedAnnealingConfig, VariationalConfig,
};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub solvers: SolversConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter, overridable via `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Base seed; each solver derives its own from this plus its registry
    /// position.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Run solvers on worker threads instead of sequentially.
    #[serde(default)]
    pub parallel: bool,

    /// Per-session deadline in milliseconds; 0 disables it.
    #[serde(default)]
    pub timeout_ms: u64,
}

fn default_seed() -> u64 {
    42
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            parallel: false,
            timeout_ms: 0,
        }
    }
}

/// Per-solver sections; each pairs an `enabled` switch with the solver's
/// own configuration record, flattened into the same table.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SolversConfig {
    #[serde(default)]
    pub annealing: SolverSection<SimulatedAnnealingConfig>,
    #[serde(default)]
    pub schedule: SolverSection<AnnealingScheduleConfig>,
    #[serde(default)]
    pub amplitude: SolverSection<AmplitudeSearchConfig>,
    #[serde(default)]
    pub layered: SolverSection<LayeredConfig>,
    #[serde(default)]
    pub variational: SolverSection<VariationalConfig>,
    #[serde(default)]
    pub mean_variance: SolverSection<MeanVarianceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverSection<C> {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(flatten)]
    pub config: C,
}

fn default_enabled() -> bool {
    true
}

impl<C: Default> Default for SolverSection<C> {
    fn default() -> Self {
        Self {
            enabled: true,
            config: C::default(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants the serde layer cannot express.
    pub fn validate(&self) -> Result<()> {
        let annealing = &self.solvers.annealing.config;
        if annealing.max_iterations == 0 {
            return Err(invalid("solvers.annealing.max_iterations", "must be positive"));
        }
        if !(annealing.initial_temperature > 0.0) {
            return Err(invalid(
                "solvers.annealing.initial_temperature",
                "must be positive",
            ));
        }
        if !(annealing.cooling_rate > 0.0 && annealing.cooling_rate < 1.0) {
            return Err(invalid("solvers.annealing.cooling_rate", "must be in (0, 1)"));
        }

        let schedule = &self.solvers.schedule.config;
        if schedule.steps == 0 {
            return Err(invalid("solvers.schedule.steps", "must be positive"));
        }
        if !(schedule.decay > 0.0 && schedule.decay < 1.0) {
            return Err(invalid("solvers.schedule.decay", "must be in (0, 1)"));
        }

        if self.solvers.layered.config.depth == 0 {
            return Err(invalid("solvers.layered.depth", "must be positive"));
        }
        if !(self.solvers.variational.config.learning_rate > 0.0) {
            return Err(invalid("solvers.variational.learning_rate", "must be positive"));
        }
        if !(self.solvers.mean_variance.config.learning_rate > 0.0) {
            return Err(invalid(
                "solvers.mean_variance.learning_rate",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Install the global tracing subscriber from the logging section.
    pub fn init_logging(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.logging.level.clone()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
    .into()
}
