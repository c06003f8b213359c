//! Command-line interface: argument parsing and report rendering.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::app::Orchestrator;
use crate::config::Config;
use crate::domain::{OptimizationReport, QuboMatrix, Solution};
use crate::error::Result;
use crate::loader;

#[derive(Debug, Parser)]
#[command(name = "qfolio", version, about = "Quantum-inspired portfolio optimization over QUBO formulations")]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "qfolio.toml")]
    pub config: PathBuf,

    /// Emit machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every enabled solver and report the best portfolio.
    Run(ProblemArgs),
    /// Print the formulated QUBO matrix without solving.
    Formulate(ProblemArgs),
}

#[derive(Debug, Args)]
pub struct ProblemArgs {
    /// Returns file: one expected return per line.
    #[arg(long)]
    pub returns: PathBuf,

    /// Covariance file: one whitespace-separated row per line.
    #[arg(long)]
    pub covariance: PathBuf,

    /// Risk-aversion scalar weighting return against risk.
    #[arg(long, default_value_t = 2.0)]
    pub risk_aversion: f64,
}

/// Dispatch a parsed command.
pub fn execute(cli: &Cli) -> Result<()> {
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };
    config.init_logging();

    match &cli.command {
        Command::Run(args) => run(&config, args, cli.json),
        Command::Formulate(args) => formulate(args, cli.json),
    }
}

fn run(config: &Config, args: &ProblemArgs, json: bool) -> Result<()> {
    let problem = loader::load_problem(&args.returns, &args.covariance, args.risk_aversion)?;
    let orchestrator = Orchestrator::from_config(config, problem.num_assets());
    let report = orchestrator.run_all(&problem)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn formulate(args: &ProblemArgs, json: bool) -> Result<()> {
    let problem = loader::load_problem(&args.returns, &args.covariance, args.risk_aversion)?;
    let qubo = QuboMatrix::formulate(&problem);
    if json {
        println!("{}", serde_json::to_string_pretty(&qubo)?);
    } else {
        let n = qubo.size();
        println!("{}", format!("QUBO matrix ({n}x{n})").bold());
        for i in 0..n {
            let row: Vec<String> = (0..n).map(|j| format!("{:>10.6}", qubo.get(i, j))).collect();
            println!("  {}", row.join(" "));
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Solver")]
    solver: String,
    #[tabled(rename = "Objective")]
    objective: String,
    #[tabled(rename = "Solution")]
    solution: String,
}

fn print_report(report: &OptimizationReport) {
    let rows: Vec<ResultRow> = report
        .results
        .iter()
        .map(|result| ResultRow {
            solver: result.solver.clone(),
            objective: format!("{:.6}", result.objective),
            solution: render_solution(&result.solution),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for skipped in &report.skipped {
        println!(
            "{} {}: {}",
            "skipped".yellow().bold(),
            skipped.solver,
            skipped.reason
        );
    }

    match report.best() {
        Some(best) => println!(
            "{} {} (objective {:.6})",
            "best:".green().bold(),
            best.solver,
            best.objective
        ),
        None => println!("{}", "no solver produced a result".red().bold()),
    }
}

fn render_solution(solution: &Solution) -> String {
    match solution {
        Solution::Binary(binary) => binary
            .bits
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(""),
        Solution::Continuous(weights) => weights
            .weights()
            .iter()
            .map(|w| format!("{w:.4}"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
