mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::compare::CompareArgs;
use commands::economics::{EconomicsArgs, ReportArgs};
use commands::reconcile::ReconcileArgs;
use commands::sensitivity::{GridArgs, SensitivityArgs};

/// Petroleum project economics
#[derive(Parser)]
#[command(
    name = "pecon",
    version,
    about = "Petroleum project economics: cashflows, sensitivities, comparisons",
    long_about = "A CLI for evaluating upstream oil and gas projects with decimal precision. \
                  Supports concession and PSC cashflow models, tornado and two-way \
                  sensitivity analysis, incremental scenario comparison with a waterfall, \
                  reconciliation against imported figures, and MM-unit reporting."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the annual cashflow model and derive NPV, IRR, DPI, payback and breakeven
    Economics(EconomicsArgs),
    /// Tornado analysis over price, costs, production, timing and discount rate
    Sensitivity(SensitivityArgs),
    /// Two-way NPV grid over two parameters
    Grid(GridArgs),
    /// Incremental comparison of a scenario against a base case
    Compare(CompareArgs),
    /// Reconcile a model run against imported annual figures
    Reconcile(ReconcileArgs),
    /// Summary report in MM currency units and percentages
    Report(ReportArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Economics(args) => commands::economics::run_economics(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Grid(args) => commands::sensitivity::run_grid(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Reconcile(args) => commands::reconcile::run_reconcile(args),
        Commands::Report(args) => commands::economics::run_report(args),
        Commands::Version => {
            println!("pecon {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
