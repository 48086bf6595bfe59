//! numerica - Command Line Front End for numeric_core
//!
//! # Commands
//!
//! - `numerica root <method> -f <function> -b <a,b>` - Find a root of f(x)
//! - `numerica linear <method> -a <matrix> -b <vector>` - Solve A·x = b iteratively
//! - `numerica interpolate <method> -p <points>` - Fit an interpolant
//! - `numerica compare {root|linear|interpolation} ...` - Run and rank a whole battery
//! - `numerica check` - Show configuration and run a self test
//!
//! Settings come from `numerica.toml`, `NUMERICA_*` environment variables and
//! the global flags below, in increasing priority.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod input;
mod output;

pub use error::{CliError, Result};

use commands::compare::CompareTarget;
use commands::interpolate::InterpolationArgs;
use commands::linear::LinearArgs;
use commands::root::RootArgs;
use config::CliArgs;

/// Numerical methods: root finding, iterative linear solvers, interpolation
#[derive(Parser)]
#[command(name = "numerica")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (default: ./numerica.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Stopping tolerance; "5e-k" selects relative error, "1e-k" absolute
    #[arg(short, long, global = true)]
    tolerance: Option<String>,

    /// Iteration budget (1..=10000)
    #[arg(short = 'n', long, global = true)]
    max_iterations: Option<usize>,

    /// Error formula (absolute, relative, generic, residual)
    #[arg(short, long, global = true)]
    error_kind: Option<String>,

    /// Run comparison batteries in parallel
    #[arg(long, global = true)]
    parallel: bool,

    /// Output format (json, table)
    #[arg(long, global = true)]
    format: Option<String>,

    /// Abort the computation after this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn overrides(&self) -> CliArgs {
        CliArgs {
            config_file: self.config.clone(),
            tolerance: self.tolerance.clone(),
            max_iterations: self.max_iterations,
            error_kind: self.error_kind.clone(),
            parallel: self.parallel,
            format: self.format.clone(),
            timeout_ms: self.timeout_ms,
            log_level: self.verbose.then(|| "debug".to_string()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Find a root of f(x)
    Root {
        /// bisection, false_position, fixed_point, newton, secant, multiple_roots
        method: String,

        #[command(flatten)]
        args: RootArgs,
    },

    /// Solve a linear system iteratively
    Linear {
        /// jacobi, gauss_seidel, sor
        method: String,

        #[command(flatten)]
        args: LinearArgs,
    },

    /// Fit an interpolant through the given nodes
    Interpolate {
        /// vandermonde, newton, lagrange, linear_spline, cubic_spline
        method: String,

        #[command(flatten)]
        args: InterpolationArgs,
    },

    /// Run every method of a category and rank them
    Compare {
        #[command(subcommand)]
        target: CompareTarget,
    },

    /// Check configuration and run a self test
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::build_config(&cli.overrides())?;

    // Initialise tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter_str()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match &cli.command {
        Commands::Root { method, args } => commands::root::run(&config, method, args),
        Commands::Linear { method, args } => commands::linear::run(&config, method, args),
        Commands::Interpolate { method, args } => commands::interpolate::run(&config, method, args),
        Commands::Compare { target } => commands::compare::run(&config, target),
        Commands::Check => commands::check::run(&config),
    }
}
