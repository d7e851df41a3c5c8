//! # hparams CLI entry point
//!
//! Parses command-line arguments, initializes logging and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hparams_cli::blueprint::{run_blueprint, BlueprintArgs};
use hparams_cli::catalog::{run_catalog, CatalogArgs};
use hparams_cli::params::{run_params, ParamsArgs};
use hparams_cli::Context;

/// Blueprints and hyperparameters.
///
/// Declares configuration schemas whose fields are typed, fixed or
/// restricted to sets of registered classes, and stores validated
/// hyperparameter sets built against them.
#[derive(Parser, Debug)]
#[command(name = "hparams", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a storage configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to a class manifest. Overrides the manifest named in the config.
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Root directory for records when no config file is given.
    #[arg(long, global = true, conflicts_with = "config")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the public classes of a registry namespace, or all namespaces.
    Catalog(CatalogArgs),

    /// Create, show or list blueprints.
    Blueprint(BlueprintArgs),

    /// Create, show or list hyperparameter sets.
    Params(ParamsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = Context::load(
        cli.config.as_deref(),
        cli.manifest.as_deref(),
        cli.root.as_deref(),
    )
    .and_then(|ctx| match &cli.command {
        Commands::Catalog(args) => run_catalog(args, &ctx),
        Commands::Blueprint(args) => run_blueprint(args, &ctx),
        Commands::Params(args) => run_params(args, &ctx),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
