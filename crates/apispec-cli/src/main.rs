//! # apispec CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use apispec_cli::check::{run_check, CheckArgs};
use apispec_cli::doc::{run_doc, DocArgs};
use apispec_cli::load_config;
use apispec_cli::params::{run_params, ParamsArgs};

/// Per-action OpenAPI fragments: documentation, checks and permit lists.
#[derive(Parser, Debug)]
#[command(name = "apispec", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fragment root directory; repeat for several, first wins.
    #[arg(long = "root", global = true)]
    roots: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the aggregate OpenAPI document.
    Doc(DocArgs),

    /// Parse every fragment and compile every schema.
    Check(CheckArgs),

    /// Print the permit list of an action.
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

    let result = load_config(cli.config.as_deref(), &cli.roots).and_then(|config| {
        tracing::debug!(roots = ?config.roots, "resolved fragment roots");
        match &cli.command {
            Commands::Doc(args) => run_doc(args, &config),
            Commands::Check(args) => run_check(args, &config),
            Commands::Params(args) => run_params(args, &config),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
