//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Planwright - run infrastructure provisioning plans.
#[derive(Debug, Parser)]
#[command(name = "planwright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a settings file
    #[arg(short, long, global = true, env = "PLANWRIGHT_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Show errors and final results only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check a plan for structural errors
    Validate(ValidateArgs),

    /// Execute a plan
    Run(RunArgs),

    /// List registered step types
    Types(TypesArgs),

    /// Print the JSON schema of plan files
    Schema,
}

/// Arguments for the `validate` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ValidateArgs {
    /// Plan file (YAML or JSON)
    pub plan: PathBuf,

    /// Show the execution order and parallel layers
    #[arg(long)]
    pub show_order: bool,
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Plan file (YAML or JSON)
    pub plan: PathBuf,

    /// Simulate the run; handlers return placeholder outputs
    #[arg(long, env = "PLANWRIGHT_DRY_RUN")]
    pub dry_run: bool,

    /// Print the run result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `types` command.
#[derive(Debug, Clone, Default, Args)]
pub struct TypesArgs {
    /// Print definitions as JSON
    #[arg(long)]
    pub json: bool,
}
