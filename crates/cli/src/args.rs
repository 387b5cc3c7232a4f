//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::config::ConfigCommand;

#[derive(Parser)]
#[command(
    name = "stripe",
    about = "A command-line tool for managing Stripe developer credentials",
    version
)]
pub struct Cli {
    /// The configuration profile to operate on.
    #[arg(long, global = true, default_value = "default")]
    pub project_name: String,

    /// Path to the config file (defaults to the platform config directory).
    #[arg(long, global = true, env = "STRIPE_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// Colorize output: auto, on, or off.
    #[arg(long, global = true)]
    pub color: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration for the current profile
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Provide us with feedback on the CLI
    Feedback,
}
