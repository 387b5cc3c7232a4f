//! Stripe CLI - command-line credential and configuration management.
//!
//! Responsibilities:
//! - Parse command-line arguments and dispatch to subcommands.
//! - Open the profile credential store for commands that need it.
//!
//! Does NOT handle:
//! - Credential storage logic (see `crates/config`).

mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use stripe_config::constants::COLOR_KEY;
use stripe_config::{ConfigStore, Profile};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = args::Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: args::Cli) -> Result<()> {
    match cli.command {
        args::Commands::Feedback => {
            commands::feedback::run();
            Ok(())
        }
        args::Commands::Config { command } => {
            let mut store = match &cli.config_path {
                Some(path) => ConfigStore::load(path)?,
                None => ConfigStore::new()?,
            };
            if let Some(color) = &cli.color {
                store.set(COLOR_KEY, color);
            }

            let profile = Profile::new(cli.project_name);
            tracing::debug!(
                profile = %profile.profile_name,
                path = %store.config_path().display(),
                "running config command"
            );
            commands::config::run(&profile, &mut store, command)
        }
    }
}
