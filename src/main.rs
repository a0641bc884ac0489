//! zimmap - build offline map archives from a region description.

#![allow(dead_code)]

mod archive;
mod cli;
mod config;
mod error;
mod extent;
mod logger;
mod tiles;
mod utils;
mod view;
mod viewer;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::BuildConfig;

fn main() {
    if let Err(e) = run() {
        log!("error"; "{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = BuildConfig::load(&cli).with_context(|| {
        format!("failed to load configuration ({})", cli.config.display())
    })?;
    if let Some(path) = &config.config_path {
        debug!("config"; "using {}", path.display());
    }

    match &cli.command {
        Commands::Build { .. } => cli::build::build_archive(&config).map(|_| ())?,
        Commands::Check { .. } => cli::build::check(&config)?,
    }
    Ok(())
}
