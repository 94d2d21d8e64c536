//! Patchbay CLI
//!
//! Command-line interface for rendering audio patches.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::{debug, LevelFilter};

use patchbay::cli::commands;
use patchbay::cli::{Cli, Commands};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logger
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if cli.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    debug!("Patchbay v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Patchbay v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn handle_command(cmd: Commands) -> Result<ExitCode> {
    let result = match cmd {
        Commands::Call {
            json,
            input,
            output,
        } => commands::call(&json, &input, &output)?,
        Commands::Apply {
            input,
            output,
            instructions,
            params,
            sr,
            mix,
            seed,
        } => commands::apply(
            &input,
            &output,
            instructions.as_deref(),
            params.as_deref(),
            sr,
            mix,
            seed,
        )?,
        Commands::Interpret { text, sr } => {
            commands::interpret(&text, sr)?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Fixtures { dir, sr, seed } => {
            commands::fixtures(&dir, sr, seed)?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Functions => {
            commands::functions()?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    if commands::print_result(&result)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
