//! CLI Module
//!
//! Command-line interface for Patchbay.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_MIX_RATIO, DEFAULT_SAMPLE_RATE};

/// Patchbay - sandboxed audio patch rendering
#[derive(Parser, Debug)]
#[command(name = "patchbay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a planner tool-call envelope
    #[command(name = "call")]
    Call {
        /// Tool call JSON, or @path to read it from a file
        #[arg(short, long)]
        json: String,

        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render a file through a patch
    #[command(name = "apply")]
    Apply {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Free-text instructions
        #[arg(long, conflicts_with = "params")]
        instructions: Option<String>,

        /// Structured parameters as JSON
        #[arg(long)]
        params: Option<String>,

        /// Render sample rate
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sr: u32,

        /// Dry proportion when blending the sub layer
        #[arg(long, default_value_t = DEFAULT_MIX_RATIO)]
        mix: f32,

        /// Seed for the noise stage
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the parameters derived from instructions
    #[command(name = "interpret")]
    Interpret {
        /// Instruction text
        text: String,

        /// Sample rate used for clamping
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sr: u32,
    },

    /// Write the reference test sounds
    #[command(name = "fixtures")]
    Fixtures {
        /// Output directory
        #[arg(short, long, default_value = "tests/sample_audio")]
        dir: PathBuf,

        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sr: u32,

        #[arg(long, default_value_t = 7)]
        seed: u64,
    },

    /// List allow-listed operations
    #[command(name = "functions")]
    Functions,
}
