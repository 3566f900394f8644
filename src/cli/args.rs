//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::RowOrderArg;

/// Convert raw camera frames into RGB images
#[derive(Parser, Debug)]
#[command(name = "camframe")]
#[command(version, about = "Raw camera frame conversion toolkit", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Conversion worker threads (0 = one per CPU, capped at the CPU count)
    #[arg(long, short)]
    pub workers: Option<usize>,

    /// Zero-fill short frames instead of rejecting them
    #[arg(long)]
    pub zero_fill: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List supported raw pixel formats
    Formats,
    /// Convert a raw frame file to PNG
    Convert {
        /// Raw frame file
        #[arg(long, short)]
        input: PathBuf,
        /// Pixel format name or COMPRESSION/BPP pair (see `formats`)
        #[arg(long, short)]
        format: String,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Row order of the input
        #[arg(long, default_value = "native")]
        row_order: RowOrderArg,
        /// Output PNG path
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Write a color-bar frame in a raw pixel format
    Pattern {
        /// Pixel format name or COMPRESSION/BPP pair
        #[arg(long, short)]
        format: String,
        #[arg(long, default_value = "640")]
        width: u32,
        #[arg(long, default_value = "480")]
        height: u32,
        /// Horizontal shift of the bars in pixels
        #[arg(long, default_value = "0")]
        phase: u32,
        /// Output raw file
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Run the test-pattern source through a capture session
    Stream {
        /// Pixel format name (default from config)
        #[arg(long, short)]
        format: Option<String>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[arg(long)]
        fps: Option<u32>,
        /// Stop after this many frames (default: until Ctrl+C)
        #[arg(long, short = 'n')]
        frames: Option<u64>,
        /// Save the last frame as PNG
        #[arg(long, short)]
        snapshot: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
