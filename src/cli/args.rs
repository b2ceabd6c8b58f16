//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::LayoutArg;

/// Webcam photobooth that turns 2-4 shots into a polaroid collage
#[derive(Parser, Debug)]
#[command(name = "photobooth")]
#[command(version, about = "Webcam photobooth with polaroid collages", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Take photos with the webcam and save a collage
    Shoot(ShootArgs),
    /// Build a collage from existing image files
    Compose(ComposeArgs),
    /// List available cameras
    ListCameras,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
pub struct ShootArgs {
    /// Number of photos (2-4)
    #[arg(long, short = 'n', default_value_t = 2, value_parser = clap::value_parser!(u8).range(2..=4))]
    pub count: u8,

    /// Collage layout (three photos are always side by side)
    #[arg(long, short, default_value = "side-by-side")]
    pub layout: LayoutArg,

    /// Camera device index (from list-cameras), overrides the config file
    #[arg(long)]
    pub camera: Option<u32>,

    /// Use a generated test pattern instead of a webcam
    #[arg(long)]
    pub synthetic: bool,

    /// Directory to save the collage in
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ComposeArgs {
    /// Two to four image files, in placement order
    #[arg(required = true, num_args = 2..=4)]
    pub files: Vec<PathBuf>,

    /// Collage layout
    #[arg(long, short, default_value = "side-by-side")]
    pub layout: LayoutArg,

    /// Output file (default: timestamped file in the output directory)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
