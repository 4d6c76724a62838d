//! Command line and environment configuration.
//!
//! Every server option can be given as a flag or through a `HEICLY_*` environment
//! variable; flags win. Running `heicly` with no subcommand is the same as
//! `heicly serve`.
//!
//! ```bash
//! HEICLY_PORT=8080 HEICLY_QUALITY=90 heicly
//! heicly convert IMG_0001.HEIC IMG_0002.HEIC -o out/
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use std::fs;
use std::path::PathBuf;

use heicly::DEFAULT_JPEG_QUALITY;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "heicly", about = "Convert HEIC images to JPEG", version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true, default_value_t)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServerConfig,
}

impl Cli {
    pub fn command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the upload form (default)
    Serve(ServerConfig),
    /// Convert files on disk without starting the server
    Convert(ConvertArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    #[arg(long, env = "HEICLY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to
    #[arg(short, long, env = "HEICLY_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Scratch directory for uploaded files
    #[arg(long, env = "HEICLY_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Scratch directory for converted files
    #[arg(long, env = "HEICLY_CONVERTED_DIR", default_value = "converted")]
    pub converted_dir: PathBuf,

    /// JPEG quality (1-100)
    #[arg(
        short,
        long,
        env = "HEICLY_QUALITY",
        default_value_t = DEFAULT_JPEG_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub quality: u8,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "HEICLY_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Create the scratch directories if they don't exist yet
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.upload_dir, &self.converted_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// HEIC files to convert
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// JPEG quality (1-100)
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_JPEG_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub quality: u8,
}
