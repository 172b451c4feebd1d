//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;
use unpipe_core::CompletionPolicy;
use unpipe_core::ExtractConfig;
use unpipe_core::config::DEFAULT_CHANNEL_CAPACITY;

#[derive(Parser)]
#[command(name = "unpipe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stream a zip archive into a directory
    Extract(ExtractArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the zip archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory, which must already exist (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Bytes read from the archive per chunk (accepts K, M, G or T suffixes, any case)
    #[arg(long, default_value = "64K", value_parser = parse_byte_size)]
    pub chunk_size: usize,

    /// Chunks buffered between reader and extractor
    #[arg(long, default_value_t = DEFAULT_CHANNEL_CAPACITY, value_parser = parse_capacity)]
    pub channel_capacity: usize,

    /// Report completion only after every entry is written
    #[arg(long)]
    pub wait_for_sink: bool,

    /// Fail instead of replacing files that already exist
    #[arg(long)]
    pub no_overwrite: bool,

    /// Apply unix permissions stored in the archive
    #[arg(long)]
    pub preserve_permissions: bool,
}

impl ExtractArgs {
    /// Builds the extraction configuration from the flags.
    pub fn to_config(&self) -> ExtractConfig {
        let completion = if self.wait_for_sink {
            CompletionPolicy::SinkFinished
        } else {
            CompletionPolicy::SourceClosed
        };

        ExtractConfig::default()
            .with_chunk_size(self.chunk_size)
            .with_channel_capacity(self.channel_capacity)
            .with_completion(completion)
            .with_overwrite(!self.no_overwrite)
            .with_preserve_permissions(self.preserve_permissions)
    }
}

/// Parse a non-zero byte size with an optional K, M, G or T suffix in either case.
fn parse_byte_size(s: &str) -> Result<usize, String> {
    const SUFFIXES: [(char, u32); 4] = [('K', 1), ('M', 2), ('G', 3), ('T', 4)];

    let s = s.trim();
    let (digits, power) = SUFFIXES
        .iter()
        .find_map(|&(suffix, power)| {
            s.strip_suffix([suffix, suffix.to_ascii_lowercase()])
                .map(|rest| (rest, power))
        })
        .unwrap_or((s, 0));

    let value = digits
        .parse::<usize>()
        .map_err(|_| format!("invalid byte size: {s}"))?;
    let size = 1024_usize
        .checked_pow(power)
        .and_then(|multiplier| value.checked_mul(multiplier))
        .ok_or_else(|| format!("byte size overflow: {s}"))?;

    if size == 0 {
        return Err("byte size must be greater than zero".to_string());
    }
    Ok(size)
}

fn parse_capacity(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("channel capacity must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("invalid channel capacity: {s}")),
    }
}
