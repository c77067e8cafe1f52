//! Command-line interface definitions for BlockDupe.
//!
//! This module defines all CLI arguments using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Find duplicates directly under two directories
//! blockdupe ~/Downloads ~/backup
//!
//! # Recurse three levels, MD5, 4KB blocks, ISO images only
//! blockdupe -l 3 --hash md5 --block-size 4KiB -m '.*\.iso' ~/images
//!
//! # Exclude a build directory, emit JSON for scripting
//! blockdupe -l 10 -e target --output json .
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::digest::Algorithm;

/// Block-incremental duplicate file finder.
///
/// BlockDupe groups files by size, then compares same-size files in
/// fixed-size blocks, hashing lazily and dropping candidates at the first
/// block where they diverge. Only confirmed duplicates are read in full.
#[derive(Debug, Parser)]
#[command(name = "blockdupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to scan for duplicates
    #[arg(value_name = "DIR", required = true)]
    pub include_dirs: Vec<PathBuf>,

    /// Directories to exclude from the scan (can be repeated)
    #[arg(short = 'e', long = "exclude", value_name = "DIR")]
    pub exclude_dirs: Vec<PathBuf>,

    /// Maximum recursion depth below each root (0 = roots only)
    #[arg(short = 'l', long, value_name = "N", default_value_t = 0)]
    pub level: usize,

    /// Minimum file size to consider (e.g., 1KB, 1MiB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB.
    /// Zero admits empty files, which group together by construction.
    #[arg(long, value_name = "SIZE", value_parser = parse_size, default_value = "0")]
    pub min_size: u64,

    /// Filename mask (regex, case-insensitive, matches the whole name)
    #[arg(short = 'm', long, value_name = "REGEX")]
    pub mask: Option<String>,

    /// Comparison block size (e.g., 512, 4KiB)
    #[arg(short = 's', long, value_name = "SIZE", value_parser = parse_block_size, default_value = "1")]
    pub block_size: u64,

    /// Hash algorithm for block comparison
    #[arg(long = "hash", value_enum, default_value = "crc32")]
    pub hash: HashArg,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and results
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Hash algorithm choice on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HashArg {
    /// Rolling 32-bit CRC (fast)
    Crc32,
    /// Streaming MD5 (collision-resistant)
    Md5,
}

impl From<HashArg> for Algorithm {
    fn from(arg: HashArg) -> Self {
        match arg {
            HashArg::Crc32 => Algorithm::Crc32,
            HashArg::Md5 => Algorithm::Md5,
        }
    }
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text: one file per line, groups separated by blank lines
    Text,
    /// JSON report for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB.
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use blockdupe::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// ```
///
/// # Errors
///
/// Returns a human-readable message for empty input, unknown suffixes,
/// non-numeric values, or overflow.
pub fn parse_size(input: &str) -> Result<u64, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("size must not be empty".to_string());
    }

    let lower = input.to_lowercase();
    let (number, multiplier): (&str, u64) = if let Some(n) = lower.strip_suffix("kib") {
        (n, 1 << 10)
    } else if let Some(n) = lower.strip_suffix("mib") {
        (n, 1 << 20)
    } else if let Some(n) = lower.strip_suffix("gib") {
        (n, 1 << 30)
    } else if let Some(n) = lower.strip_suffix("tib") {
        (n, 1 << 40)
    } else if let Some(n) = lower.strip_suffix("kb") {
        (n, 1_000)
    } else if let Some(n) = lower.strip_suffix("mb") {
        (n, 1_000_000)
    } else if let Some(n) = lower.strip_suffix("gb") {
        (n, 1_000_000_000)
    } else if let Some(n) = lower.strip_suffix("tb") {
        (n, 1_000_000_000_000)
    } else if let Some(n) = lower.strip_suffix('b') {
        (n, 1)
    } else {
        (lower.as_str(), 1)
    };

    let number = number.trim();
    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid size number: '{input}'"))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("size overflows: '{input}'"))
}

/// Parse a block size: same syntax as [`parse_size`], but must be >= 1.
///
/// # Errors
///
/// Returns an error for unparsable input or a zero block size.
pub fn parse_block_size(input: &str) -> Result<u64, String> {
    let value = parse_size(input)?;
    if value == 0 {
        return Err("block size must be at least 1 byte".to_string());
    }
    Ok(value)
}
