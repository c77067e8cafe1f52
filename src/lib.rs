//! BlockDupe - Block-Incremental Duplicate File Finder
//!
//! Finds byte-identical files under a set of directory roots while reading
//! as little as possible: candidates are partitioned by size, then
//! same-size files are compared in fixed-size blocks with lazily advanced
//! digests (CRC32 or MD5), and a file is dropped from further I/O at the
//! first block where it diverges from its matching set.

pub mod cli;
pub mod digest;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;

use anyhow::Context;

use cli::{Cli, OutputFormat};
use duplicates::DuplicateScanner;
use error::ExitCode;
use scanner::{Walker, WalkerConfig};

/// Run the application with parsed CLI arguments.
///
/// Returns the exit code to terminate with; errors bubble up to `main`
/// for reporting.
///
/// # Errors
///
/// Returns an error for an invalid mask, an unusable include root, or a
/// digest contract violation. Per-file read failures are non-fatal and
/// only eliminate the affected candidate.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let name_mask = cli
        .mask
        .as_deref()
        .map(scanner::compile_mask)
        .transpose()
        .context("invalid filename mask")?;

    let config = WalkerConfig {
        max_depth: cli.level,
        exclude_dirs: cli.exclude_dirs.clone(),
        min_size: cli.min_size,
        name_mask,
    };

    let walker = Walker::new(cli.include_dirs.clone(), config);
    let candidates = walker.collect_candidates()?;

    let block_size = usize::try_from(cli.block_size).context("block size too large")?;
    let scanner = DuplicateScanner::new(cli.hash.into(), block_size);
    let (groups, summary) = scanner.scan(candidates)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => output::write_text(&mut out, &groups)?,
        OutputFormat::Json => output::json::write_report(
            &mut out,
            scanner.algorithm(),
            scanner.block_size(),
            &groups,
            &summary,
        )?,
    }

    Ok(if groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    })
}
