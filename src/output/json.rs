//! JSON report output for scripting.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::digest::Algorithm;
use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Top-level JSON report.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// Hash algorithm the scan ran with
    pub algorithm: Algorithm,
    /// Block size in bytes
    pub block_size: usize,
    /// Run summary
    pub summary: &'a ScanSummary,
    /// Confirmed duplicate groups
    pub groups: &'a [DuplicateGroup],
}

/// Write the full report as pretty-printed JSON.
///
/// # Errors
///
/// Returns serialization or I/O errors from the underlying writer.
pub fn write_report<W: Write>(
    writer: &mut W,
    algorithm: Algorithm,
    block_size: usize,
    groups: &[DuplicateGroup],
    summary: &ScanSummary,
) -> Result<()> {
    let report = Report {
        algorithm,
        block_size,
        summary,
        groups,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}
