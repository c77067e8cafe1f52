//! Result presentation.
//!
//! Two formats:
//! - [`write_text`]: one file per line as `path size`, groups separated by
//!   a blank line — grep-friendly and pipe-friendly
//! - [`json`]: a single report object for scripting

pub mod json;

use std::io::{self, Write};

use crate::duplicates::DuplicateGroup;

/// Write duplicate groups in the plain text format.
///
/// # Errors
///
/// Returns any I/O error from the underlying writer.
pub fn write_text<W: Write>(writer: &mut W, groups: &[DuplicateGroup]) -> io::Result<()> {
    for group in groups {
        for path in &group.files {
            writeln!(writer, "{} {}", path.display(), group.size)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
