//! Scanner module for directory traversal and candidate collection.
//!
//! This module provides:
//! - [`Walker`]: recursive traversal of include roots with depth limiting,
//!   directory exclusion, filename masking, and minimum-size filtering
//! - [`FileCandidate`]: one file's path, size, and (once comparison starts)
//!   its block digest
//!
//! The duplicate engine consumes an already-filtered candidate list; all
//! traversal policy lives here, none of it in the engine.
//!
//! # Example
//!
//! ```no_run
//! use blockdupe::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let config = WalkerConfig {
//!     max_depth: 2,
//!     min_size: 1024, // skip files under 1KB
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(vec![PathBuf::from(".")], config);
//! let candidates = walker.collect_candidates().unwrap();
//! for c in &candidates {
//!     println!("{}: {} bytes", c.path.display(), c.size);
//! }
//! ```

pub mod walker;

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::digest::{Algorithm, BlockDigest};

pub use walker::Walker;

/// One file under consideration for duplicate grouping.
///
/// Created when a file passes the walker's filters; the digest is attached
/// lazily, only once the file's size group enters block-level comparison.
#[derive(Debug)]
pub struct FileCandidate {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Block digest, attached when refinement begins
    pub(crate) digest: Option<BlockDigest>,
    /// Blocks consumed before this candidate was resolved
    pub blocks_read: u64,
}

impl FileCandidate {
    /// Create a candidate that has not started comparison yet.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            digest: None,
            blocks_read: 0,
        }
    }

    /// Attach a fresh digest and consume the first block, per the
    /// matcher's "advance each by exactly one block" opening step.
    pub(crate) fn attach_digest(&mut self, algorithm: Algorithm, block_size: usize) {
        let mut digest = BlockDigest::open(&self.path, algorithm, block_size);
        digest.advance();
        self.digest = Some(digest);
    }

    /// Drop the digest, releasing any file handle it still holds, and
    /// record how many blocks this candidate cost before it was resolved.
    pub(crate) fn release_digest(&mut self) {
        if let Some(digest) = self.digest.take() {
            self.blocks_read = digest.blocks_advanced();
        }
    }

    /// The digest attached to this candidate, if comparison has begun.
    #[must_use]
    pub fn digest(&self) -> Option<&BlockDigest> {
        self.digest.as_ref()
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Maximum recursion depth below each root (0 = the root's own
    /// entries only, no subdirectories).
    pub max_depth: usize,

    /// Directories to exclude from traversal (compared canonicalized,
    /// whole subtrees are pruned).
    pub exclude_dirs: Vec<PathBuf>,

    /// Minimum file size in bytes to include. Zero admits empty files,
    /// which legitimately group together as duplicates.
    pub min_size: u64,

    /// Filename mask. Only files whose name matches are candidates;
    /// `None` admits everything.
    pub name_mask: Option<Regex>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            exclude_dirs: Vec::new(),
            min_size: 0,
            name_mask: None,
        }
    }
}

/// Errors that can occur while collecting candidates.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The specified root path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified root path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while reading a root directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Compile a filename mask into an anchored, case-insensitive regex.
///
/// The mask must match the whole filename, so `.*\.iso` behaves the way
/// mask users expect and `iso` alone does not match `disk.iso.bak`.
///
/// # Errors
///
/// Returns the underlying regex error if the mask is not a valid pattern.
pub fn compile_mask(mask: &str) -> Result<Regex, regex::Error> {
    regex::RegexBuilder::new(&format!("^(?:{mask})$"))
        .case_insensitive(true)
        .build()
}

/// Whether `name` passes the optional filename mask.
pub(crate) fn mask_matches(mask: Option<&Regex>, path: &Path) -> bool {
    match mask {
        None => true,
        Some(re) => path
            .file_name()
            .map(|n| re.is_match(&n.to_string_lossy()))
            .unwrap_or(false),
    }
}
