//! Duplicate scanner: composes size grouping and block-hash refinement.
//!
//! # Overview
//!
//! [`DuplicateScanner`] is the entry point of the grouping engine. It takes
//! an already-filtered candidate list (see [`crate::scanner`]), partitions
//! it by size, refines each size group block-by-block, and returns the
//! confirmed duplicate groups plus a run summary.
//!
//! Size groups are processed independently; a failing candidate is
//! eliminated by the digest layer without aborting its group, and a
//! resolved group never costs another byte of I/O.
//!
//! # Example
//!
//! ```no_run
//! use blockdupe::digest::Algorithm;
//! use blockdupe::duplicates::DuplicateScanner;
//! use blockdupe::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from(".")], WalkerConfig::default());
//! let candidates = walker.collect_candidates().unwrap();
//!
//! let scanner = DuplicateScanner::new(Algorithm::Crc32, 4096);
//! let (groups, summary) = scanner.scan(candidates).unwrap();
//! println!(
//!     "{} duplicate group(s), {} wasted bytes",
//!     groups.len(),
//!     summary.wasted_bytes
//! );
//! ```

use bytesize::ByteSize;
use serde::Serialize;

use crate::digest::{Algorithm, DigestError};
use crate::scanner::FileCandidate;

use super::groups::{group_by_size, DuplicateGroup, GroupingStats};
use super::matcher::refine_group;

/// Summary of one scan run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    /// Statistics from the size grouping phase
    pub grouping: GroupingStats,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Number of files in confirmed duplicate groups
    pub duplicate_files: usize,
    /// Bytes reclaimable by keeping one copy per group
    pub wasted_bytes: u64,
    /// Total blocks read across all candidates during refinement
    pub blocks_read: u64,
}

/// Drives size grouping and per-group refinement over a candidate list.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateScanner {
    algorithm: Algorithm,
    block_size: usize,
}

impl DuplicateScanner {
    /// Create a scanner with the given algorithm and block size.
    ///
    /// A zero block size is clamped to one byte.
    #[must_use]
    pub fn new(algorithm: Algorithm, block_size: usize) -> Self {
        Self {
            algorithm,
            block_size: block_size.max(1),
        }
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The configured block size in bytes.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Find all duplicate groups among the given candidates.
    ///
    /// Returns the groups in deterministic order (size groups in first-
    /// occurrence order, members in presentation order) together with a
    /// run summary.
    ///
    /// # Errors
    ///
    /// Only a digest contract violation surfaces as an error; per-file
    /// read failures eliminate the affected candidate and continue.
    pub fn scan(
        &self,
        mut candidates: Vec<FileCandidate>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), DigestError> {
        log::info!(
            "Scanning {} candidate(s) with {} in {} blocks",
            candidates.len(),
            self.algorithm,
            ByteSize::b(self.block_size as u64)
        );

        let (ranges, grouping) = group_by_size(&mut candidates);

        let mut groups = Vec::new();
        for range in ranges {
            let size = candidates[range.start].size;
            let refined = refine_group(&mut candidates, range, self.algorithm, self.block_size)?;
            log::debug!(
                "Size group {} bytes refined into {} duplicate group(s)",
                size,
                refined.len()
            );

            for sub in refined {
                groups.push(DuplicateGroup {
                    size,
                    files: candidates[sub].iter().map(|c| c.path.clone()).collect(),
                });
            }
        }

        let summary = ScanSummary {
            grouping,
            duplicate_groups: groups.len(),
            duplicate_files: groups.iter().map(DuplicateGroup::len).sum(),
            wasted_bytes: groups.iter().map(DuplicateGroup::wasted_space).sum(),
            blocks_read: candidates.iter().map(|c| c.blocks_read).sum(),
        };

        log::info!(
            "Scan complete: {} duplicate group(s), {} file(s), {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            ByteSize::b(summary.wasted_bytes)
        );

        Ok((groups, summary))
    }
}
