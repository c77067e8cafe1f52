//! Size-based grouping and duplicate group types.
//!
//! # Overview
//!
//! Size grouping is the first phase of duplicate detection: files of
//! different length cannot be byte-identical, so partitioning by exact size
//! eliminates most candidates before any byte is read. Groups are
//! represented as index ranges into one shared candidate arena, never as
//! separately owned collections; the block-hash matcher later refines those
//! same ranges in place.
//!
//! Grouping is pure metadata comparison, O(n) over the candidate count,
//! with no file I/O.

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::FileCandidate;

/// A contiguous `[start, end)` run in the candidate arena.
pub type GroupRange = std::ops::Range<usize>;

/// Confirmed duplicate group: two or more files of equal size whose
/// content matched block-for-block to exhaustion.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// File size in bytes, shared by every member
    pub size: u64,
    /// Member paths, in the order the files were originally presented
    /// within their size bucket
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Space reclaimable by keeping one copy (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * (self.files.len().saturating_sub(1)) as u64
    }
}

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Total number of candidates processed
    pub total_files: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Number of distinct file sizes seen
    pub unique_sizes: usize,
    /// Number of candidates that could still be duplicates (groups of 2+)
    pub potential_duplicates: usize,
    /// Number of candidates eliminated as unique (singleton sizes)
    pub eliminated_unique: usize,
    /// Number of zero-byte candidates (they group by size alone)
    pub empty_files: usize,
    /// Number of size groups with 2+ members
    pub size_groups: usize,
}

impl GroupingStats {
    /// Percentage of candidates eliminated without any I/O.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Partition candidates by exact size (Phase 1 of duplicate detection).
///
/// The arena is reordered in place so each surviving size group occupies a
/// contiguous run; the returned ranges index into the reordered arena.
/// Singleton size groups are dropped from the arena entirely — a file of a
/// unique size cannot duplicate anything.
///
/// The partition is stable and deterministic: groups appear in order of
/// each size's first occurrence in the input, and members keep their input
/// order within a group. This is what makes repeated runs over an
/// unchanged tree produce identical output.
///
/// # Arguments
///
/// * `candidates` - The candidate arena, reordered in place
///
/// # Returns
///
/// A tuple of:
/// - `Vec<GroupRange>` - index ranges of the surviving size groups
/// - `GroupingStats` - statistics about the grouping operation
pub fn group_by_size(candidates: &mut Vec<FileCandidate>) -> (Vec<GroupRange>, GroupingStats) {
    let mut stats = GroupingStats::default();

    // Bucket by size, remembering each size's first-occurrence order so
    // the output ordering does not depend on hash iteration order.
    let mut size_order: Vec<u64> = Vec::new();
    let mut buckets: HashMap<u64, Vec<FileCandidate>> = HashMap::new();

    for candidate in candidates.drain(..) {
        stats.total_files += 1;
        stats.total_size += candidate.size;
        if candidate.size == 0 {
            stats.empty_files += 1;
        }

        let bucket = buckets.entry(candidate.size).or_default();
        if bucket.is_empty() {
            size_order.push(candidate.size);
        }
        bucket.push(candidate);
    }

    stats.unique_sizes = size_order.len();

    // Rebuild the arena group by group, dropping singletons.
    let mut ranges = Vec::new();
    for size in size_order {
        let Some(bucket) = buckets.remove(&size) else {
            continue;
        };

        if bucket.len() < 2 {
            stats.eliminated_unique += bucket.len();
            log::trace!(
                "Eliminated unique size {}: {}",
                size,
                bucket[0].path.display()
            );
            continue;
        }

        stats.potential_duplicates += bucket.len();
        stats.size_groups += 1;
        log::debug!("Size group {} bytes: {} candidate(s)", size, bucket.len());

        let start = candidates.len();
        candidates.extend(bucket);
        ranges.push(start..candidates.len());
    }

    log::info!(
        "Phase 1 complete: {} file(s), {} potential duplicate(s) in {} size group(s) ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.size_groups,
        stats.elimination_rate()
    );

    (ranges, stats)
}
