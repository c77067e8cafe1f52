//! Incremental block-hash refinement of one size group.
//!
//! # Overview
//!
//! Given a run of candidates that already share a file size, this module
//! decides which of them are byte-identical while reading as little as
//! possible. Every candidate gets a [`BlockDigest`] advanced one block at a
//! time, in lockstep with its current matching set; each round the set is
//! re-partitioned on the accumulated value and non-matching candidates fall
//! out of further I/O immediately.
//!
//! Conceptually this is a recursion — partition by "equal up to block k",
//! recurse into the matching subset — but it runs iteratively over an
//! explicit stack of right boundaries, so depth scales with the number of
//! distinguishing refinement levels rather than the candidate count, and
//! the non-matching remainder of each round simply waits on the arena for a
//! later outer iteration.
//!
//! A candidate is resolved either by elimination (its matching set shrank
//! to just itself) or by membership in a final group (every remaining
//! member exhausted its file while still equal). No file is read past the
//! block where it first diverged from its set, except confirmed duplicates,
//! which are read to completion.

use crate::digest::{Algorithm, BlockDigest, DigestError};
use crate::scanner::FileCandidate;

use super::groups::GroupRange;

/// Refine one size group into zero or more confirmed duplicate groups.
///
/// `group` must be a contiguous run in `arena` whose members all share one
/// file size; the returned ranges are sub-ranges of it, each of length
/// >= 2, indexing the (re-partitioned) arena. A group of length < 2 is
/// tolerated and yields nothing.
///
/// Candidates whose reads fail are poisoned by the digest layer, match
/// nothing from then on, and are eliminated; the rest of the group is
/// unaffected. File handles are released as soon as a candidate is
/// resolved.
///
/// # Errors
///
/// Returns [`DigestError`] only on a caller contract violation (digests
/// with mismatched algorithm or block size, which cannot happen when all
/// digests are attached here with one configuration).
pub fn refine_group(
    arena: &mut [FileCandidate],
    group: GroupRange,
    algorithm: Algorithm,
    block_size: usize,
) -> Result<Vec<GroupRange>, DigestError> {
    let (start, end) = (group.start, group.end);
    if end.saturating_sub(start) < 2 {
        return Ok(Vec::new());
    }

    for candidate in &mut arena[start..end] {
        candidate.attach_digest(algorithm, block_size);
    }

    let mut found = Vec::new();
    let mut l = start;
    let mut stack = vec![end];

    while l != end {
        let Some(&top) = stack.last() else {
            break;
        };

        if l >= top {
            // The stacked subset was fully consumed by eliminations;
            // resume at the enclosing boundary.
            stack.pop();
            continue;
        }

        // Partition [l+1, top) so candidates equal-so-far to l move to the
        // front. l trivially matches itself, so the matched run is [l, split).
        let split = partition_matching(arena, l, top)?;
        let d = split - l;

        if d == 1 {
            // Nothing else matches l: uniquely resolved.
            arena[l].release_digest();
            l += 1;
            continue;
        }

        let l_exhausted = arena[l]
            .digest
            .as_ref()
            .map_or(false, BlockDigest::is_exhausted);
        if l_exhausted {
            // Entire matched run consumed its file while still equal:
            // confirmed duplicates. Equal exhaustion across the run is
            // guaranteed because eq_state compares exhaustion state.
            for candidate in &mut arena[l..split] {
                candidate.release_digest();
            }
            found.push(l..split);
            l = split;
            if top != end {
                stack.pop();
            }
            continue;
        }

        // More bytes remain to distinguish the matched run. Narrow the
        // active window to it if it shrank, then advance it one block.
        let window_end = if split != top {
            stack.push(split);
            split
        } else {
            top
        };
        for candidate in &mut arena[l..window_end] {
            if let Some(digest) = candidate.digest.as_mut() {
                digest.advance();
            }
        }
    }

    for candidate in &mut arena[start..end] {
        candidate.release_digest();
    }

    Ok(found)
}

/// Stable-partition `[l+1, top)` so candidates whose digest state equals
/// `arena[l]`'s move to the front, preserving presentation order on both
/// sides. Returns the split index (first non-matching position).
fn partition_matching(
    arena: &mut [FileCandidate],
    l: usize,
    top: usize,
) -> Result<usize, DigestError> {
    let (head, tail) = arena.split_at_mut(l + 1);
    let pivot = head[l].digest.as_ref();
    let window = &mut tail[..top - l - 1];

    let mut boundary = 0;
    for j in 0..window.len() {
        let matches = match (pivot, window[j].digest.as_ref()) {
            (Some(a), Some(b)) => a.eq_state(b)?,
            _ => false,
        };
        if matches {
            window[boundary..=j].rotate_right(1);
            boundary += 1;
        }
    }
    Ok(l + 1 + boundary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn candidate(dir: &Path, name: &str, content: &[u8]) -> FileCandidate {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        FileCandidate::new(path, content.len() as u64)
    }

    fn group_names(arena: &[FileCandidate], range: &GroupRange) -> Vec<String> {
        arena[range.clone()]
            .iter()
            .map(|c| {
                c.path
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    #[test]
    fn test_three_identical_files_one_group() {
        let dir = tempdir().unwrap();
        let mut arena = vec![
            candidate(dir.path(), "a", b"hello"),
            candidate(dir.path(), "b", b"hello"),
            candidate(dir.path(), "c", b"hello"),
        ];

        let groups = refine_group(&mut arena, 0..3, Algorithm::Crc32, 2).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(group_names(&arena, &groups[0]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_shared_prefix_then_divergence_yields_nothing() {
        let dir = tempdir().unwrap();
        let mut arena = vec![
            candidate(dir.path(), "a", b"ab123"),
            candidate(dir.path(), "b", b"ab456"),
        ];

        let groups = refine_group(&mut arena, 0..2, Algorithm::Crc32, 2).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_zero_byte_files_group_immediately() {
        let dir = tempdir().unwrap();
        let mut arena = vec![
            candidate(dir.path(), "a", b""),
            candidate(dir.path(), "b", b""),
        ];

        let groups = refine_group(&mut arena, 0..2, Algorithm::Md5, 1).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], 0..2);
        // A single no-op advance resolved both.
        assert_eq!(arena[0].blocks_read, 1);
        assert_eq!(arena[1].blocks_read, 1);
    }

    #[test]
    fn test_pair_plus_early_divergent_third() {
        let dir = tempdir().unwrap();
        // A and B identical; C same size but diverges in block 3.
        let mut arena = vec![
            candidate(dir.path(), "a", b"xxyyzz"),
            candidate(dir.path(), "b", b"xxyyzz"),
            candidate(dir.path(), "c", b"xxyyQQ"),
        ];

        let groups = refine_group(&mut arena, 0..3, Algorithm::Md5, 2).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(group_names(&arena, &groups[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_minimal_io_early_divergence() {
        let dir = tempdir().unwrap();
        // C diverges in the very first block; A and B in the third.
        let mut arena = vec![
            candidate(dir.path(), "a", b"XXXXYYYY"),
            candidate(dir.path(), "b", b"XXXXZZZZ"),
            candidate(dir.path(), "c", b"AAAABBBB"),
        ];

        let groups = refine_group(&mut arena, 0..3, Algorithm::Crc32, 2).unwrap();
        assert!(groups.is_empty());

        let by_name = |name: &str| {
            arena
                .iter()
                .find(|c| c.path.file_name().unwrap() == name)
                .unwrap()
        };
        assert_eq!(by_name("c").blocks_read, 1, "first-block divergence");
        // A and B diverge at block 3 of 4; neither is read to the end.
        assert_eq!(by_name("a").blocks_read, 3);
        assert_eq!(by_name("b").blocks_read, 3);
    }

    #[test]
    fn test_confirmed_duplicates_read_to_completion() {
        let dir = tempdir().unwrap();
        let mut arena = vec![
            candidate(dir.path(), "a", b"123456"),
            candidate(dir.path(), "b", b"123456"),
        ];

        let groups = refine_group(&mut arena, 0..2, Algorithm::Crc32, 2).unwrap();
        assert_eq!(groups.len(), 1);
        // 3 full blocks plus the empty read that flags exhaustion.
        assert_eq!(arena[0].blocks_read, 4);
        assert_eq!(arena[1].blocks_read, 4);
    }

    #[test]
    fn test_two_distinct_pairs_in_one_size_group() {
        let dir = tempdir().unwrap();
        let mut arena = vec![
            candidate(dir.path(), "a1", b"aaaa"),
            candidate(dir.path(), "b1", b"bbbb"),
            candidate(dir.path(), "a2", b"aaaa"),
            candidate(dir.path(), "b2", b"bbbb"),
        ];

        let mut groups = refine_group(&mut arena, 0..4, Algorithm::Md5, 2).unwrap();
        groups.sort_by_key(|g| g.start);

        assert_eq!(groups.len(), 2);
        assert_eq!(group_names(&arena, &groups[0]), vec!["a1", "a2"]);
        assert_eq!(group_names(&arena, &groups[1]), vec!["b1", "b2"]);
    }

    #[test]
    fn test_singleton_group_is_tolerated() {
        let dir = tempdir().unwrap();
        let mut arena = vec![candidate(dir.path(), "a", b"alone")];

        let groups = refine_group(&mut arena, 0..1, Algorithm::Crc32, 2).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_empty_group_is_tolerated() {
        let mut arena: Vec<FileCandidate> = Vec::new();
        let groups = refine_group(&mut arena, 0..0, Algorithm::Crc32, 2).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_unreadable_candidate_is_excluded_not_fatal() {
        let dir = tempdir().unwrap();
        let mut arena = vec![
            candidate(dir.path(), "a", b"same"),
            candidate(dir.path(), "b", b"same"),
            FileCandidate::new(dir.path().join("missing"), 4),
        ];

        let groups = refine_group(&mut arena, 0..3, Algorithm::Crc32, 2).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(group_names(&arena, &groups[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_two_unreadable_candidates_never_group() {
        let dir = tempdir().unwrap();
        let mut arena = vec![
            FileCandidate::new(dir.path().join("gone1"), 4),
            FileCandidate::new(dir.path().join("gone2"), 4),
        ];

        let groups = refine_group(&mut arena, 0..2, Algorithm::Md5, 2).unwrap();
        assert!(groups.is_empty(), "failed reads are excluded, not merged");
    }

    #[test]
    fn test_block_size_larger_than_files() {
        let dir = tempdir().unwrap();
        let mut arena = vec![
            candidate(dir.path(), "a", b"tiny"),
            candidate(dir.path(), "b", b"tiny"),
            candidate(dir.path(), "c", b"tidy"),
        ];

        let groups = refine_group(&mut arena, 0..3, Algorithm::Crc32, 4096).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(group_names(&arena, &groups[0]), vec!["a", "b"]);
        // Everything resolved on the first (short) block.
        assert!(arena.iter().all(|c| c.blocks_read == 1));
    }

    #[test]
    fn test_all_handles_released_after_refinement() {
        let dir = tempdir().unwrap();
        let mut arena = vec![
            candidate(dir.path(), "a", b"data1"),
            candidate(dir.path(), "b", b"data2"),
            candidate(dir.path(), "c", b"data1"),
        ];

        refine_group(&mut arena, 0..3, Algorithm::Crc32, 1).unwrap();
        assert!(arena.iter().all(|c| c.digest().is_none()));
    }
}
