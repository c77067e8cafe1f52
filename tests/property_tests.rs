//! Property tests for the grouping engine.
//!
//! The oracle is the trivial O(n * filesize) grouper: files are duplicates
//! iff their full contents are equal. The block-incremental scanner must
//! always agree with it, regardless of block size.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

use proptest::prelude::*;
use tempfile::tempdir;

use blockdupe::digest::Algorithm;
use blockdupe::duplicates::DuplicateScanner;
use blockdupe::scanner::FileCandidate;

/// Write the contents as files f00, f01, ... and return the candidates.
fn materialize(dir: &Path, contents: &[Vec<u8>]) -> Vec<FileCandidate> {
    contents
        .iter()
        .enumerate()
        .map(|(i, content)| {
            let path = dir.join(format!("f{i:02}"));
            fs::write(&path, content).unwrap();
            FileCandidate::new(path, content.len() as u64)
        })
        .collect()
}

/// Expected grouping: names bucketed by exact content, buckets of 2+.
fn oracle_groups(contents: &[Vec<u8>]) -> HashSet<BTreeSet<String>> {
    let mut by_content: HashMap<&[u8], BTreeSet<String>> = HashMap::new();
    for (i, content) in contents.iter().enumerate() {
        by_content
            .entry(content.as_slice())
            .or_default()
            .insert(format!("f{i:02}"));
    }
    by_content
        .into_values()
        .filter(|names| names.len() >= 2)
        .collect()
}

fn scanner_groups(
    contents: &[Vec<u8>],
    algorithm: Algorithm,
    block_size: usize,
) -> HashSet<BTreeSet<String>> {
    let dir = tempdir().unwrap();
    let candidates = materialize(dir.path(), contents);
    let (groups, _) = DuplicateScanner::new(algorithm, block_size)
        .scan(candidates)
        .unwrap();
    groups
        .into_iter()
        .map(|g| {
            g.files
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        })
        .collect()
}

/// Small alphabet so duplicate and shared-prefix cases actually occur.
fn contents_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..4, 0..24), 0..12)
}

proptest! {
    #[test]
    fn scanner_agrees_with_content_oracle(
        contents in contents_strategy(),
        block_size in 1usize..9,
    ) {
        let expected = oracle_groups(&contents);
        let actual = scanner_groups(&contents, Algorithm::Md5, block_size);
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn block_size_never_changes_the_answer(
        contents in contents_strategy(),
    ) {
        let one = scanner_groups(&contents, Algorithm::Md5, 1);
        let five = scanner_groups(&contents, Algorithm::Md5, 5);
        let huge = scanner_groups(&contents, Algorithm::Md5, 4096);
        prop_assert_eq!(&one, &five);
        prop_assert_eq!(&one, &huge);
    }

    #[test]
    fn crc32_agrees_with_md5_on_generated_inputs(
        contents in contents_strategy(),
        block_size in 1usize..9,
    ) {
        // CRC32 equality is heuristic in general, but on these tiny inputs
        // a collision is effectively impossible.
        let crc = scanner_groups(&contents, Algorithm::Crc32, block_size);
        let md5 = scanner_groups(&contents, Algorithm::Md5, block_size);
        prop_assert_eq!(crc, md5);
    }

    #[test]
    fn no_group_mixes_sizes(
        contents in contents_strategy(),
        block_size in 1usize..9,
    ) {
        let dir = tempdir().unwrap();
        let candidates = materialize(dir.path(), &contents);
        let (groups, _) = DuplicateScanner::new(Algorithm::Md5, block_size)
            .scan(candidates)
            .unwrap();
        for group in &groups {
            for path in &group.files {
                prop_assert_eq!(fs::metadata(path).unwrap().len(), group.size);
            }
            prop_assert!(group.files.len() >= 2);
        }
    }
}
