//! Directory walker built on `walkdir`.
//!
//! # Overview
//!
//! Traverses one or more include roots, applying the filters configured in
//! [`WalkerConfig`], and produces the flat [`FileCandidate`] list the
//! duplicate engine consumes. Traversal is single-threaded and
//! deterministic: candidates come out in the order the filesystem yields
//! them, which keeps repeated runs on an unchanged tree reproducible.
//!
//! Filtering rules:
//!
//! - Depth is limited to `max_depth` levels below each root (0 means only
//!   a root's immediate entries).
//! - Excluded directories are pruned as whole subtrees, compared by
//!   canonicalized path so `./x` and a symlinked spelling both hit.
//! - Symlinks are never followed and symlinked files are skipped.
//! - The filename mask and minimum size are applied per file.
//!
//! Unreadable entries below a valid root are logged and skipped; a missing
//! or non-directory root is an error surfaced to the caller.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{mask_matches, FileCandidate, ScanError, WalkerConfig};

/// Directory walker producing filtered duplicate-scan candidates.
#[derive(Debug)]
pub struct Walker {
    roots: Vec<PathBuf>,
    config: WalkerConfig,
}

impl Walker {
    /// Create a walker over the given include roots.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        Self { roots, config }
    }

    /// Walk all roots and collect the filtered candidate list.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if a root does not exist or is not a
    /// directory. Errors on entries below a root (permission denied,
    /// racing deletes) are logged and skipped instead.
    pub fn collect_candidates(&self) -> Result<Vec<FileCandidate>, ScanError> {
        let excludes = self.canonical_excludes();
        let mut candidates = Vec::new();

        for root in &self.roots {
            self.validate_root(root)?;
            self.walk_root(root, &excludes, &mut candidates);
        }

        log::info!(
            "Traversal complete: {} candidate file(s) across {} root(s)",
            candidates.len(),
            self.roots.len()
        );
        Ok(candidates)
    }

    fn validate_root(&self, root: &Path) -> Result<(), ScanError> {
        let metadata = match root.metadata() {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ScanError::NotFound(root.to_path_buf()));
            }
            Err(e) => {
                return Err(ScanError::Io {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
        };
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }
        Ok(())
    }

    /// Canonicalize the exclusion list once up front. Entries that cannot
    /// be canonicalized (typically: they do not exist) are dropped with a
    /// warning rather than failing the scan.
    fn canonical_excludes(&self) -> Vec<PathBuf> {
        self.config
            .exclude_dirs
            .iter()
            .filter_map(|dir| match dir.canonicalize() {
                Ok(p) => Some(p),
                Err(e) => {
                    log::warn!("Ignoring exclude dir {}: {}", dir.display(), e);
                    None
                }
            })
            .collect()
    }

    fn walk_root(&self, root: &Path, excludes: &[PathBuf], out: &mut Vec<FileCandidate>) {
        // max_depth counts levels below the root; walkdir counts the root
        // itself as depth 0 and its entries as depth 1.
        let mut it = WalkDir::new(root)
            .follow_links(false)
            .max_depth(self.config.max_depth + 1)
            .into_iter();

        while let Some(entry) = it.next() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                if entry.depth() > 0 && self.is_excluded(entry.path(), excludes) {
                    log::debug!("Pruning excluded directory {}", entry.path().display());
                    it.skip_current_dir();
                }
                continue;
            }

            // Regular files only; symlinked files are never candidates.
            if !entry.file_type().is_file() || entry.path_is_symlink() {
                continue;
            }

            if !mask_matches(self.config.name_mask.as_ref(), entry.path()) {
                log::trace!("Mask rejected {}", entry.path().display());
                continue;
            }

            let size = match entry.metadata() {
                Ok(m) => m.len(),
                Err(e) => {
                    log::warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            if size < self.config.min_size {
                log::trace!(
                    "Below minimum size ({} < {}): {}",
                    size,
                    self.config.min_size,
                    entry.path().display()
                );
                continue;
            }

            out.push(FileCandidate::new(entry.into_path(), size));
        }
    }

    fn is_excluded(&self, dir: &Path, excludes: &[PathBuf]) -> bool {
        if excludes.is_empty() {
            return false;
        }
        match dir.canonicalize() {
            Ok(canonical) => excludes.iter().any(|ex| *ex == canonical),
            Err(e) => {
                log::warn!("Cannot canonicalize {}: {}", dir.display(), e);
                false
            }
        }
    }
}
