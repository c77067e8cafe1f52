//! Block-incremental file digests.
//!
//! # Overview
//!
//! This module provides [`BlockDigest`], a resumable digest over successive
//! fixed-size blocks of one file. The matcher advances all members of a
//! candidate set in lockstep, compares their accumulated values, and drops
//! non-matching candidates without reading the rest of their content.
//!
//! Two algorithms are supported, dispatched through a closed enum rather
//! than trait objects:
//!
//! - [`Algorithm::Crc32`]: rolling 32-bit CRC via `crc32fast`. Cheap, and a
//!   strong heuristic, but not collision-proof on its own.
//! - [`Algorithm::Md5`]: streaming 128-bit MD5 via the RustCrypto `md-5`
//!   crate. Collision-resistant enough to treat final equality as identity.
//!
//! For both, equality of the accumulated value after the same number of
//! advances over same-length files means equality of every byte consumed so
//! far. Only the value of an exhausted digest fingerprints the whole file.
//!
//! # Example
//!
//! ```no_run
//! use blockdupe::digest::{Algorithm, BlockDigest};
//! use std::path::Path;
//!
//! let mut a = BlockDigest::open(Path::new("a.bin"), Algorithm::Crc32, 4096);
//! let mut b = BlockDigest::open(Path::new("b.bin"), Algorithm::Crc32, 4096);
//!
//! while !a.is_exhausted() {
//!     a.advance();
//!     b.advance();
//!     if !a.eq_state(&b).unwrap() {
//!         println!("files diverge");
//!         break;
//!     }
//! }
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use md5::Digest as _;
use md5::Md5;
use serde::Serialize;

/// Hash algorithm used for block comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Rolling 32-bit CRC. Fast; equality is a strong heuristic.
    Crc32,
    /// Streaming MD5. Final equality is treated as byte identity.
    Md5,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Crc32 => write!(f, "crc32"),
            Algorithm::Md5 => write!(f, "md5"),
        }
    }
}

/// Errors from the digest layer.
#[derive(thiserror::Error, Debug)]
pub enum DigestError {
    /// Two digests with differing algorithm or block size were compared.
    /// This is a caller contract violation, never a soft "not equal".
    #[error(
        "incompatible digest comparison: {left} (block {left_block}) vs {right} (block {right_block})"
    )]
    Incompatible {
        /// Algorithm of the left-hand digest
        left: Algorithm,
        /// Block size of the left-hand digest
        left_block: usize,
        /// Algorithm of the right-hand digest
        right: Algorithm,
        /// Block size of the right-hand digest
        right_block: usize,
    },
}

/// Streaming hasher state, one variant per algorithm.
#[derive(Clone)]
enum HasherState {
    Crc32(crc32fast::Hasher),
    Md5(Md5),
}

/// Accumulated value snapshot, comparable for byte-exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accumulated {
    Crc32(u32),
    Md5([u8; 16]),
}

/// Stateful, resumable digest over fixed-size blocks of one file.
///
/// The read offset starts at zero and moves forward by exactly one block
/// per [`advance`](Self::advance) call; bytes are never re-read. When the
/// file runs out of bytes (a short or empty read), the digest becomes
/// exhausted and the file handle is dropped immediately so descriptors are
/// not held across a long scan.
///
/// A read failure mid-stream (permission revoked, file deleted) poisons the
/// digest: it becomes exhausted, and [`eq_state`](Self::eq_state) reports it
/// unequal to everything, including other failed digests. Failed files can
/// therefore never land in a duplicate group.
pub struct BlockDigest {
    algorithm: Algorithm,
    block_size: usize,
    path: PathBuf,
    file: Option<File>,
    state: HasherState,
    value: Accumulated,
    exhausted: bool,
    failed: bool,
    blocks_advanced: u64,
}

impl std::fmt::Debug for BlockDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockDigest")
            .field("algorithm", &self.algorithm)
            .field("block_size", &self.block_size)
            .field("path", &self.path)
            .field("exhausted", &self.exhausted)
            .field("failed", &self.failed)
            .field("blocks_advanced", &self.blocks_advanced)
            .finish()
    }
}

impl BlockDigest {
    /// Open a digest over the file at `path`.
    ///
    /// Opening never fails loudly: if the file cannot be opened, the digest
    /// starts out poisoned (failed and exhausted) and the error is logged.
    /// The scan treats such a candidate as "no bytes left to distinguish",
    /// which eliminates it from every duplicate group.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if `block_size` is zero.
    #[must_use]
    pub fn open(path: &Path, algorithm: Algorithm, block_size: usize) -> Self {
        debug_assert!(block_size > 0, "block size must be positive");

        let (state, value) = match algorithm {
            Algorithm::Crc32 => {
                let hasher = crc32fast::Hasher::new();
                let value = Accumulated::Crc32(hasher.clone().finalize());
                (HasherState::Crc32(hasher), value)
            }
            Algorithm::Md5 => {
                let hasher = Md5::new();
                let value = Accumulated::Md5(hasher.clone().finalize().into());
                (HasherState::Md5(hasher), value)
            }
        };

        let (file, failed) = match File::open(path) {
            Ok(f) => (Some(f), false),
            Err(e) => {
                log::warn!("Failed to open {}: {}", path.display(), e);
                (None, true)
            }
        };

        Self {
            algorithm,
            block_size,
            path: path.to_path_buf(),
            file,
            state,
            value,
            exhausted: failed,
            failed,
            blocks_advanced: 0,
        }
    }

    /// Consume the next block and fold it into the accumulated value.
    ///
    /// A short read (fewer than `block_size` bytes remaining, including
    /// zero) hashes only the bytes actually read, marks the digest
    /// exhausted, and releases the file handle. Calling `advance` on an
    /// exhausted digest is a no-op; the matcher relies on this when it
    /// redundantly advances the last block of a group.
    pub fn advance(&mut self) {
        if self.exhausted {
            return;
        }

        let Some(file) = self.file.as_mut() else {
            // No handle but not exhausted should be unreachable; treat as
            // a failed read so the candidate is eliminated.
            self.failed = true;
            self.exhausted = true;
            return;
        };

        let mut buf = vec![0u8; self.block_size];
        match read_block(file, &mut buf) {
            Ok(n) => {
                self.fold(&buf[..n]);
                self.blocks_advanced += 1;
                if n < self.block_size {
                    self.exhausted = true;
                    self.file = None;
                }
            }
            Err(e) => {
                log::warn!("Read error on {}: {}", self.path.display(), e);
                self.blocks_advanced += 1;
                self.failed = true;
                self.exhausted = true;
                self.file = None;
            }
        }
    }

    /// Fold one block of bytes into the rolling state and refresh the
    /// comparable snapshot.
    fn fold(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Crc32(hasher) => {
                hasher.update(data);
                self.value = Accumulated::Crc32(hasher.clone().finalize());
            }
            HasherState::Md5(hasher) => {
                hasher.update(data);
                self.value = Accumulated::Md5(hasher.clone().finalize().into());
            }
        }
    }

    /// Compare accumulated values for byte-exact equality.
    ///
    /// Both digests must share the same algorithm and block size;
    /// anything else is a caller bug and returns
    /// [`DigestError::Incompatible`] rather than a silent `false`.
    ///
    /// Failed digests compare unequal to everything (including other
    /// failed digests), and digests whose exhaustion state differs are
    /// never equal.
    pub fn eq_state(&self, other: &Self) -> Result<bool, DigestError> {
        if self.algorithm != other.algorithm || self.block_size != other.block_size {
            return Err(DigestError::Incompatible {
                left: self.algorithm,
                left_block: self.block_size,
                right: other.algorithm,
                right_block: other.block_size,
            });
        }
        if self.failed || other.failed {
            return Ok(false);
        }
        Ok(self.exhausted == other.exhausted && self.value == other.value)
    }

    /// True once the file has been fully consumed (or a read failed).
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// True if a read or open failure poisoned this digest.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Number of `advance` calls that actually consumed input.
    ///
    /// Exposed so callers (and tests) can verify how much I/O a candidate
    /// cost before it was resolved.
    #[must_use]
    pub fn blocks_advanced(&self) -> u64 {
        self.blocks_advanced
    }

    /// The algorithm this digest was opened with.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The block size this digest was opened with.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

/// Fill `buf` from `file`, short only at end-of-file.
///
/// Retries on `Interrupted` so a signal mid-read does not poison the digest.
fn read_block(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
