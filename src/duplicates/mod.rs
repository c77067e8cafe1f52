//! Duplicate detection module.
//!
//! This module provides the grouping engine:
//! - Size-based candidate partitioning (Phase 1)
//! - Incremental block-hash refinement (Phase 2)
//! - The scanner that composes both and collects final groups

pub mod finder;
pub mod groups;
pub mod matcher;

pub use finder::{DuplicateScanner, ScanSummary};
pub use groups::{group_by_size, DuplicateGroup, GroupRange, GroupingStats};
pub use matcher::refine_group;
