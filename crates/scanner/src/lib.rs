//! Archive scanning.
//!
//! Walks jar/war/ear files (and exploded `classes/` directories), feeds
//! every compiled unit through `jarscope-classfile`, and folds the facts
//! into `jarscope-core` archive models. Top-level archives scan in
//! parallel; each worker owns a private arena merged at the join point,
//! and the shared provides index is a concurrent map with commutative
//! updates.
//!
//! Nothing in here is fatal to a run: malformed units are skipped,
//! unreadable archives are dropped with a warning, failed sub-archive
//! builds leave the parent container with whatever siblings succeeded.

mod builder;
mod jdk;
mod manifest;
mod scan;

use thiserror::Error;

pub use builder::ArchiveBuilder;
pub use jdk::discover_jdk_profile;
pub use manifest::Manifest;
pub use scan::{ScanOutcome, Scanner};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Normalize blacklist prefixes: a trailing `.class` (a copy-pasted file
/// name) and a trailing `.*` (subtree shorthand) both reduce to a plain
/// dotted prefix.
pub fn normalize_blacklist(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|prefix| {
            let prefix = prefix.strip_suffix(".class").unwrap_or(prefix);
            let prefix = prefix.strip_suffix(".*").unwrap_or(prefix);
            prefix.to_string()
        })
        .filter(|prefix| !prefix.is_empty())
        .collect()
}
