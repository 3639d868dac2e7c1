//! Multi-archive scan orchestration.
//!
//! Discovery is a plain filesystem walk; builds run in parallel with one
//! private arena per worker, merged at the join point. The global index
//! is shared across workers; its updates are append-only set unions, so
//! any serialization order yields the same index.

use crate::builder::ArchiveBuilder;
use crate::normalize_blacklist;
use jarscope_core::model::{ArchiveSet, GlobalIndex, KnownProfile, archive_kind_for_path};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub struct ScanOutcome {
    pub set: ArchiveSet,
    pub index: GlobalIndex,
}

pub struct Scanner<'a> {
    profiles: &'a [Box<dyn KnownProfile>],
    blacklist: Vec<String>,
}

impl<'a> Scanner<'a> {
    pub fn new(profiles: &'a [Box<dyn KnownProfile>], blacklist: &[String]) -> Self {
        Self {
            profiles,
            blacklist: normalize_blacklist(blacklist),
        }
    }

    /// Scan every archive reachable from `roots`. A root may be an
    /// archive file, a directory to walk for archives, or an exploded
    /// classes directory.
    pub fn scan(&self, roots: &[PathBuf]) -> ScanOutcome {
        let (archives, class_dirs) = discover(roots);
        info!(
            archives = archives.len(),
            class_dirs = class_dirs.len(),
            "scanning"
        );

        let index = GlobalIndex::new();
        let builder = ArchiveBuilder::new(self.profiles, &self.blacklist, &index);

        let mut partials: Vec<ArchiveSet> = archives
            .par_iter()
            .filter_map(|path| build_one(&builder, path, false))
            .collect();
        partials.extend(
            class_dirs
                .par_iter()
                .filter_map(|path| build_one(&builder, path, true))
                .collect::<Vec<_>>(),
        );

        let mut set = ArchiveSet::new();
        for partial in partials {
            set.absorb(partial);
        }
        info!(top_level = set.len(), units = index.len(), "scan complete");

        ScanOutcome { set, index }
    }
}

fn build_one(builder: &ArchiveBuilder<'_>, path: &Path, classes_dir: bool) -> Option<ArchiveSet> {
    let mut local = ArchiveSet::new();
    let built = if classes_dir {
        builder.build_classes_dir(&mut local, path)
    } else {
        builder.build(&mut local, path)
    };
    match built {
        Ok(Some(id)) => {
            local.register_root(id);
            Some(local)
        }
        Ok(None) => {
            debug!(path = %path.display(), "not a recognizable archive, dropped");
            None
        }
        Err(err) => {
            warn!(path = %path.display(), "archive build failed, dropped: {err}");
            None
        }
    }
}

/// Split roots into archive files and exploded classes directories.
/// Directory roots are walked for nested archive files; a directory that
/// itself holds loose `.class` files is treated as a classes dir.
fn discover(roots: &[PathBuf]) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut archives = Vec::new();
    let mut class_dirs = Vec::new();

    for root in roots {
        if root.is_file() {
            if archive_kind_for_path(root).is_some() {
                archives.push(root.clone());
            } else {
                warn!(path = %root.display(), "not an archive, ignored");
            }
            continue;
        }

        let mut has_loose_classes = false;
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            if archive_kind_for_path(entry.path()).is_some() {
                archives.push(entry.path().to_path_buf());
            } else if entry.path().extension().and_then(|e| e.to_str()) == Some("class") {
                has_loose_classes = true;
            }
        }
        if has_loose_classes {
            class_dirs.push(root.clone());
        }
    }

    archives.sort();
    archives.dedup();
    (archives, class_dirs)
}
