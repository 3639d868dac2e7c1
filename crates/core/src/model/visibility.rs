//! Classloader-visibility policies.
//!
//! A [`Visibility`] decides whether archive `to` is reachable from the
//! classloader that loads `from`. The resolver consults it before
//! accepting a provider; the default is fully permissive. Strategies are
//! concrete values injected by the caller, never looked up by name.

use crate::model::ArchiveModel;
use std::path::{Path, PathBuf};

pub trait Visibility: Send + Sync {
    fn visible(&self, from: &ArchiveModel, to: &ArchiveModel) -> bool;
}

/// Flat-classpath model: every archive sees every other.
#[derive(Debug, Default, Clone, Copy)]
pub struct Permissive;

impl Visibility for Permissive {
    fn visible(&self, _from: &ArchiveModel, _to: &ArchiveModel) -> bool {
        true
    }
}

/// Directory-prefix isolation, modeling an app server layout where a
/// deployment sees its own directory, every ancestor directory, and a
/// set of shared library roots, but not sibling deployments.
#[derive(Debug, Default, Clone)]
pub struct DirectoryScoped {
    shared_roots: Vec<PathBuf>,
}

impl DirectoryScoped {
    pub fn new(shared_roots: Vec<PathBuf>) -> Self {
        Self { shared_roots }
    }

    fn directories(archive: &ArchiveModel) -> impl Iterator<Item = &Path> {
        archive
            .locations
            .iter()
            .filter_map(|location| location.path.parent())
    }
}

impl Visibility for DirectoryScoped {
    fn visible(&self, from: &ArchiveModel, to: &ArchiveModel) -> bool {
        // No location information means we cannot rule it out.
        if from.locations.is_empty() || to.locations.is_empty() {
            return true;
        }

        for to_dir in Self::directories(to) {
            if self.shared_roots.iter().any(|root| to_dir.starts_with(root)) {
                return true;
            }
            for from_dir in Self::directories(from) {
                if from_dir.starts_with(to_dir) {
                    return true;
                }
            }
        }
        false
    }
}
