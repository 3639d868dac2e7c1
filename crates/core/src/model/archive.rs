//! Scanned archive model.
//!
//! One [`ArchiveModel`] per scanned archive. Nested containers (an ear
//! holding wars holding jars) form a tree, stored as an arena inside
//! [`ArchiveSet`] with parent back-references by id so no node owns its
//! parent. Archive identity is the file name: rescanning the same name
//! merges locations instead of producing a second node.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Index of a node inside an [`ArchiveSet`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ArchiveId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArchiveKind {
    Jar,
    War,
    Ear,
    ClassesDir,
}

impl ArchiveKind {
    /// Container kinds can hold nested sub-archives.
    pub fn is_container(self) -> bool {
        matches!(self, ArchiveKind::War | ArchiveKind::Ear)
    }
}

/// Kind of an archive file judged by its extension, `None` for anything
/// that is not a recognized archive. Exploded `classes/` directories are
/// classified by the scanner, not here.
pub fn archive_kind_for_path(path: &Path) -> Option<ArchiveKind> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("jar") => Some(ArchiveKind::Jar),
        Some("war") => Some(ArchiveKind::War),
        Some("ear") => Some(ArchiveKind::Ear),
        _ => None,
    }
}

/// One place an archive name was seen during the scan. Ordered by path
/// then version so location sets render deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Location {
    pub path: PathBuf,
    pub version: Option<String>,
}

impl Location {
    pub fn new(path: impl Into<PathBuf>, version: Option<String>) -> Self {
        Self {
            path: path.into(),
            version,
        }
    }
}

/// Everything known about one archive after scanning. Immutable once the
/// builder finalizes it, except `locations` which keeps merging when the
/// same archive name shows up elsewhere.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveModel {
    /// File name including extension. Identity and ordering key.
    pub name: String,
    pub kind: ArchiveKind,
    /// Classfile major version of the first compiled unit scanned, or
    /// inherited from the first sub-archive for class-less containers.
    pub format_version: Option<u16>,
    pub manifest: Vec<String>,
    pub signing_info: Option<Vec<String>>,
    /// Compiled unit name -> serialVersionUID (when declared).
    pub provides: BTreeMap<String, Option<i64>>,
    /// Externally referenced unit names. Self-provided names are removed
    /// at finalization; `requires` and `provides` never intersect.
    pub requires: BTreeSet<String>,
    /// Per-unit fan-out, self-references included.
    pub class_dependencies: BTreeMap<String, BTreeSet<String>>,
    /// Cross-package fan-out, same-package edges and edges absorbed by a
    /// known profile excluded.
    pub package_dependencies: BTreeMap<String, BTreeSet<String>>,
    /// Package edges whose target matched a blacklist prefix.
    pub blacklisted_dependencies: BTreeMap<String, BTreeSet<String>>,
    /// Known profiles that satisfied at least one requirement.
    pub profiles: BTreeSet<String>,
    pub locations: BTreeSet<Location>,
    pub sub_archives: Vec<ArchiveId>,
    pub parent: Option<ArchiveId>,
}

impl ArchiveModel {
    pub fn new(name: impl Into<String>, kind: ArchiveKind) -> Self {
        Self {
            name: name.into(),
            kind,
            format_version: None,
            manifest: Vec::new(),
            signing_info: None,
            provides: BTreeMap::new(),
            requires: BTreeSet::new(),
            class_dependencies: BTreeMap::new(),
            package_dependencies: BTreeMap::new(),
            blacklisted_dependencies: BTreeMap::new(),
            profiles: BTreeSet::new(),
            locations: BTreeSet::new(),
            sub_archives: Vec::new(),
            parent: None,
        }
    }
}

impl PartialEq for ArchiveModel {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ArchiveModel {}

impl PartialOrd for ArchiveModel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArchiveModel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// Arena of archive nodes plus the name-keyed top-level universe.
///
/// Scan workers each build a private `ArchiveSet` and the orchestrator
/// merges them with [`ArchiveSet::absorb`] at the join point, so no node
/// is ever shared between threads while mutable.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ArchiveSet {
    nodes: Vec<ArchiveModel>,
    top_level: BTreeMap<String, ArchiveId>,
}

impl ArchiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level archives.
    pub fn len(&self) -> usize {
        self.top_level.len()
    }

    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty()
    }

    pub fn get(&self, id: ArchiveId) -> &ArchiveModel {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: ArchiveId) -> &mut ArchiveModel {
        &mut self.nodes[id.0]
    }

    pub fn find(&self, name: &str) -> Option<ArchiveId> {
        self.top_level.get(name).copied()
    }

    /// Top-level archives in name order. This is the universe iteration
    /// order the resolver's first-match contract depends on.
    pub fn top_level(&self) -> impl Iterator<Item = (&str, ArchiveId)> {
        self.top_level.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Add a node to the arena without registering it as top-level.
    pub fn alloc(&mut self, model: ArchiveModel) -> ArchiveId {
        let id = ArchiveId(self.nodes.len());
        self.nodes.push(model);
        id
    }

    /// Register an arena node as a top-level archive. If the name is
    /// already present the existing node wins and only absorbs the
    /// newcomer's locations.
    pub fn register_root(&mut self, id: ArchiveId) {
        let name = self.nodes[id.0].name.clone();
        if let Some(&existing) = self.top_level.get(&name) {
            if existing != id {
                let locations = std::mem::take(&mut self.nodes[id.0].locations);
                self.nodes[existing.0].locations.extend(locations);
            }
        } else {
            self.top_level.insert(name, id);
        }
    }

    /// Merge another set (typically a scan worker's private arena) into
    /// this one. Duplicate top-level names merge locations; new names are
    /// re-rooted with their whole subtree, ids remapped.
    pub fn absorb(&mut self, other: ArchiveSet) {
        let ArchiveSet { nodes, top_level } = other;
        let mut nodes: Vec<Option<ArchiveModel>> = nodes.into_iter().map(Some).collect();
        for (name, root) in top_level {
            if let Some(&existing) = self.top_level.get(&name) {
                if let Some(duplicate) = nodes[root.0].take() {
                    self.nodes[existing.0].locations.extend(duplicate.locations);
                }
            } else {
                let new_root = self.copy_subtree(&mut nodes, root, None);
                self.top_level.insert(name, new_root);
            }
        }
    }

    fn copy_subtree(
        &mut self,
        nodes: &mut [Option<ArchiveModel>],
        id: ArchiveId,
        parent: Option<ArchiveId>,
    ) -> ArchiveId {
        let mut node = nodes[id.0].take().expect("arena node moved twice");
        let children = std::mem::take(&mut node.sub_archives);
        node.parent = parent;
        let new_id = self.alloc(node);
        let mut new_children = Vec::with_capacity(children.len());
        for child in children {
            new_children.push(self.copy_subtree(nodes, child, Some(new_id)));
        }
        self.nodes[new_id.0].sub_archives = new_children;
        new_id
    }

    /// Ids of `id` and every descendant, preorder.
    pub fn subtree(&self, id: ArchiveId) -> Vec<ArchiveId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].sub_archives.iter().rev().copied());
        }
        out
    }

    /// Union of provided unit names across an archive and its subtree.
    pub fn aggregate_provides(&self, id: ArchiveId) -> BTreeSet<String> {
        self.subtree(id)
            .into_iter()
            .flat_map(|node| self.nodes[node.0].provides.keys().cloned())
            .collect()
    }

    /// Union of required unit names across an archive and its subtree.
    /// Each node's own provides are already filtered out per-node, but a
    /// sub-archive may still require a unit a sibling provides.
    pub fn aggregate_requires(&self, id: ArchiveId) -> BTreeSet<String> {
        self.subtree(id)
            .into_iter()
            .flat_map(|node| self.nodes[node.0].requires.iter().cloned())
            .collect()
    }
}
