//! Single-archive builder.
//!
//! Walks the entries of one archive, turns compiled units into model
//! facts, and finalizes an [`ArchiveModel`] into the arena. Container
//! archives spill nested jars/wars to a scratch directory and recurse;
//! a sub-archive that fails to build is logged and omitted while the
//! parent keeps everything else.

use crate::manifest::Manifest;
use crate::Result;
use jarscope_classfile::CompiledUnitFact;
use jarscope_core::model::{
    ArchiveId, ArchiveKind, ArchiveModel, ArchiveSet, GlobalIndex, KnownProfile, Location,
    archive_kind_for_path,
};
use std::collections::BTreeSet;
use std::fs;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

pub struct ArchiveBuilder<'a> {
    profiles: &'a [Box<dyn KnownProfile>],
    blacklist: &'a [String],
    index: &'a GlobalIndex,
}

impl<'a> ArchiveBuilder<'a> {
    pub fn new(
        profiles: &'a [Box<dyn KnownProfile>],
        blacklist: &'a [String],
        index: &'a GlobalIndex,
    ) -> Self {
        Self {
            profiles,
            blacklist,
            index,
        }
    }

    /// Build one archive file into the arena. `Ok(None)` means the file
    /// is not a recognizable archive (wrong extension, or no compiled
    /// units and no sub-archives); the caller drops it silently.
    pub fn build(&self, set: &mut ArchiveSet, path: &Path) -> Result<Option<ArchiveId>> {
        let Some(kind) = archive_kind_for_path(path) else {
            return Ok(None);
        };

        let file = File::open(path)?;
        let mut zip = ZipArchive::new(file)?;
        let mut acc = Accumulator::new(archive_name(path), kind, self);
        let mut children = Vec::new();

        let scratch = if kind.is_container() {
            Some(tempfile::tempdir()?)
        } else {
            None
        };

        for i in 0..zip.len() {
            // Entry streams live only for this iteration, so one bad
            // entry never holds a handle across the rest of the scan.
            let mut entry = match zip.by_index(i) {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(archive = %acc.model.name, index = i, "unreadable entry, skipped: {err}");
                    continue;
                }
            };
            if entry.is_dir() {
                continue;
            }
            let entry_name = entry.name().to_string();

            if entry_name.ends_with(".class") {
                let mut bytes = Vec::new();
                if let Err(err) = entry.read_to_end(&mut bytes) {
                    warn!(archive = %acc.model.name, entry = %entry_name, "read failed, skipped: {err}");
                    continue;
                }
                acc.add_class(&entry_name, &bytes);
            } else if entry_name == "META-INF/MANIFEST.MF" {
                let mut text = String::new();
                if entry.read_to_string(&mut text).is_ok() {
                    acc.manifest = Manifest::parse(&text);
                }
            } else if entry_name.starts_with("META-INF/") && entry_name.ends_with(".SF") {
                let mut text = String::new();
                if entry.read_to_string(&mut text).is_ok() {
                    acc.add_signature(&text);
                }
            } else if let Some(scratch) = &scratch {
                if archive_kind_for_path(Path::new(&entry_name)).is_none() {
                    continue;
                }
                let Some(safe_path) = entry.enclosed_name() else {
                    warn!(archive = %acc.model.name, entry = %entry_name, "unsafe entry path, skipped");
                    continue;
                };
                let mut bytes = Vec::new();
                if let Err(err) = entry.read_to_end(&mut bytes) {
                    warn!(archive = %acc.model.name, entry = %entry_name, "read failed, skipped: {err}");
                    continue;
                }
                let target = scratch.path().join(safe_path);
                if let Some(parent) = target.parent() {
                    let _ = fs::create_dir_all(parent);
                }
                if let Err(err) = fs::write(&target, &bytes) {
                    warn!(archive = %acc.model.name, entry = %entry_name, "spill failed, skipped: {err}");
                    continue;
                }
                match self.build(set, &target) {
                    Ok(Some(child)) => children.push(child),
                    Ok(None) => debug!(archive = %acc.model.name, entry = %entry_name, "nested entry not a recognizable archive"),
                    Err(err) => {
                        warn!(archive = %acc.model.name, entry = %entry_name, "sub-archive build failed, omitted: {err}");
                    }
                }
            }
        }

        Ok(acc.finalize(set, path, children))
    }

    /// Build an exploded classes directory as a `ClassesDir` archive.
    pub fn build_classes_dir(&self, set: &mut ArchiveSet, dir: &Path) -> Result<Option<ArchiveId>> {
        let mut acc = Accumulator::new(archive_name(dir), ArchiveKind::ClassesDir, self);

        let manifest_path = dir.join("META-INF/MANIFEST.MF");
        if let Ok(text) = fs::read_to_string(&manifest_path) {
            acc.manifest = Manifest::parse(&text);
        }

        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(dir = %dir.display(), "walk error, skipped: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file()
                || entry.path().extension().and_then(|e| e.to_str()) != Some("class")
            {
                continue;
            }
            match fs::read(entry.path()) {
                Ok(bytes) => acc.add_class(&entry.path().display().to_string(), &bytes),
                Err(err) => {
                    warn!(file = %entry.path().display(), "read failed, skipped: {err}");
                }
            }
        }

        Ok(acc.finalize(set, dir, Vec::new()))
    }
}

fn archive_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn package_of(unit: &str) -> &str {
    unit.rsplit_once('.').map_or("", |(package, _)| package)
}

/// Accumulates per-unit facts into one model; shared by the zip and the
/// exploded-directory paths.
struct Accumulator<'a, 'b> {
    model: ArchiveModel,
    manifest: Manifest,
    builder: &'b ArchiveBuilder<'a>,
}

impl<'a, 'b> Accumulator<'a, 'b> {
    fn new(name: String, kind: ArchiveKind, builder: &'b ArchiveBuilder<'a>) -> Self {
        Self {
            model: ArchiveModel::new(name, kind),
            manifest: Manifest::default(),
            builder,
        }
    }

    fn add_class(&mut self, entry_name: &str, bytes: &[u8]) {
        match jarscope_classfile::read(bytes) {
            Ok(fact) => self.add_unit(fact),
            Err(err) => {
                debug!(archive = %self.model.name, entry = %entry_name, "malformed compiled unit, skipped: {err}");
            }
        }
    }

    fn add_unit(&mut self, fact: CompiledUnitFact) {
        // First compiled unit decides the archive's format version.
        if self.model.format_version.is_none() {
            self.model.format_version = Some(fact.format_version);
        }
        self.model
            .requires
            .extend(fact.referenced_names.iter().cloned());
        self.record_package_edges(&fact.qualified_name, &fact.referenced_names);
        self.model
            .class_dependencies
            .insert(fact.qualified_name.clone(), fact.referenced_names);
        self.model
            .provides
            .insert(fact.qualified_name, fact.serialization_marker);
    }

    fn record_package_edges(&mut self, unit: &str, referenced: &BTreeSet<String>) {
        let unit_package = package_of(unit).to_string();
        for name in referenced {
            let target_package = package_of(name);
            if target_package == unit_package {
                continue;
            }

            // First matching profile wins and suppresses the edge from
            // the package-level view.
            if let Some(profile) = self
                .builder
                .profiles
                .iter()
                .find(|profile| profile.provides_unit(name))
            {
                self.model.profiles.insert(profile.name().to_string());
            } else {
                self.model
                    .package_dependencies
                    .entry(unit_package.clone())
                    .or_default()
                    .insert(target_package.to_string());
            }

            if self
                .builder
                .blacklist
                .iter()
                .any(|prefix| name.starts_with(prefix) || target_package.starts_with(prefix))
            {
                self.model
                    .blacklisted_dependencies
                    .entry(unit_package.clone())
                    .or_default()
                    .insert(target_package.to_string());
            }
        }
    }

    fn add_signature(&mut self, text: &str) {
        let lines = self
            .model
            .signing_info
            .get_or_insert_with(Vec::new);
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(text.lines().map(str::to_string));
    }

    fn finalize(
        mut self,
        set: &mut ArchiveSet,
        path: &Path,
        children: Vec<ArchiveId>,
    ) -> Option<ArchiveId> {
        if self.model.provides.is_empty() && children.is_empty() {
            debug!(archive = %self.model.name, "no compiled units and no sub-archives, not an archive");
            return None;
        }

        // Self-provided names never count as external requirements.
        let provided: Vec<String> = self.model.provides.keys().cloned().collect();
        for unit in &provided {
            self.model.requires.remove(unit);
        }

        // Containers without top-level units inherit the first
        // sub-archive's format version.
        if self.model.format_version.is_none() {
            self.model.format_version = children
                .iter()
                .find_map(|child| set.get(*child).format_version);
        }

        let version = self.manifest.version();
        self.model.manifest = self.manifest.lines;
        self.model
            .locations
            .insert(Location::new(path.to_path_buf(), version));

        for unit in &provided {
            self.builder.index.register(unit, &self.model.name);
        }

        let id = set.alloc(self.model);
        for child in &children {
            set.get_mut(*child).parent = Some(id);
        }
        set.get_mut(id).sub_archives = children;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::package_of;

    #[test]
    fn package_of_handles_default_package() {
        assert_eq!(package_of("com.x.Foo"), "com.x");
        assert_eq!(package_of("Foo"), "");
    }
}
