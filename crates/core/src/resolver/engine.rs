//! Requirement resolution over the scanned universe.
//!
//! For every requirement of an archive the resolver scans the name-sorted
//! universe and accepts the first other archive that provides the unit
//! and is visible from the requiring archive. Only when no in-universe
//! provider exists are the known platform profiles consulted; a profile
//! hit satisfies the requirement with no edge at all. Anything still
//! unresolved is surfaced as data, never as an error.
//!
//! First-match over a sorted universe is a behavioral contract: report
//! stability downstream depends on a deterministic choice among multiple
//! valid providers.

use crate::model::{ArchiveId, ArchiveSet, KnownProfile, Visibility};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// One resolved slot in a depends-on set: either a providing archive or
/// the raw unit name nothing provided.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DependencyTarget {
    Archive(String),
    Unresolved(String),
}

impl DependencyTarget {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, DependencyTarget::Unresolved(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            DependencyTarget::Archive(name) => name,
            DependencyTarget::Unresolved(unit) => unit,
        }
    }
}

impl fmt::Display for DependencyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyTarget::Archive(name) => write!(f, "{name}"),
            DependencyTarget::Unresolved(unit) => write!(f, "{unit} (?)"),
        }
    }
}

/// Direct dependency relations for the whole archive set, both
/// directions. Derived data; recomputed per analysis run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    pub depends_on: BTreeMap<String, BTreeSet<DependencyTarget>>,
    pub dependants: BTreeMap<String, BTreeSet<String>>,
}

impl Resolution {
    /// Resolved archive-to-archive edges only, the input shape the
    /// closure engine expects. Unresolved markers are dropped.
    pub fn archive_edges(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.depends_on
            .iter()
            .map(|(name, targets)| {
                let edges = targets
                    .iter()
                    .filter_map(|target| match target {
                        DependencyTarget::Archive(to) => Some(to.clone()),
                        DependencyTarget::Unresolved(_) => None,
                    })
                    .collect();
                (name.clone(), edges)
            })
            .collect()
    }

    /// Dependant edges in closure-engine shape.
    pub fn dependant_edges(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.dependants.clone()
    }

    /// Unresolved unit names per archive.
    pub fn unresolved(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.depends_on
            .iter()
            .map(|(name, targets)| {
                let units = targets
                    .iter()
                    .filter_map(|target| match target {
                        DependencyTarget::Unresolved(unit) => Some(unit.clone()),
                        DependencyTarget::Archive(_) => None,
                    })
                    .collect();
                (name.clone(), units)
            })
            .collect()
    }
}

pub struct DependencyResolver<'a> {
    set: &'a ArchiveSet,
    profiles: &'a [Box<dyn KnownProfile>],
    visibility: &'a dyn Visibility,
    /// Name-sorted provider candidates with their subtree provides,
    /// class-bearing archives only. Precomputed once; the first-match
    /// scan runs over this.
    universe: Vec<(ArchiveId, BTreeSet<String>)>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(
        set: &'a ArchiveSet,
        profiles: &'a [Box<dyn KnownProfile>],
        visibility: &'a dyn Visibility,
    ) -> Self {
        let universe = set
            .top_level()
            .map(|(_, id)| (id, set.aggregate_provides(id)))
            .filter(|(_, provides)| !provides.is_empty())
            .collect();
        Self {
            set,
            profiles,
            visibility,
            universe,
        }
    }

    /// Archives (or unresolved units) `archive` depends on. Container
    /// archives contribute the union of requirements across their
    /// subtree, minus anything the subtree itself provides.
    pub fn direct_depends_on(&self, archive: ArchiveId) -> BTreeSet<DependencyTarget> {
        let own_provides = self.set.aggregate_provides(archive);
        let requires = self.set.aggregate_requires(archive);
        let from = self.set.get(archive);

        let mut out = BTreeSet::new();
        'requirement: for unit in requires.difference(&own_provides) {
            for (candidate, provides) in &self.universe {
                if *candidate == archive {
                    continue;
                }
                if provides.contains(unit)
                    && self.visibility.visible(from, self.set.get(*candidate))
                {
                    out.insert(DependencyTarget::Archive(
                        self.set.get(*candidate).name.clone(),
                    ));
                    continue 'requirement;
                }
            }
            // No visibility check for platform profiles; a hit simply
            // satisfies the requirement.
            if self.profiles.iter().any(|profile| profile.provides_unit(unit)) {
                continue;
            }
            out.insert(DependencyTarget::Unresolved(unit.clone()));
        }
        out
    }

    /// Archives that depend on `archive`: the inversion of the same
    /// resolution rule, so depends-on and dependants stay symmetric.
    pub fn direct_dependants(&self, archive: ArchiveId) -> BTreeSet<String> {
        let target = DependencyTarget::Archive(self.set.get(archive).name.clone());
        self.set
            .top_level()
            .filter(|&(_, other)| other != archive)
            .filter(|&(_, other)| self.direct_depends_on(other).contains(&target))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Both directions for every top-level archive. Depends-on sets are
    /// computed in parallel (the resolver only reads the completed set),
    /// dependants are derived by inverting the resolved edges.
    pub fn resolve_all(&self) -> Resolution {
        let ids: Vec<(String, ArchiveId)> = self
            .set
            .top_level()
            .map(|(name, id)| (name.to_string(), id))
            .collect();

        let depends_on: BTreeMap<String, BTreeSet<DependencyTarget>> = ids
            .par_iter()
            .map(|(name, id)| (name.clone(), self.direct_depends_on(*id)))
            .collect();
        debug!(archives = ids.len(), "direct dependencies resolved");

        let mut dependants: BTreeMap<String, BTreeSet<String>> = ids
            .iter()
            .map(|(name, _)| (name.clone(), BTreeSet::new()))
            .collect();
        for (from, targets) in &depends_on {
            for target in targets {
                if let DependencyTarget::Archive(to) = target {
                    if let Some(entry) = dependants.get_mut(to) {
                        entry.insert(from.clone());
                    }
                }
            }
        }

        Resolution {
            depends_on,
            dependants,
        }
    }
}

/// Global package-level edge map: the union of every archive's package
/// dependencies across the whole set, subtree included. Feeds the same
/// closure engine as the archive-level edges.
pub fn package_edges(set: &ArchiveSet) -> BTreeMap<String, BTreeSet<String>> {
    let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (_, id) in set.top_level() {
        for node in set.subtree(id) {
            for (from, to) in &set.get(node).package_dependencies {
                edges.entry(from.clone()).or_default().extend(to.iter().cloned());
            }
        }
    }
    edges
}
