use crate::report::{self, Analysis};
use crate::{Format, ProfileKind, VisibilityKind};
use jarscope_core::{
    ClosureEngine, DependencyResolver, DirectoryScoped, KnownProfile, Permissive, PrefixProfile,
    Visibility,
};
use jarscope_scanner::{Scanner, discover_jdk_profile};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

pub fn run(
    paths: Vec<PathBuf>,
    blacklist: Vec<String>,
    profile_kinds: Vec<ProfileKind>,
    visibility: VisibilityKind,
    shared_roots: Vec<PathBuf>,
    format: Format,
) -> Result<i32, Box<dyn std::error::Error>> {
    let profiles = build_profiles(&profile_kinds);
    let outcome = Scanner::new(&profiles, &blacklist).scan(&paths);
    if outcome.set.is_empty() {
        warn!("no archives found");
    }

    let visibility: Box<dyn Visibility> = match visibility {
        VisibilityKind::Permissive => Box::new(Permissive),
        VisibilityKind::DirectoryScoped => Box::new(DirectoryScoped::new(shared_roots)),
    };

    let resolver = DependencyResolver::new(&outcome.set, &profiles, visibility.as_ref());
    let resolution = resolver.resolve_all();

    let mut closures = ClosureEngine::new(&resolution.archive_edges());
    let transitive: BTreeMap<String, _> = outcome
        .set
        .top_level()
        .map(|(name, _)| (name.to_string(), closures.transitive_closure(name)))
        .collect();
    let circular = closures.circular_pairs();
    let has_cycles = circular.values().any(|partners| !partners.is_empty());

    let analysis = Analysis {
        set: &outcome.set,
        index: &outcome.index,
        resolution: &resolution,
        transitive: &transitive,
        circular: &circular,
    };
    match format {
        Format::Text => report::text(&analysis),
        Format::Json => report::json(&analysis)?,
    }

    if has_cycles {
        info!("circular dependencies found");
        Ok(2)
    } else {
        Ok(0)
    }
}

fn build_profiles(kinds: &[ProfileKind]) -> Vec<Box<dyn KnownProfile>> {
    let mut profiles: Vec<Box<dyn KnownProfile>> = Vec::new();
    for kind in kinds {
        match kind {
            ProfileKind::JavaSe => profiles.push(Box::new(PrefixProfile::java_se())),
            ProfileKind::JavaEe => profiles.push(Box::new(PrefixProfile::java_ee())),
            ProfileKind::Jdk => match discover_jdk_profile() {
                Some(profile) => profiles.push(Box::new(profile)),
                None => {
                    warn!("no local JDK found, falling back to the Java SE prefix profile");
                    profiles.push(Box::new(PrefixProfile::java_se()));
                }
            },
        }
    }
    profiles
}
