//! Local JDK profile discovery.
//!
//! Materializes a [`ClassListProfile`] from a discovered JDK so that
//! standard-library references resolve against an exact class list
//! instead of a prefix table. Modern JDKs ship a jimage (`lib/modules`);
//! JDK 8 and older ship `rt.jar`.

use jarscope_core::ClassListProfile;
use ristretto_jimage::Image;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipArchive;

/// Discover a local JDK and build an exact-class-list profile from it.
/// Returns `None` when no usable JDK is found; callers fall back to the
/// prefix-based Java SE profile.
pub fn discover_jdk_profile() -> Option<ClassListProfile> {
    let root = jdk_root()?;
    info!(root = %root.display(), "building JDK profile");

    let jimage = root.join("lib/modules");
    let classes = if jimage.is_file() {
        jimage_classes(&jimage)?
    } else {
        let rt = ["jre/lib/rt.jar", "lib/rt.jar"]
            .iter()
            .map(|suffix| root.join(suffix))
            .find(|path| path.is_file())?;
        rt_jar_classes(&rt)?
    };

    if classes.is_empty() {
        return None;
    }
    debug!(classes = classes.len(), "JDK profile ready");
    Some(ClassListProfile::new("Java SE (JDK)", None, classes))
}

fn jdk_root() -> Option<PathBuf> {
    if let Ok(java_home) = std::env::var("JAVA_HOME") {
        let path = PathBuf::from(java_home);
        if is_jdk(&path) {
            return Some(path);
        }
    }

    let mut search_roots: Vec<PathBuf> = Vec::new();
    #[cfg(target_os = "linux")]
    search_roots.push(PathBuf::from("/usr/lib/jvm/"));
    #[cfg(target_os = "macos")]
    search_roots.push(PathBuf::from("/Library/Java/JavaVirtualMachines/"));
    if let Some(mut sdkman) = dirs::home_dir() {
        sdkman.push(".sdkman/candidates/java/");
        search_roots.push(sdkman);
    }

    for root in search_roots {
        let Ok(entries) = std::fs::read_dir(&root) else {
            continue;
        };
        for entry in entries.flatten() {
            let mut candidate = entry.path();
            if cfg!(target_os = "macos") && candidate.join("Contents/Home").exists() {
                candidate = candidate.join("Contents/Home");
            }
            if is_jdk(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

fn is_jdk(path: &Path) -> bool {
    path.join("lib/modules").is_file()
        || path.join("jre/lib/rt.jar").is_file()
        || path.join("lib/rt.jar").is_file()
}

fn jimage_classes(path: &Path) -> Option<BTreeSet<String>> {
    let image = Image::from_file(path).ok()?;
    let mut classes = BTreeSet::new();
    for resource in image.iter().flatten() {
        if resource.extension() != "class" {
            continue;
        }
        // Resource parents look like `/java.base/java/lang`; the module
        // segment is not part of the class name.
        let parent = resource.parent();
        let without_module = match parent.strip_prefix('/') {
            Some(stripped) => stripped.find('/').map_or("", |idx| &stripped[idx + 1..]),
            None => &parent,
        };
        if without_module.is_empty() {
            continue;
        }
        classes.insert(format!(
            "{}.{}",
            without_module.replace('/', "."),
            resource.base()
        ));
    }
    Some(classes)
}

fn rt_jar_classes(path: &Path) -> Option<BTreeSet<String>> {
    let file = File::open(path).ok()?;
    let mut archive = ZipArchive::new(file).ok()?;
    let mut classes = BTreeSet::new();
    for i in 0..archive.len() {
        let Ok(entry) = archive.by_index(i) else {
            continue;
        };
        let name = entry.name();
        if let Some(stripped) = name.strip_suffix(".class") {
            classes.insert(stripped.replace('/', "."));
        }
    }
    Some(classes)
}
