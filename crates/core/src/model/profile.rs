//! Known platform profiles.
//!
//! A profile is a provides-oracle for a platform or framework class set
//! (the JDK, a Java EE stack, an app-server module). The scanner and the
//! resolver consult profiles to keep ubiquitous platform dependencies out
//! of package- and archive-level views; "first matching profile wins" is
//! part of the behavioral contract.

use std::collections::BTreeSet;

pub trait KnownProfile: Send + Sync {
    fn name(&self) -> &str;

    /// Module identifier for module-system aware platforms, if any.
    fn module_identifier(&self) -> Option<&str> {
        None
    }

    fn provides_unit(&self, unit: &str) -> bool;
}

/// Profile backed by an exact class-name set, e.g. one materialized from
/// a local JDK image.
#[derive(Debug, Clone)]
pub struct ClassListProfile {
    name: String,
    module: Option<String>,
    classes: BTreeSet<String>,
}

impl ClassListProfile {
    pub fn new(
        name: impl Into<String>,
        module: Option<String>,
        classes: BTreeSet<String>,
    ) -> Self {
        Self {
            name: name.into(),
            module,
            classes,
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl KnownProfile for ClassListProfile {
    fn name(&self) -> &str {
        &self.name
    }

    fn module_identifier(&self) -> Option<&str> {
        self.module.as_deref()
    }

    fn provides_unit(&self, unit: &str) -> bool {
        self.classes.contains(unit)
    }
}

/// Profile backed by dotted package prefixes. A prefix matches the
/// package itself and its subtree, never a lexical half-segment
/// (`java.sql` matches `java.sql.Driver` but not `java.sqlx.Foo`).
#[derive(Debug, Clone)]
pub struct PrefixProfile {
    name: String,
    module: Option<String>,
    prefixes: Vec<String>,
}

impl PrefixProfile {
    pub fn new(name: impl Into<String>, module: Option<String>, prefixes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            module,
            prefixes,
        }
    }

    /// Java SE core packages.
    pub fn java_se() -> Self {
        Self::new(
            "Java SE",
            None,
            vec![
                "java".to_string(),
                "javax.swing".to_string(),
                "javax.xml".to_string(),
                "javax.sql".to_string(),
                "javax.naming".to_string(),
                "javax.management".to_string(),
                "javax.crypto".to_string(),
                "javax.net".to_string(),
                "javax.security".to_string(),
                "javax.imageio".to_string(),
                "javax.sound".to_string(),
                "javax.accessibility".to_string(),
                "org.w3c.dom".to_string(),
                "org.xml.sax".to_string(),
                "org.ietf.jgss".to_string(),
                "sun".to_string(),
                "com.sun".to_string(),
                "jdk".to_string(),
            ],
        )
    }

    /// Java EE / Jakarta EE API packages.
    pub fn java_ee() -> Self {
        Self::new(
            "Java EE",
            None,
            vec!["javax".to_string(), "jakarta".to_string()],
        )
    }
}

impl KnownProfile for PrefixProfile {
    fn name(&self) -> &str {
        &self.name
    }

    fn module_identifier(&self) -> Option<&str> {
        self.module.as_deref()
    }

    fn provides_unit(&self, unit: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            unit.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
        })
    }
}
