//! Manifest and signature-file capture.
//!
//! Lines are kept verbatim and order-preserving; the only semantic read
//! is the version lookup, which tries Specification-Version,
//! Implementation-Version and Version in that order, first in the main
//! attribute section and then in each per-entry section in order.

const VERSION_KEYS: [&str; 3] = ["Specification-Version", "Implementation-Version", "Version"];

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub lines: Vec<String>,
}

impl Manifest {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Archive version as declared by the manifest, if any.
    pub fn version(&self) -> Option<String> {
        for section in self.sections() {
            for key in VERSION_KEYS {
                if let Some(value) = attribute(section, key) {
                    return Some(value);
                }
            }
        }
        None
    }

    /// Attribute sections in manifest order; the first one is the main
    /// section.
    fn sections(&self) -> impl Iterator<Item = &[String]> {
        self.lines
            .split(|line| line.trim().is_empty())
            .filter(|section| !section.is_empty())
    }
}

/// Manifest attribute names are case-insensitive.
fn attribute(section: &[String], key: &str) -> Option<String> {
    section.iter().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case(key)
            .then(|| value.trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specification_version_wins_over_implementation() {
        let manifest = Manifest::parse(
            "Manifest-Version: 1.0\n\
             Implementation-Version: 9.9\n\
             Specification-Version: 1.2\n",
        );
        assert_eq!(manifest.version(), Some("1.2".to_string()));
    }

    #[test]
    fn per_entry_sections_are_searched_after_the_main_one() {
        let manifest = Manifest::parse(
            "Manifest-Version: 1.0\n\
             \n\
             Name: com/x/\n\
             Implementation-Version: 3.1\n",
        );
        assert_eq!(manifest.version(), Some("3.1".to_string()));
    }

    #[test]
    fn no_version_attribute_yields_none() {
        let manifest = Manifest::parse("Manifest-Version: 1.0\nMain-Class: com.x.Main\n");
        assert_eq!(manifest.version(), None);
        assert_eq!(manifest.lines.len(), 2);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let manifest = Manifest::parse("IMPLEMENTATION-VERSION: 2.0\n");
        assert_eq!(manifest.version(), Some("2.0".to_string()));
    }
}
