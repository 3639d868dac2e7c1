use jarscope_core::model::{ArchiveSet, GlobalIndex};
use jarscope_core::Resolution;
use std::collections::{BTreeMap, BTreeSet};
use tabled::{Table, Tabled};

pub struct Analysis<'a> {
    pub set: &'a ArchiveSet,
    pub index: &'a GlobalIndex,
    pub resolution: &'a Resolution,
    pub transitive: &'a BTreeMap<String, BTreeSet<String>>,
    pub circular: &'a BTreeMap<String, BTreeSet<String>>,
}

#[derive(Tabled)]
struct ArchiveRow {
    #[tabled(rename = "Archive")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Provides")]
    provides: usize,
    #[tabled(rename = "Requires")]
    requires: usize,
    #[tabled(rename = "Depends on")]
    depends_on: String,
}

pub fn text(analysis: &Analysis<'_>) {
    let rows: Vec<ArchiveRow> = analysis
        .set
        .top_level()
        .map(|(name, id)| {
            let model = analysis.set.get(id);
            let depends_on = analysis
                .resolution
                .depends_on
                .get(name)
                .map(|targets| {
                    targets
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            ArchiveRow {
                name: name.to_string(),
                kind: format!("{:?}", model.kind),
                version: model
                    .locations
                    .iter()
                    .find_map(|location| location.version.clone())
                    .unwrap_or_else(|| "-".to_string()),
                provides: model.provides.len(),
                requires: model.requires.len(),
                depends_on,
            }
        })
        .collect();
    println!("{}", Table::new(rows));

    let unresolved = analysis.resolution.unresolved();
    if unresolved.values().any(|units| !units.is_empty()) {
        println!("\nUnresolved references:");
        for (archive, units) in &unresolved {
            for unit in units {
                println!("  {archive}: {unit}");
            }
        }
    }

    println!("\nTransitive dependencies:");
    for (archive, closure) in analysis.transitive {
        if !closure.is_empty() {
            println!(
                "  {archive} -> {}",
                closure.iter().cloned().collect::<Vec<_>>().join(", ")
            );
        }
    }

    let cycles: Vec<_> = analysis
        .circular
        .iter()
        .filter(|(_, partners)| !partners.is_empty())
        .collect();
    if !cycles.is_empty() {
        println!("\nCircular dependencies:");
        for (archive, partners) in cycles {
            println!(
                "  {archive} <-> {}",
                partners.iter().cloned().collect::<Vec<_>>().join(", ")
            );
        }
    }

    let multi = analysis.index.multi_providers();
    if !multi.is_empty() {
        println!("\nProvided by multiple archives:");
        for (unit, providers) in &multi {
            println!(
                "  {unit}: {}",
                providers.iter().cloned().collect::<Vec<_>>().join(", ")
            );
        }
    }
}

pub fn json(analysis: &Analysis<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let value = serde_json::json!({
        "archives": analysis.set,
        "index": analysis.index.snapshot(),
        "resolution": analysis.resolution,
        "transitive": analysis.transitive,
        "circular": analysis.circular,
        "multiple_providers": analysis.index.multi_providers(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
