//! Archive model and dependency graph engine.
//!
//! The core of jarscope: a scanned archive set (arena of [`ArchiveModel`]
//! nodes), a global provides index, requirement resolution against a
//! sorted universe with pluggable visibility and known platform profiles,
//! and transitive closure / cycle detection over the resulting graph.
//!
//! Scanning (zip walking, classfile reading) lives in `jarscope-scanner`;
//! report rendering and policy live in the CLI. This crate is purely the
//! in-memory model and the graph algorithms over it.

pub mod graph;
pub mod logging;
pub mod model;
pub mod resolver;

pub use graph::ClosureEngine;
pub use model::{
    ArchiveId, ArchiveKind, ArchiveModel, ArchiveSet, GlobalIndex, KnownProfile, Location,
    archive_kind_for_path,
    profile::{ClassListProfile, PrefixProfile},
    visibility::{DirectoryScoped, Permissive, Visibility},
};
pub use resolver::{DependencyResolver, DependencyTarget, Resolution};
