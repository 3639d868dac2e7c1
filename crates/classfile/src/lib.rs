//! Compiled-unit metadata extraction.
//!
//! Reads a single `.class` blob and extracts the little this tool needs:
//! the unit's own qualified name, every type name it references, the
//! `serialVersionUID` marker when one is declared, and the classfile
//! major version. Everything else in the classfile is ignored.

mod reader;

use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

pub use reader::read;

#[derive(Error, Debug)]
pub enum ClassfileError {
    #[error("malformed compiled unit: {0}")]
    Malformed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ristretto_classfile::Error> for ClassfileError {
    fn from(err: ristretto_classfile::Error) -> Self {
        ClassfileError::Malformed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClassfileError>;

/// Facts extracted from one compiled unit. Ephemeral: the scanner folds
/// this into the owning archive's model immediately.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledUnitFact {
    /// Dotted fully-qualified name, e.g. `com.example.Foo$Bar`.
    pub qualified_name: String,
    /// Dotted names of every type this unit references, self included
    /// if the unit refers to itself. Primitives and array wrappers are
    /// already stripped.
    pub referenced_names: BTreeSet<String>,
    /// Value of a compile-time-constant `serialVersionUID`, if declared.
    pub serialization_marker: Option<i64>,
    /// Classfile major version (e.g. 52 for Java 8).
    pub format_version: u16,
}
