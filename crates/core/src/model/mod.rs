//! Data model for one analysis run: the archive arena, the global
//! provides index, known platform profiles and visibility policies.

pub mod archive;
pub mod index;
pub mod profile;
pub mod visibility;

pub use archive::{ArchiveId, ArchiveKind, ArchiveModel, ArchiveSet, Location, archive_kind_for_path};
pub use index::GlobalIndex;
pub use profile::KnownProfile;
pub use visibility::Visibility;
