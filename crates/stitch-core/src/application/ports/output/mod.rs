//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stitch-adapters` crate provides implementations.

use crate::domain::{Entity, TemplateId};
use crate::error::StitchResult;
use std::path::Path;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `stitch_adapters::filesystem::LocalFilesystem` (production)
/// - `stitch_adapters::filesystem::MemoryFilesystem` (testing, dry runs)
///
/// Writes always replace the whole file. There is no cross-file transaction.
pub trait Filesystem: Send + Sync {
    /// Read a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> StitchResult<String>;

    /// Write content to a file, replacing it.
    fn write_file(&self, path: &Path, content: &str) -> StitchResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StitchResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for entity metadata.
///
/// Implemented by:
/// - `stitch_adapters::metadata::TomlMetadataSource` (entity manifest)
///
/// Only namespaces returned by [`namespaces`](Self::namespaces) are part of
/// the generation set.
#[cfg_attr(test, mockall::automock)]
pub trait MetadataSource: Send + Sync {
    /// Every namespace in the generation set.
    fn namespaces(&self) -> StitchResult<Vec<String>>;

    /// Entities of `namespace`, in declaration order.
    fn entities(&self, namespace: &str) -> StitchResult<Vec<Entity>>;

    /// One entity, or `None` when the namespace has no such entity.
    fn entity(&self, namespace: &str, name: &str) -> StitchResult<Option<Entity>>;
}

/// Port for template text.
///
/// Implemented by:
/// - `stitch_adapters::templates::BuiltinTemplateLibrary` (compiled in)
/// - `stitch_adapters::templates::DirectoryTemplateLibrary` (user overrides)
///
/// Bodies are opaque text with `$Token$` placeholders.
pub trait TemplateLibrary: Send + Sync {
    /// Load a template body. Unknown ids are `ApplicationError::TemplateNotFound`.
    fn load_template(&self, id: &TemplateId) -> StitchResult<String>;
}
