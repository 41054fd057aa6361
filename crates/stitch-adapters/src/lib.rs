//! Infrastructure adapters for Stitch.
//!
//! This crate implements the ports defined in `stitch-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod formatter;
pub mod metadata;
pub mod templates;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use formatter::{ExternalFormatter, FormatterError};
pub use metadata::TomlMetadataSource;
pub use templates::{BuiltinTemplateLibrary, DirectoryTemplateLibrary, open_library};
