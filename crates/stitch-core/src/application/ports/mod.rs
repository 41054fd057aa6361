//! Ports (interfaces) for the hexagonal architecture.
//!
//! Ports define contracts that adapters must implement.
//! The application layer depends on these abstractions, not concrete implementations.

pub mod output;

pub use output::{Filesystem, MetadataSource, TemplateLibrary};

#[cfg(test)]
pub use output::MockMetadataSource;
