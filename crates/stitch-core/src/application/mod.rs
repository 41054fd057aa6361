//! Application layer for Stitch.
//!
//! This layer contains:
//! - **Services**: the generation run (ScaffoldOrchestrator) and its helpers
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! generation rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    ArtifactRecord, ArtifactStateInspector, FileState, FragmentResolver, GenerationRequest,
    GenerationSummary, Outcome, RunState, ScaffoldOrchestrator,
};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, MetadataSource, TemplateLibrary};

pub use error::ApplicationError;
