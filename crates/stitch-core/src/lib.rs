//! Stitch Core - Hexagonal Architecture Implementation
//!
//! Domain and application layers of the Stitch scaffold generator: entity
//! metadata in, generated and merged source files out, for a Django server
//! stack and a Flutter mobile stack.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           stitch-cli (CLI)              │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (ScaffoldOrchestrator, Inspector,      │
//! │   FragmentResolver)                     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, MetadataSource, Templates) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     stitch-adapters (Infrastructure)    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (Entity, type table, anchor merge,      │
//! │  artifact planner)                      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stitch_core::prelude::*;
//!
//! # fn demo(
//! #     metadata: Box<dyn MetadataSource>,
//! #     templates: Box<dyn TemplateLibrary>,
//! #     filesystem: Box<dyn Filesystem>,
//! # ) -> StitchResult<()> {
//! let orchestrator = ScaffoldOrchestrator::new(metadata, templates, filesystem);
//! let mut ctx = GenerationContext::new(".", "server", "mobile/app");
//! let request = GenerationRequest::new("billing", ArtifactKindSet::all(Ecosystem::Server))
//!     .entity("Invoice");
//! let summary = orchestrator.run(&mut ctx, &request)?;
//! println!("{} created, {} merged", summary.created(), summary.merged());
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ArtifactStateInspector, FileState, GenerationRequest, GenerationSummary, Outcome,
        RunState, ScaffoldOrchestrator,
        ports::{Filesystem, MetadataSource, TemplateLibrary},
    };
    pub use crate::domain::{
        ArtifactKind, ArtifactKindSet, Ecosystem, Entity, EntityRef, Field, GenerationContext,
        StateManager, TemplateId, TypeTag,
    };
    pub use crate::error::{StitchError, StitchResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
