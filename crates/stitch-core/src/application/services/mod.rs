//! Application services - orchestrate use cases.
//!
//! The orchestrator drives a generation run. The inspector and the resolver
//! are the two I/O-facing steps it runs for every artifact: read the target,
//! render the fragment.

pub mod inspector;
pub mod orchestrator;
pub mod resolver;
pub mod summary;

pub use inspector::{ArtifactStateInspector, FileState};
pub use orchestrator::{GenerationRequest, RunState, ScaffoldOrchestrator};
pub use resolver::FragmentResolver;
pub use summary::{ArtifactRecord, GenerationSummary, Outcome};
