// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Stitch.
//!
//! Pure generation logic: entity metadata, the field type table, template
//! rendering, anchor merging and artifact planning. No I/O happens here;
//! reading and writing target files is the application layer's job, through
//! ports.
//!
//! - **No I/O**: every function takes text in and gives text or values out
//! - **No logging**: soft problems are returned as values for the caller to log
//! - **Deterministic**: the same entity and file text always yield the same result

pub mod anchor;
pub mod artifact;
pub mod context;
pub mod entity;
pub mod error;
pub mod field_types;
pub mod naming;
pub mod planner;
pub mod render;

pub use anchor::{
    AnchorMergeEngine, AnchorStrategy, LOCK_SENTINEL, MergeOutcome, MergeRule, SkipReason,
    WriteAction, is_locked_text,
};
pub use artifact::{ArtifactKind, ArtifactKindSet, ArtifactSpec, Ecosystem};
pub use context::{GenerationContext, QuickAddRelation, StateManager};
pub use entity::{BASE_FIELDS, Entity, EntityRef, Field, TypeTag, is_base_field};
pub use error::{DomainError, ErrorCategory};
pub use field_types::{MobileMapping, ServerMapping, TypeMapping, bool_default, lookup, mapping_for};
pub use planner::{
    EntityArtifactPlanner, MODAL_MARKER, PARSER_MARKER, Plan, THEAD_MARKER, TLINE_MARKER,
};
pub use render::{Fragment, TemplateId, TemplateRenderer, TokenMap, indent_lines};
