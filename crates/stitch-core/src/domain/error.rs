// ============================================================================
// domain/error.rs - GENERATION DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they are accumulated into the run summary)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
///
/// None of these stop a run on their own. The orchestrator scopes each one to
/// the smallest unit it concerns (one field, one artifact).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Rendering
    // ========================================================================
    #[error("template '{template}' cannot be rendered: {reason}")]
    TemplateArity { template: String, reason: String },

    // ========================================================================
    // Field typing
    // ========================================================================
    #[error("field '{entity}.{field}' has unknown type '{tag}'")]
    UnknownFieldType {
        entity: String,
        field: String,
        tag: String,
    },

    #[error("relation field '{entity}.{field}' names no target entity")]
    MissingRelationTarget { entity: String, field: String },

    // ========================================================================
    // Model shape
    // ========================================================================
    #[error("invalid entity '{name}': {reason}")]
    InvalidEntity { name: String, reason: String },

    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateArity { template, .. } => vec![
                format!("Template '{template}' is empty or was given mismatched tokens"),
                "Check the template override directory for a blank file".into(),
            ],
            Self::UnknownFieldType { field, tag, .. } => vec![
                format!("Field '{field}' declares type '{tag}'"),
                "Supported types: integer, boolean, char, text, date, datetime, decimal, \
                 foreign-key, many-to-many (see `stitch --help`)"
                    .into(),
                "The remaining fields of the entity were still generated".into(),
            ],
            Self::MissingRelationTarget { field, .. } => vec![
                format!("Add `related = \"<namespace>.<Entity>\"` to field '{field}'"),
                "The remaining fields of the entity were still generated".into(),
            ],
            Self::InvalidEntity { name, .. } => vec![
                format!("Fix the declaration of '{name}' in the entity manifest"),
            ],
            Self::InvalidName { .. } => vec![
                "Namespace and entity names must not contain digits or spaces".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidEntity { .. }
            | Self::InvalidName { .. }
            | Self::MissingRelationTarget { .. } => ErrorCategory::Validation,
            Self::UnknownFieldType { .. } => ErrorCategory::Compatibility,
            Self::TemplateArity { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Internal,
}
