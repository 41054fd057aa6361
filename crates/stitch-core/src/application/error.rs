//! Application layer errors.
//!
//! These errors represent failures in orchestration, not generation rules.
//! Rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// The requested namespace or entity is not part of the generation set.
    /// The only error that aborts a whole run.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The template library has no template under this id.
    #[error("Template not found: {id}")]
    TemplateNotFound { id: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// The entity metadata could not be read or parsed.
    #[error("Entity metadata error: {reason}")]
    MetadataError { reason: String },

    /// Shared store access failed (lock poisoned).
    #[error("Store lock poisoned")]
    StoreLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Validation(reason) => vec![
                reason.clone(),
                "Check the namespace and entity names in your entity manifest".into(),
                "Names are matched case-insensitively".into(),
            ],
            Self::TemplateNotFound { id } => vec![
                format!("No template is registered as '{id}'"),
                "If you use a template override directory, check the file name".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::MetadataError { reason } => vec![
                format!("Manifest problem: {reason}"),
                "Run `stitch init` to see a starter entities.toml".into(),
            ],
            Self::StoreLockError => vec![
                "An in-memory store was poisoned by an earlier panic".into(),
                "Try again".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::FilesystemError { .. } | Self::StoreLockError => ErrorCategory::Internal,
            Self::MetadataError { .. } => ErrorCategory::Configuration,
        }
    }
}
