use std::{borrow::Cow, fmt};

use thiserror::Error;

/// Kind of entity named by a [`HearthError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Post,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::User => f.write_str("user"),
            EntityKind::Post => f.write_str("post"),
        }
    }
}

/// Top-level error type returned by every hearth operation.
#[derive(Debug, Error)]
pub enum HearthError {
    /// A referenced user or post does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: u64 },

    /// Input was rejected before any state was touched.
    #[error("invalid input")]
    InvalidInput(#[from] ValidationError),

    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Snapshot file could not be read or written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other storage failure.
    #[error("storage error: {message}")]
    Storage { message: Cow<'static, str> },
}

impl HearthError {
    pub fn user_not_found(id: u64) -> Self {
        Self::NotFound {
            entity: EntityKind::User,
            id,
        }
    }

    pub fn post_not_found(id: u64) -> Self {
        Self::NotFound {
            entity: EntityKind::Post,
            id,
        }
    }

    /// Returns the missing entity kind when this is a `NotFound` error.
    pub fn missing_entity(&self) -> Option<EntityKind> {
        match self {
            HearthError::NotFound { entity, .. } => Some(*entity),
            _ => None,
        }
    }

    /// True for failures of the persistence backend rather than of the caller's request.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            HearthError::Redis(_) | HearthError::Io(_) | HearthError::Serialization(_) | HearthError::Storage { .. }
        )
    }
}

/// Collection of validation issues encountered while checking a request.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Human readable summary, one issue per clause.
    pub fn summary(&self) -> String {
        self.issues
            .iter()
            .map(|issue| format!("{}: {}", issue.field, issue.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Detailed validation failure for a single field.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub type HearthResult<T> = Result<T, HearthError>;
