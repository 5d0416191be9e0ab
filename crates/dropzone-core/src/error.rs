//! Error types shared by every component.

use crate::widget::WidgetId;
use std::fmt;
use thiserror::Error;

/// A single reason a layout document failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Index of the offending widget entry, if the issue is entry-specific.
    pub entry: Option<usize>,
    /// Name of the offending field, if any.
    pub field: Option<String>,
    /// Human-readable reason.
    pub reason: String,
}

impl ValidationIssue {
    /// An issue with the document as a whole.
    pub fn document(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            entry: None,
            field: Some(field.into()),
            reason: reason.into(),
        }
    }

    /// An issue with a single widget entry.
    pub fn entry(index: usize, field: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            entry: Some(index),
            field: field.map(str::to_string),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.entry, &self.field) {
            (Some(index), Some(field)) => {
                write!(f, "widgets[{}].{}: {}", index, field, self.reason)
            }
            (Some(index), None) => write!(f, "widgets[{}]: {}", index, self.reason),
            (None, Some(field)) => write!(f, "{}: {}", field, self.reason),
            (None, None) => f.write_str(&self.reason),
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors produced by the layout engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Widget not found: {0}")]
    NotFound(WidgetId),
    #[error("Validation failed: {}", join_issues(.0))]
    ValidationFailed(Vec<ValidationIssue>),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Unsupported format version: {0}")]
    UnsupportedFormatVersion(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LayoutError {
    /// Shorthand for an [`LayoutError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Validation issues carried by this error, if any.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::ValidationFailed(issues) => issues,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for LayoutError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
