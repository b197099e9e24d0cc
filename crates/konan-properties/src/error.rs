//! Error types for property loading, resolution, and dependency handling.

use std::path::PathBuf;

/// Errors that can occur while loading or resolving properties.
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    /// Malformed line in a property file.
    #[error("property parse error at line {line}: {detail}")]
    Parse { line: usize, detail: String },

    /// Property file not found.
    #[error("property file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// An absolute path was requested but no dependency base directory was supplied.
    #[error("no dependency base directory configured; cannot resolve absolute paths")]
    NoDependencyBase,

    /// A property required for path resolution is not defined.
    #[error("property '{key}' is not defined for target '{target}'")]
    MissingProperty { key: String, target: String },

    /// A target-restricted property was requested for another target.
    #[error("only the {expected} target has the '{property}' property, not '{target}'")]
    TargetMismatch {
        property: String,
        expected: String,
        target: String,
    },

    /// A declared dependency could not be obtained.
    #[error("dependency '{name}' is unavailable: {detail}")]
    DependencyUnavailable { name: String, detail: String },

    /// A materialized dependency no longer matches its recorded fingerprint.
    #[error("integrity check failed for dependency '{name}': expected {expected}, got {actual}")]
    IntegrityFailure {
        name: String,
        expected: String,
        actual: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error in the dependency record.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for property operations.
pub type Result<T> = std::result::Result<T, PropertyError>;
