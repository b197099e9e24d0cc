//! Error types for target identification.

/// Errors that can occur while naming or selecting targets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    /// The name does not denote any known target.
    #[error("unknown target: '{name}'")]
    UnknownTarget {
        /// The name that failed to parse.
        name: String,
    },

    /// The running machine is not a supported host.
    #[error("unsupported host: {os}/{arch}")]
    UnsupportedHost { os: String, arch: String },

    /// The target is known but not enabled on this host.
    #[error("target '{target}' is not available on host '{host}'")]
    NotEnabled { target: String, host: String },
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;
