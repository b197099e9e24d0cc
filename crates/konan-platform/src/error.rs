//! Platform error types.

use konan_properties::PropertyError;
use konan_target::{KonanTarget, TargetError};

/// Errors that can occur while building or querying platforms.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// A platform was requested for a target outside the enabled set.
    #[error("target '{target}' is not enabled (host '{host}')")]
    NotEnabled {
        target: KonanTarget,
        host: KonanTarget,
    },

    /// Property resolution failed while deriving compiler or linker wiring.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// Target selection failed.
    #[error(transparent)]
    Target(#[from] TargetError),
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
