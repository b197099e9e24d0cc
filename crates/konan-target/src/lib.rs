//! Target identifiers for the Konan cross-compilation toolchain.
//!
//! A target is a CPU/OS/ABI combination the toolchain can produce code for.
//! The host is the target describing the machine running the toolchain.
//!
//! - [`KonanTarget`]: the closed set of known targets
//! - [`Family`] / [`Architecture`]: OS family and CPU architecture of a target
//! - [`TargetManager`]: the host plus the set of targets enabled on it

pub mod error;
pub mod manager;
pub mod target;

pub use error::{Result, TargetError};
pub use manager::TargetManager;
pub use target::{Architecture, Family, KonanTarget};
