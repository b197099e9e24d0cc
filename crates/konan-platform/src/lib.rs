//! Per-target platforms for the Konan toolchain.
//!
//! A [`Platform`] bundles the resolved configuration of one target with the
//! compiler ([`ClangManager`]) and linker ([`LinkerFlags`]) wiring derived
//! from it. The [`PlatformManager`] owns one platform per enabled target.
//!
//! Helpers are built lazily: constructing a manager only resolves property
//! views, while clang and linker wiring are derived on first use.

pub mod clang;
pub mod configurables;
pub mod error;
pub mod linker;
pub mod manager;
pub mod platform;

pub use clang::{ClangArgs, ClangManager};
pub use configurables::{load_configurables, Configurables, ConfigurablesKind};
pub use error::{PlatformError, Result};
pub use linker::{linker, LinkOptions, LinkerFlags};
pub use manager::PlatformManager;
pub use platform::Platform;
