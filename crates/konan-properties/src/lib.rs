//! Property resolution for the Konan toolchain.
//!
//! Build properties (compiler flags, linker flags, SDK locations) live in a
//! flat `konan.properties` file. Each key may be spelled bare (host-wide),
//! with a `.<target>` suffix, or with a `.<host>-<target>` suffix. This crate
//! loads that file and resolves keys for a given host and target.
//!
//! # Architecture
//!
//! - [`PropertyStore`]: the parsed file, with qualified lookups
//! - [`TargetableExternalStorage`]: the six primitive lookups plus path resolution
//! - [`KonanPropertyValues`]: named accessors for well-known keys
//! - [`KonanProperties`]: the concrete view over a store for one target
//! - [`DependencyProcessor`]: materializes toolchain dependencies under a base directory

pub mod dependency;
pub mod error;
pub mod integrity;
pub mod properties;
pub mod store;
pub mod values;

pub use dependency::{DependencyProcessor, DependencyReport, DependencySource, LocalMirror};
pub use error::{PropertyError, Result};
pub use integrity::ContentHash;
pub use properties::KonanProperties;
pub use store::{PropertyStore, Qualifier, ValidationIssue};
pub use values::{keys, KonanPropertyValues, TargetableExternalStorage};
