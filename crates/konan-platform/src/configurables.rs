//! Resolved property views, one per host or target.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use konan_properties::{
    DependencyReport, KonanProperties, KonanPropertyValues, PropertyError, PropertyStore, Result,
    TargetableExternalStorage,
};
use konan_target::{Family, KonanTarget};

/// Toolchain flavour a target's configuration follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurablesKind {
    /// macOS and iOS: Apple `ld`, `-syslibroot`.
    Apple,
    /// GNU/Linux: `ld.gold` with a GCC sysroot.
    Gcc,
    /// Android NDK clang driver.
    Android,
    /// MinGW-w64 clang driver.
    Mingw,
    /// Freestanding WebAssembly.
    Wasm,
}

impl ConfigurablesKind {
    pub fn of(target: KonanTarget) -> Self {
        match target.family() {
            Family::Osx | Family::Ios => ConfigurablesKind::Apple,
            Family::Linux => ConfigurablesKind::Gcc,
            Family::Android => ConfigurablesKind::Android,
            Family::Mingw => ConfigurablesKind::Mingw,
            Family::Wasm => ConfigurablesKind::Wasm,
        }
    }
}

/// The resolved configuration of one host or target.
#[derive(Debug)]
pub struct Configurables {
    kind: ConfigurablesKind,
    properties: KonanProperties,
}

impl Configurables {
    pub fn new(properties: KonanProperties) -> Self {
        Configurables {
            kind: ConfigurablesKind::of(properties.target()),
            properties,
        }
    }

    pub fn kind(&self) -> ConfigurablesKind {
        self.kind
    }

    pub fn host(&self) -> KonanTarget {
        self.properties.host()
    }

    pub fn properties(&self) -> &KonanProperties {
        &self.properties
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.properties.base_dir()
    }

    pub fn download_dependencies(&self) -> Result<DependencyReport> {
        self.properties.download_dependencies()
    }
}

impl TargetableExternalStorage for Configurables {
    fn target_string(&self, key: &str) -> Option<String> {
        self.properties.target_string(key)
    }

    fn target_list(&self, key: &str) -> Vec<String> {
        self.properties.target_list(key)
    }

    fn host_string(&self, key: &str) -> Option<String> {
        self.properties.host_string(key)
    }

    fn host_list(&self, key: &str) -> Vec<String> {
        self.properties.host_list(key)
    }

    fn host_target_string(&self, key: &str) -> Option<String> {
        self.properties.host_target_string(key)
    }

    fn host_target_list(&self, key: &str) -> Vec<String> {
        self.properties.host_target_list(key)
    }

    fn absolute(&self, path: &str) -> Result<PathBuf> {
        self.properties.absolute(path)
    }
}

impl KonanPropertyValues for Configurables {
    fn target(&self) -> KonanTarget {
        self.properties.target()
    }
}

/// Resolve the configuration of `target` as seen from `host`.
pub fn load_configurables(
    target: KonanTarget,
    host: KonanTarget,
    store: Arc<PropertyStore>,
    base_dir: Option<PathBuf>,
) -> Configurables {
    Configurables::new(KonanProperties::new(target, host, store, base_dir))
}

/// `value`, or [`PropertyError::MissingProperty`] naming `key`.
pub(crate) fn require(c: &Configurables, key: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| PropertyError::MissingProperty {
        key: key.to_string(),
        target: c.target().name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_family() {
        assert_eq!(ConfigurablesKind::of(KonanTarget::Iphone), ConfigurablesKind::Apple);
        assert_eq!(ConfigurablesKind::of(KonanTarget::LinuxMips32), ConfigurablesKind::Gcc);
        assert_eq!(ConfigurablesKind::of(KonanTarget::AndroidArm64), ConfigurablesKind::Android);
        assert_eq!(ConfigurablesKind::of(KonanTarget::Mingw), ConfigurablesKind::Mingw);
        assert_eq!(ConfigurablesKind::of(KonanTarget::Wasm32), ConfigurablesKind::Wasm);
    }

    #[test]
    fn forwards_lookups() {
        let store = Arc::new(
            PropertyStore::parse("llvmHome = llvm\nlinkerKonanFlags.wasm32 = -a -b\n").unwrap(),
        );
        let c = load_configurables(KonanTarget::Wasm32, KonanTarget::Linux, store, None);
        assert_eq!(c.kind(), ConfigurablesKind::Wasm);
        assert_eq!(c.host(), KonanTarget::Linux);
        assert_eq!(c.llvm_home().as_deref(), Some("llvm"));
        assert_eq!(c.linker_konan_flags(), vec!["-a", "-b"]);
        assert!(c.base_dir().is_none());
    }
}
