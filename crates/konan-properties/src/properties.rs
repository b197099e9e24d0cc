//! The concrete property view for one target.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use konan_target::KonanTarget;

use crate::dependency::{DependencyProcessor, DependencyReport, DependencySource};
use crate::error::{PropertyError, Result};
use crate::store::{PropertyStore, Qualifier};
use crate::values::{KonanPropertyValues, TargetableExternalStorage};

/// Properties of a shared [`PropertyStore`] resolved for one target on one host.
///
/// With a base directory, relative paths resolve against it and declared
/// dependencies can be materialized there; without one, every absolute-path
/// accessor fails with [`PropertyError::NoDependencyBase`].
#[derive(Debug)]
pub struct KonanProperties {
    target: KonanTarget,
    host: KonanTarget,
    store: Arc<PropertyStore>,
    dependency_processor: Option<DependencyProcessor>,
}

impl KonanProperties {
    pub fn new(
        target: KonanTarget,
        host: KonanTarget,
        store: Arc<PropertyStore>,
        base_dir: Option<PathBuf>,
    ) -> Self {
        let mut properties = KonanProperties {
            target,
            host,
            store,
            dependency_processor: None,
        };
        let processor = base_dir.map(|dir| DependencyProcessor::new(dir, &properties));
        properties.dependency_processor = processor;
        properties
    }

    /// Obtain missing dependencies from `source` instead of the configured
    /// mirror. Has no effect without a base directory.
    pub fn with_dependency_source(mut self, source: Arc<dyn DependencySource>) -> Self {
        self.dependency_processor = self
            .dependency_processor
            .take()
            .map(|processor| processor.with_source(source));
        self
    }

    pub fn host(&self) -> KonanTarget {
        self.host
    }

    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    /// Base directory for dependencies and relative paths, if configured.
    pub fn base_dir(&self) -> Option<&Path> {
        self.dependency_processor.as_ref().map(DependencyProcessor::root)
    }

    pub fn dependency_processor(&self) -> Option<&DependencyProcessor> {
        self.dependency_processor.as_ref()
    }

    /// Materialize the dependencies declared for this host/target pair.
    pub fn download_dependencies(&self) -> Result<DependencyReport> {
        let processor = self
            .dependency_processor
            .as_ref()
            .ok_or(PropertyError::NoDependencyBase)?;
        processor.run()
    }

    fn host_target(&self) -> Qualifier {
        Qualifier::HostTarget {
            host: self.host,
            target: self.target,
        }
    }
}

impl TargetableExternalStorage for KonanProperties {
    fn target_string(&self, key: &str) -> Option<String> {
        self.store.string(key, &Qualifier::Target(self.target))
    }

    fn target_list(&self, key: &str) -> Vec<String> {
        self.store.list(key, &Qualifier::Target(self.target))
    }

    fn host_string(&self, key: &str) -> Option<String> {
        self.store.string(key, &Qualifier::Host)
    }

    fn host_list(&self, key: &str) -> Vec<String> {
        self.store.list(key, &Qualifier::Host)
    }

    fn host_target_string(&self, key: &str) -> Option<String> {
        self.store.string(key, &self.host_target())
    }

    fn host_target_list(&self, key: &str) -> Vec<String> {
        self.store.list(key, &self.host_target())
    }

    fn absolute(&self, path: &str) -> Result<PathBuf> {
        let processor = self
            .dependency_processor
            .as_ref()
            .ok_or(PropertyError::NoDependencyBase)?;
        Ok(processor.resolve_relative(path))
    }
}

impl KonanPropertyValues for KonanProperties {
    fn target(&self) -> KonanTarget {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
llvmHome = clang-llvm-5.0.0
jdkHome = /usr/lib/jvm/default
linkerKonanFlags.raspberrypi = -lstdc++ -lm
linkerKonanFlags.mingw = -static
targetSysRoot.raspberrypi = target-sysroot-1-raspberrypi
quadruple.raspberrypi = armv6-unknown-linux-gnueabihf
targetToolchain.linux-raspberrypi = target-gcc-toolchain-3-linux-x86-64
dependencies.linux-raspberrypi = \\
    target-sysroot-1-raspberrypi \\
    target-gcc-toolchain-3-linux-x86-64
osVersionMin.raspberrypi = 6
";

    fn props(target: KonanTarget, base: Option<&str>) -> KonanProperties {
        KonanProperties::new(
            target,
            KonanTarget::Linux,
            Arc::new(PropertyStore::parse(FIXTURE).unwrap()),
            base.map(PathBuf::from),
        )
    }

    #[test]
    fn target_only_key() {
        let p = props(KonanTarget::Raspberrypi, None);
        assert_eq!(
            p.target_string("targetSysRoot").as_deref(),
            Some("target-sysroot-1-raspberrypi")
        );
        assert_eq!(p.host_string("targetSysRoot"), None);
        assert!(p.host_list("linkerKonanFlags").is_empty());
        assert_eq!(p.target_list("linkerKonanFlags"), vec!["-lstdc++", "-lm"]);
    }

    #[test]
    fn host_only_key() {
        let p = props(KonanTarget::Raspberrypi, None);
        assert_eq!(p.host_string("llvmHome").as_deref(), Some("clang-llvm-5.0.0"));
        assert_eq!(p.target_string("llvmHome"), None);
        assert_eq!(p.host_target_string("llvmHome"), None);
    }

    #[test]
    fn host_target_only_key() {
        let p = props(KonanTarget::Raspberrypi, None);
        assert_eq!(
            p.host_target_list("dependencies"),
            vec![
                "target-sysroot-1-raspberrypi",
                "target-gcc-toolchain-3-linux-x86-64"
            ]
        );
        assert!(p.target_list("dependencies").is_empty());
        assert!(p.host_list("dependencies").is_empty());
        assert_eq!(p.target_string("targetToolchain"), None);
    }

    #[test]
    fn named_accessors() {
        let p = props(KonanTarget::Raspberrypi, None);
        assert_eq!(p.llvm_home().as_deref(), Some("clang-llvm-5.0.0"));
        assert_eq!(
            p.target_arg().as_deref(),
            Some("armv6-unknown-linux-gnueabihf")
        );
        assert_eq!(
            p.target_toolchain().as_deref(),
            Some("target-gcc-toolchain-3-linux-x86-64")
        );
        assert_eq!(p.dependencies().len(), 2);
        assert_eq!(p.os_version_min().as_deref(), Some("6"));
        assert!(p.s2wasm_flags().is_empty());
        assert_eq!(p.libffi_dir(), None);
    }

    #[test]
    fn absolute_without_base_dir_fails() {
        let p = props(KonanTarget::Raspberrypi, None);
        assert!(matches!(
            p.absolute("anything"),
            Err(PropertyError::NoDependencyBase)
        ));
        assert!(matches!(
            p.absolute_target_sys_root(),
            Err(PropertyError::NoDependencyBase)
        ));
        assert!(matches!(
            p.download_dependencies(),
            Err(PropertyError::NoDependencyBase)
        ));
        assert!(p.base_dir().is_none());
    }

    #[test]
    fn absolute_with_base_dir_joins_and_normalizes() {
        let p = props(KonanTarget::Raspberrypi, Some("/home/u/.konan/dependencies"));
        assert_eq!(
            p.absolute("./sysroot/../llvm").unwrap(),
            PathBuf::from("/home/u/.konan/dependencies/llvm")
        );
        assert_eq!(
            p.absolute_target_sys_root().unwrap(),
            PathBuf::from("/home/u/.konan/dependencies/target-sysroot-1-raspberrypi")
        );
        assert_eq!(
            p.absolute_llvm_home().unwrap(),
            PathBuf::from("/home/u/.konan/dependencies/clang-llvm-5.0.0")
        );
        assert_eq!(
            p.base_dir(),
            Some(Path::new("/home/u/.konan/dependencies"))
        );
    }

    #[test]
    fn absolute_of_missing_property() {
        let p = props(KonanTarget::Raspberrypi, Some("/deps"));
        let err = p.absolute_libffi_dir().unwrap_err();
        assert!(matches!(
            err,
            PropertyError::MissingProperty { ref key, ref target }
                if key == "libffiDir" && target == "raspberrypi"
        ));
    }

    #[test]
    fn mingw_with_llvm_only_on_mingw() {
        let mingw = props(KonanTarget::Mingw, None);
        assert_eq!(
            mingw.mingw_with_llvm().unwrap(),
            mingw.host_string("llvmHome")
        );

        let linux = props(KonanTarget::Raspberrypi, None);
        assert!(matches!(
            linux.mingw_with_llvm(),
            Err(PropertyError::TargetMismatch { .. })
        ));
    }
}
