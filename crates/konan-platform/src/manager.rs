//! The set of platforms available on one host.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use konan_properties::{DependencyReport, DependencySource, KonanProperties, PropertyStore};
use konan_target::{KonanTarget, TargetManager};

use crate::clang::ClangManager;
use crate::configurables::Configurables;
use crate::error::{PlatformError, Result};
use crate::platform::Platform;

/// One [`Platform`] per enabled target, plus the host platform.
///
/// Built once from a property store and a [`TargetManager`]; the set of
/// platforms never changes afterwards and every lookup of a target returns
/// the same shared instance.
#[derive(Debug)]
pub struct PlatformManager {
    targets: TargetManager,
    base_dir: PathBuf,
    host_platform: Arc<Platform>,
    platforms: IndexMap<KonanTarget, Arc<Platform>>,
}

impl PlatformManager {
    pub fn new(
        store: Arc<PropertyStore>,
        base_dir: impl Into<PathBuf>,
        targets: &TargetManager,
    ) -> Self {
        Self::build(store, base_dir.into(), targets, None)
    }

    /// Like [`PlatformManager::new`], but every platform obtains missing
    /// dependencies from `source` instead of the configured mirror.
    pub fn with_dependency_source(
        store: Arc<PropertyStore>,
        base_dir: impl Into<PathBuf>,
        targets: &TargetManager,
        source: Arc<dyn DependencySource>,
    ) -> Self {
        Self::build(store, base_dir.into(), targets, Some(source))
    }

    fn build(
        store: Arc<PropertyStore>,
        base_dir: PathBuf,
        targets: &TargetManager,
        source: Option<Arc<dyn DependencySource>>,
    ) -> Self {
        let host = targets.host();
        let configurables = |target: KonanTarget| -> Arc<Configurables> {
            let properties =
                KonanProperties::new(target, host, store.clone(), Some(base_dir.clone()));
            let properties = match &source {
                Some(source) => properties.with_dependency_source(source.clone()),
                None => properties,
            };
            Arc::new(Configurables::new(properties))
        };

        let host_configurables = configurables(host);
        let platforms: IndexMap<KonanTarget, Arc<Platform>> = targets
            .enabled()
            .iter()
            .map(|&target| {
                let target_configurables = if target == host {
                    host_configurables.clone()
                } else {
                    configurables(target)
                };
                let platform = Platform::new(host_configurables.clone(), target_configurables);
                (target, Arc::new(platform))
            })
            .collect();

        let host_platform = match platforms.get(&host) {
            Some(platform) => platform.clone(),
            None => Arc::new(Platform::new(
                host_configurables.clone(),
                host_configurables,
            )),
        };

        tracing::debug!(
            host = %host,
            enabled = platforms.len(),
            base_dir = %base_dir.display(),
            "created platform manager"
        );
        PlatformManager {
            targets: targets.clone(),
            base_dir,
            host_platform,
            platforms,
        }
    }

    pub fn host(&self) -> KonanTarget {
        self.targets.host()
    }

    pub fn enabled(&self) -> &[KonanTarget] {
        self.targets.enabled()
    }

    pub fn target_manager(&self) -> &TargetManager {
        &self.targets
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The platform of an enabled target.
    pub fn platform(&self, target: KonanTarget) -> Result<&Arc<Platform>> {
        self.platforms
            .get(&target)
            .ok_or(PlatformError::NotEnabled {
                target,
                host: self.host(),
            })
    }

    /// Look up a platform by user-supplied target name (`host` allowed).
    pub fn resolve(&self, name: &str) -> Result<&Arc<Platform>> {
        let target = self.targets.resolve(name)?;
        self.platform(target)
    }

    /// Enabled platforms in enabled order.
    pub fn platforms(&self) -> impl Iterator<Item = &Arc<Platform>> {
        self.platforms.values()
    }

    pub fn host_platform(&self) -> &Arc<Platform> {
        &self.host_platform
    }

    pub fn host_clang(&self) -> Result<&ClangManager> {
        self.host_platform.clang()
    }

    pub fn host_clang_args(&self) -> Result<Vec<String>> {
        Ok(self.host_clang()?.host_args.clang_args())
    }

    pub fn host_clang_path(&self) -> Result<Vec<PathBuf>> {
        Ok(self.host_clang()?.host_clang_path())
    }

    pub fn host_compiler_args_for_jni(&self) -> Result<Vec<String>> {
        Ok(self.host_clang()?.host_compiler_args_for_jni())
    }

    /// Materialize the dependencies of the host and every enabled target.
    ///
    /// Each dependency name appears once in the merged report, under the
    /// outcome of its first processing.
    pub fn download_dependencies(&self) -> Result<DependencyReport> {
        let mut merged = DependencyReport::default();
        let host = std::iter::once(&self.host_platform)
            .filter(|_| !self.platforms.contains_key(&self.host()));

        for platform in host.chain(self.platforms.values()) {
            let report = platform.configurables().download_dependencies()?;
            let is_new = |name: &String, merged: &DependencyReport| {
                !merged.fetched.contains(name)
                    && !merged.up_to_date.contains(name)
                    && !merged.adopted.contains(name)
            };
            for name in report.fetched {
                if is_new(&name, &merged) {
                    merged.fetched.push(name);
                }
            }
            for name in report.up_to_date {
                if is_new(&name, &merged) {
                    merged.up_to_date.push(name);
                }
            }
            for name in report.adopted {
                if is_new(&name, &merged) {
                    merged.adopted.push(name);
                }
            }
        }

        tracing::info!(
            fetched = merged.fetched.len(),
            up_to_date = merged.up_to_date.len(),
            adopted = merged.adopted.len(),
            "dependencies ready"
        );
        Ok(merged)
    }
}
