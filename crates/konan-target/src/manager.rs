//! Host and enabled-target bookkeeping.

use crate::error::{Result, TargetError};
use crate::target::KonanTarget;

/// The host target plus the ordered set of targets enabled on it.
///
/// Constructed from explicit values so that callers control which host and
/// targets a build sees; [`TargetManager::detect`] is the only entry point
/// that consults the running machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetManager {
    host: KonanTarget,
    enabled: Vec<KonanTarget>,
}

impl TargetManager {
    /// Create a manager from an explicit host and enabled set.
    ///
    /// Duplicates in `enabled` are dropped, keeping first occurrence order.
    pub fn new(host: KonanTarget, enabled: impl IntoIterator<Item = KonanTarget>) -> Self {
        let mut unique = Vec::new();
        for target in enabled {
            if !unique.contains(&target) {
                unique.push(target);
            }
        }
        TargetManager {
            host,
            enabled: unique,
        }
    }

    /// Create a manager for `host` with its default enabled targets.
    pub fn for_host(host: KonanTarget) -> Self {
        Self::new(host, Self::default_enabled(host))
    }

    /// Create a manager for the running machine.
    pub fn detect() -> Result<Self> {
        let host = KonanTarget::detect_host()?;
        tracing::debug!(host = %host, "detected host target");
        Ok(Self::for_host(host))
    }

    /// Targets the toolchain can build for when running on `host`.
    pub fn default_enabled(host: KonanTarget) -> Vec<KonanTarget> {
        match host {
            KonanTarget::Linux => vec![
                KonanTarget::Linux,
                KonanTarget::Raspberrypi,
                KonanTarget::LinuxMips32,
                KonanTarget::LinuxMipsel32,
                KonanTarget::AndroidArm32,
                KonanTarget::AndroidArm64,
                KonanTarget::Wasm32,
            ],
            KonanTarget::Macbook => vec![
                KonanTarget::Macbook,
                KonanTarget::Iphone,
                KonanTarget::IphoneSim,
                KonanTarget::AndroidArm32,
                KonanTarget::AndroidArm64,
                KonanTarget::Wasm32,
            ],
            KonanTarget::Mingw => vec![KonanTarget::Mingw, KonanTarget::Wasm32],
            _ => Vec::new(),
        }
    }

    pub fn host(&self) -> KonanTarget {
        self.host
    }

    pub fn enabled(&self) -> &[KonanTarget] {
        &self.enabled
    }

    pub fn is_enabled(&self, target: KonanTarget) -> bool {
        self.enabled.contains(&target)
    }

    /// Resolve a user-supplied target name; `host` names the host target.
    ///
    /// Fails if the name is unknown or the target is not enabled.
    pub fn resolve(&self, name: &str) -> Result<KonanTarget> {
        let target = if name.trim().eq_ignore_ascii_case("host") {
            self.host
        } else {
            name.parse::<KonanTarget>()?
        };
        if !self.is_enabled(target) {
            return Err(TargetError::NotEnabled {
                target: target.name().to_string(),
                host: self.host.name().to_string(),
            });
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_defaults() {
        let tm = TargetManager::for_host(KonanTarget::Linux);
        assert_eq!(tm.host(), KonanTarget::Linux);
        assert_eq!(tm.enabled().len(), 7);
        assert!(tm.is_enabled(KonanTarget::Raspberrypi));
        assert!(!tm.is_enabled(KonanTarget::Iphone));
    }

    #[test]
    fn mingw_defaults() {
        let tm = TargetManager::for_host(KonanTarget::Mingw);
        assert_eq!(tm.enabled(), &[KonanTarget::Mingw, KonanTarget::Wasm32]);
    }

    #[test]
    fn explicit_set_deduplicates() {
        let tm = TargetManager::new(
            KonanTarget::Linux,
            [KonanTarget::Wasm32, KonanTarget::Linux, KonanTarget::Wasm32],
        );
        assert_eq!(tm.enabled(), &[KonanTarget::Wasm32, KonanTarget::Linux]);
    }

    #[test]
    fn resolve_host_alias() {
        let tm = TargetManager::for_host(KonanTarget::Macbook);
        assert_eq!(tm.resolve("host").unwrap(), KonanTarget::Macbook);
        assert_eq!(tm.resolve("ios").unwrap(), KonanTarget::Iphone);
    }

    #[test]
    fn resolve_disabled_target() {
        let tm = TargetManager::for_host(KonanTarget::Mingw);
        let err = tm.resolve("linux").unwrap_err();
        assert_eq!(
            err,
            TargetError::NotEnabled {
                target: "linux".into(),
                host: "mingw".into()
            }
        );
        assert!(matches!(
            tm.resolve("nonsense"),
            Err(TargetError::UnknownTarget { .. })
        ));
    }
}
