//! One target's configuration plus its lazily derived tool wiring.

use std::path::PathBuf;
use std::sync::Arc;

use konan_properties::{KonanPropertyValues, TargetableExternalStorage};
use konan_target::KonanTarget;
use once_cell::sync::OnceCell;

use crate::clang::ClangManager;
use crate::configurables::Configurables;
use crate::error::Result;
use crate::linker::{linker, LinkerFlags};

/// A target's configurables together with its clang and linker wiring.
///
/// Property lookups are forwarded to the target configurables. The clang
/// manager and linker are built on first access and cached; concurrent
/// first accesses initialize them once.
#[derive(Debug)]
pub struct Platform {
    configurables: Arc<Configurables>,
    host_configurables: Arc<Configurables>,
    clang: OnceCell<ClangManager>,
    linker: OnceCell<Box<dyn LinkerFlags>>,
}

impl Platform {
    /// The host platform passes the same `Arc` for both arguments.
    pub fn new(host_configurables: Arc<Configurables>, configurables: Arc<Configurables>) -> Self {
        Platform {
            configurables,
            host_configurables,
            clang: OnceCell::new(),
            linker: OnceCell::new(),
        }
    }

    pub fn configurables(&self) -> &Configurables {
        &self.configurables
    }

    pub fn host_configurables(&self) -> &Configurables {
        &self.host_configurables
    }

    pub fn clang(&self) -> Result<&ClangManager> {
        self.clang.get_or_try_init(|| {
            tracing::debug!(konan_target = %self.target(), "initializing clang");
            ClangManager::new(&self.host_configurables, &self.configurables)
        })
    }

    pub fn linker(&self) -> Result<&dyn LinkerFlags> {
        let linker = self.linker.get_or_try_init(|| {
            tracing::debug!(konan_target = %self.target(), "initializing linker");
            linker(&self.configurables)
        })?;
        Ok(&**linker)
    }

    pub fn clang_initialized(&self) -> bool {
        self.clang.get().is_some()
    }

    pub fn linker_initialized(&self) -> bool {
        self.linker.get().is_some()
    }
}

impl TargetableExternalStorage for Platform {
    fn target_string(&self, key: &str) -> Option<String> {
        self.configurables.target_string(key)
    }

    fn target_list(&self, key: &str) -> Vec<String> {
        self.configurables.target_list(key)
    }

    fn host_string(&self, key: &str) -> Option<String> {
        self.configurables.host_string(key)
    }

    fn host_list(&self, key: &str) -> Vec<String> {
        self.configurables.host_list(key)
    }

    fn host_target_string(&self, key: &str) -> Option<String> {
        self.configurables.host_target_string(key)
    }

    fn host_target_list(&self, key: &str) -> Vec<String> {
        self.configurables.host_target_list(key)
    }

    fn absolute(&self, path: &str) -> konan_properties::Result<PathBuf> {
        self.configurables.absolute(path)
    }
}

impl KonanPropertyValues for Platform {
    fn target(&self) -> KonanTarget {
        self.configurables.target()
    }
}

#[cfg(test)]
mod tests {
    use konan_properties::PropertyStore;

    use super::*;
    use crate::configurables::load_configurables;
    use crate::error::PlatformError;

    const FIXTURE: &str = "\
llvmHome = llvm
targetToolchain.linux-linux = gcc
targetSysRoot.linux = sysroot
libGcc.linux = lib/gcc
dynamicLinker.linux = /lib64/ld-linux-x86-64.so.2
targetToolchain.linux-wasm32 = wasm
quadruple.wasm32 = wasm32-unknown-unknown
linkerKonanFlags.wasm32 = --allow-undefined
";

    fn platform(target: KonanTarget, base: Option<&str>) -> Platform {
        let store = Arc::new(PropertyStore::parse(FIXTURE).unwrap());
        let base = base.map(PathBuf::from);
        let host = Arc::new(load_configurables(
            KonanTarget::Linux,
            KonanTarget::Linux,
            store.clone(),
            base.clone(),
        ));
        Platform::new(
            host,
            Arc::new(load_configurables(target, KonanTarget::Linux, store, base)),
        )
    }

    #[test]
    fn helpers_are_lazy_and_cached() {
        let p = platform(KonanTarget::Wasm32, Some("/deps"));
        assert!(!p.clang_initialized());
        assert!(!p.linker_initialized());

        let first = p.clang().unwrap() as *const ClangManager;
        assert!(p.clang_initialized());
        assert!(!p.linker_initialized());
        let second = p.clang().unwrap() as *const ClangManager;
        assert_eq!(first, second);

        assert_eq!(
            p.linker().unwrap().linker_path(),
            std::path::Path::new("/deps/llvm/bin/wasm-ld")
        );
        assert!(p.linker_initialized());
    }

    #[test]
    fn forwards_property_lookups() {
        let p = platform(KonanTarget::Wasm32, None);
        assert_eq!(p.target(), KonanTarget::Wasm32);
        assert_eq!(p.llvm_home().as_deref(), Some("llvm"));
        assert_eq!(p.linker_konan_flags(), vec!["--allow-undefined"]);
        assert_eq!(p.host_configurables().target(), KonanTarget::Linux);
    }

    #[test]
    fn failed_init_leaves_cell_empty() {
        let p = platform(KonanTarget::Wasm32, None);
        assert!(matches!(p.clang(), Err(PlatformError::Property(_))));
        assert!(!p.clang_initialized());
        assert!(p.linker().is_err());
        assert!(!p.linker_initialized());
    }
}
