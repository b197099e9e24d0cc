//! Primitive lookups and named property accessors.
//!
//! [`TargetableExternalStorage`] is the capability a property view must
//! provide: six qualified lookups and path resolution. [`KonanPropertyValues`]
//! layers the well-known keys on top as provided methods, so any type that
//! implements the primitives (a [`crate::KonanProperties`], or something that
//! forwards to one) gets the full accessor surface.

use std::path::PathBuf;

use konan_target::KonanTarget;

use crate::error::{PropertyError, Result};

/// Well-known property keys.
pub mod keys {
    pub const LLVM_HOME: &str = "llvmHome";
    pub const LLVM_LTO_NOOPT_FLAGS: &str = "llvmLtoNooptFlags";
    pub const LLVM_LTO_OPT_FLAGS: &str = "llvmLtoOptFlags";
    pub const LLVM_LTO_FLAGS: &str = "llvmLtoFlags";
    pub const LLVM_LTO_DYNAMIC_FLAGS: &str = "llvmLtoDynamicFlags";
    pub const ENTRY_SELECTOR: &str = "entrySelector";
    pub const LINKER_OPTIMIZATION_FLAGS: &str = "linkerOptimizationFlags";
    pub const LINKER_KONAN_FLAGS: &str = "linkerKonanFlags";
    pub const LINKER_NO_DEBUG_FLAGS: &str = "linkerNoDebugFlags";
    pub const LINKER_DYNAMIC_FLAGS: &str = "linkerDynamicFlags";
    pub const LLVM_DEBUG_OPT_FLAGS: &str = "llvmDebugOptFlags";
    pub const S2WASM_FLAGS: &str = "s2wasmFlags";
    pub const TARGET_SYS_ROOT: &str = "targetSysRoot";
    pub const LIBFFI_DIR: &str = "libffiDir";
    pub const GCC_TOOLCHAIN: &str = "gccToolchain";
    pub const QUADRUPLE: &str = "quadruple";
    pub const TARGET_TOOLCHAIN: &str = "targetToolchain";
    pub const DEPENDENCIES: &str = "dependencies";
    pub const OS_VERSION_MIN: &str = "osVersionMin";
    pub const OS_VERSION_MIN_FLAG_LD: &str = "osVersionMinFlagLd";
    pub const DYNAMIC_LINKER: &str = "dynamicLinker";
    pub const ABI_SPECIFIC_LIBRARIES: &str = "abiSpecificLibraries";
    pub const LIB_GCC: &str = "libGcc";
    pub const JDK_HOME: &str = "jdkHome";
    pub const DEPENDENCIES_MIRROR: &str = "dependenciesMirror";
    pub const MINGW_WITH_LLVM: &str = "mingwWithLlvm";
}

/// Qualified lookups over a property store for one host/target pair.
///
/// Absent keys are `None` or an empty list, never an error.
pub trait TargetableExternalStorage {
    /// `key.<target>`
    fn target_string(&self, key: &str) -> Option<String>;
    fn target_list(&self, key: &str) -> Vec<String>;
    /// bare `key`
    fn host_string(&self, key: &str) -> Option<String>;
    fn host_list(&self, key: &str) -> Vec<String>;
    /// `key.<host>-<target>`
    fn host_target_string(&self, key: &str) -> Option<String>;
    fn host_target_list(&self, key: &str) -> Vec<String>;

    /// Resolve `path` against the dependency base directory.
    ///
    /// Fails with [`PropertyError::NoDependencyBase`] if no base directory
    /// was configured.
    fn absolute(&self, path: &str) -> Result<PathBuf>;
}

/// Named accessors for the well-known toolchain properties.
pub trait KonanPropertyValues: TargetableExternalStorage {
    /// The target these values are resolved for.
    fn target(&self) -> KonanTarget;

    fn llvm_home(&self) -> Option<String> {
        self.host_string(keys::LLVM_HOME)
    }

    fn llvm_lto_noopt_flags(&self) -> Vec<String> {
        self.target_list(keys::LLVM_LTO_NOOPT_FLAGS)
    }

    fn llvm_lto_opt_flags(&self) -> Vec<String> {
        self.target_list(keys::LLVM_LTO_OPT_FLAGS)
    }

    fn llvm_lto_flags(&self) -> Vec<String> {
        self.target_list(keys::LLVM_LTO_FLAGS)
    }

    fn llvm_lto_dynamic_flags(&self) -> Vec<String> {
        self.target_list(keys::LLVM_LTO_DYNAMIC_FLAGS)
    }

    fn entry_selector(&self) -> Vec<String> {
        self.target_list(keys::ENTRY_SELECTOR)
    }

    fn linker_optimization_flags(&self) -> Vec<String> {
        self.target_list(keys::LINKER_OPTIMIZATION_FLAGS)
    }

    fn linker_konan_flags(&self) -> Vec<String> {
        self.target_list(keys::LINKER_KONAN_FLAGS)
    }

    fn linker_no_debug_flags(&self) -> Vec<String> {
        self.target_list(keys::LINKER_NO_DEBUG_FLAGS)
    }

    fn linker_dynamic_flags(&self) -> Vec<String> {
        self.target_list(keys::LINKER_DYNAMIC_FLAGS)
    }

    fn llvm_debug_opt_flags(&self) -> Vec<String> {
        self.target_list(keys::LLVM_DEBUG_OPT_FLAGS)
    }

    fn s2wasm_flags(&self) -> Vec<String> {
        self.target_list(keys::S2WASM_FLAGS)
    }

    fn target_sys_root(&self) -> Option<String> {
        self.target_string(keys::TARGET_SYS_ROOT)
    }

    fn libffi_dir(&self) -> Option<String> {
        self.target_string(keys::LIBFFI_DIR)
    }

    fn gcc_toolchain(&self) -> Option<String> {
        self.target_string(keys::GCC_TOOLCHAIN)
    }

    /// The clang `-target` argument.
    fn target_arg(&self) -> Option<String> {
        self.target_string(keys::QUADRUPLE)
    }

    // These two depend on which host cross-compiles to the target.
    fn target_toolchain(&self) -> Option<String> {
        self.host_target_string(keys::TARGET_TOOLCHAIN)
    }

    fn dependencies(&self) -> Vec<String> {
        self.host_target_list(keys::DEPENDENCIES)
    }

    fn os_version_min(&self) -> Option<String> {
        self.target_string(keys::OS_VERSION_MIN)
    }

    fn os_version_min_flag_ld(&self) -> Option<String> {
        self.target_string(keys::OS_VERSION_MIN_FLAG_LD)
    }

    fn dynamic_linker(&self) -> Option<String> {
        self.target_string(keys::DYNAMIC_LINKER)
    }

    fn abi_specific_libraries(&self) -> Vec<String> {
        self.target_list(keys::ABI_SPECIFIC_LIBRARIES)
    }

    fn lib_gcc(&self) -> Option<String> {
        self.target_string(keys::LIB_GCC)
    }

    fn jdk_home(&self) -> Option<String> {
        self.host_string(keys::JDK_HOME)
    }

    /// Local directory holding unpacked dependency trees.
    fn dependencies_mirror(&self) -> Option<String> {
        self.host_string(keys::DEPENDENCIES_MIRROR)
    }

    fn absolute_target_sys_root(&self) -> Result<PathBuf> {
        absolute_of(self, keys::TARGET_SYS_ROOT, self.target_sys_root())
    }

    fn absolute_target_toolchain(&self) -> Result<PathBuf> {
        absolute_of(self, keys::TARGET_TOOLCHAIN, self.target_toolchain())
    }

    fn absolute_gcc_toolchain(&self) -> Result<PathBuf> {
        absolute_of(self, keys::GCC_TOOLCHAIN, self.gcc_toolchain())
    }

    fn absolute_llvm_home(&self) -> Result<PathBuf> {
        absolute_of(self, keys::LLVM_HOME, self.llvm_home())
    }

    fn absolute_libffi_dir(&self) -> Result<PathBuf> {
        absolute_of(self, keys::LIBFFI_DIR, self.libffi_dir())
    }

    /// LLVM location for the MinGW target.
    ///
    /// Only defined for [`KonanTarget::Mingw`]; aliases [`Self::llvm_home`]
    /// until the property file grows a dedicated key.
    fn mingw_with_llvm(&self) -> Result<Option<String>> {
        if self.target() != KonanTarget::Mingw {
            return Err(PropertyError::TargetMismatch {
                property: keys::MINGW_WITH_LLVM.to_string(),
                expected: KonanTarget::Mingw.name().to_string(),
                target: self.target().name().to_string(),
            });
        }
        Ok(self.llvm_home())
    }
}

fn absolute_of<V>(values: &V, key: &str, value: Option<String>) -> Result<PathBuf>
where
    V: KonanPropertyValues + ?Sized,
{
    let value = value.ok_or_else(|| PropertyError::MissingProperty {
        key: key.to_string(),
        target: values.target().name().to_string(),
    })?;
    values.absolute(&value)
}
