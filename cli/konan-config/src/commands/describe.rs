//! `konan-config describe`: resolved properties of one target.

use anyhow::Result;
use konan_platform::{Platform, PlatformManager};
use konan_properties::{keys, KonanPropertyValues};

pub fn run(manager: &PlatformManager, target: &str) -> Result<()> {
    let platform = manager.resolve(target)?;
    println!("=== Target: {} (host {}) ===", platform.target(), manager.host());
    println!("Kind: {:?}", platform.configurables().kind());
    println!();
    for (key, value) in resolved(platform) {
        println!("  {key:<24} {value}");
    }
    Ok(())
}

fn scalar(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

fn list(values: Vec<String>) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(" ")
    }
}

/// Every named accessor with its resolved value; `-` when unset.
fn resolved(p: &Platform) -> Vec<(&'static str, String)> {
    vec![
        (keys::LLVM_HOME, scalar(p.llvm_home())),
        (keys::TARGET_TOOLCHAIN, scalar(p.target_toolchain())),
        (keys::TARGET_SYS_ROOT, scalar(p.target_sys_root())),
        (keys::QUADRUPLE, scalar(p.target_arg())),
        (keys::GCC_TOOLCHAIN, scalar(p.gcc_toolchain())),
        (keys::LIBFFI_DIR, scalar(p.libffi_dir())),
        (keys::OS_VERSION_MIN, scalar(p.os_version_min())),
        (keys::OS_VERSION_MIN_FLAG_LD, scalar(p.os_version_min_flag_ld())),
        (keys::DYNAMIC_LINKER, scalar(p.dynamic_linker())),
        (keys::LIB_GCC, scalar(p.lib_gcc())),
        (keys::ABI_SPECIFIC_LIBRARIES, list(p.abi_specific_libraries())),
        (keys::DEPENDENCIES, list(p.dependencies())),
        (keys::LINKER_KONAN_FLAGS, list(p.linker_konan_flags())),
        (keys::LINKER_OPTIMIZATION_FLAGS, list(p.linker_optimization_flags())),
        (keys::LINKER_NO_DEBUG_FLAGS, list(p.linker_no_debug_flags())),
        (keys::LINKER_DYNAMIC_FLAGS, list(p.linker_dynamic_flags())),
        (keys::LLVM_LTO_FLAGS, list(p.llvm_lto_flags())),
        (keys::LLVM_LTO_OPT_FLAGS, list(p.llvm_lto_opt_flags())),
        (keys::LLVM_LTO_NOOPT_FLAGS, list(p.llvm_lto_noopt_flags())),
        (keys::LLVM_LTO_DYNAMIC_FLAGS, list(p.llvm_lto_dynamic_flags())),
        (keys::LLVM_DEBUG_OPT_FLAGS, list(p.llvm_debug_opt_flags())),
        (keys::ENTRY_SELECTOR, list(p.entry_selector())),
        (keys::S2WASM_FLAGS, list(p.s2wasm_flags())),
        (keys::JDK_HOME, scalar(p.jdk_home())),
    ]
}

#[cfg(test)]
mod tests {
    use konan_target::KonanTarget;

    use super::*;
    use crate::commands::fixtures;

    #[test]
    fn resolved_values() {
        let manager = fixtures::manager();
        let values = resolved(manager.platform(KonanTarget::Wasm32).unwrap());
        let get = |key: &str| {
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };
        assert_eq!(get("llvmHome"), "llvm");
        assert_eq!(get("quadruple"), "wasm32-unknown-unknown");
        assert_eq!(get("dependencies"), "wasm-sysroot");
        assert_eq!(get("linkerKonanFlags"), "--allow-undefined");
        assert_eq!(get("targetSysRoot"), "-");
    }

    #[test]
    fn describe_unknown_target_fails() {
        let manager = fixtures::manager();
        assert!(run(&manager, "host").is_ok());
        assert!(run(&manager, "mingw").is_err());
    }
}
