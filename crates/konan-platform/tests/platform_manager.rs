use std::fs;
use std::sync::Arc;
use std::thread;

use konan_platform::{LinkOptions, PlatformError, PlatformManager};
use konan_properties::{KonanPropertyValues, PropertyStore};
use konan_target::{KonanTarget, TargetManager};

const PROPERTIES: &str = "\
llvmHome = /opt/llvm
linkerKonanFlags.wasm32 = -flag1 -flag2
linkerKonanFlags.linux = -lpthread
targetToolchain.linux-linux = gcc
targetSysRoot.linux = sysroot
libGcc.linux = lib/gcc
dynamicLinker.linux = /lib64/ld-linux-x86-64.so.2
targetToolchain.linux-wasm32 = wasm
quadruple.wasm32 = wasm32-unknown-unknown
";

fn manager(properties: &str, base: &str) -> PlatformManager {
    PlatformManager::new(
        Arc::new(PropertyStore::parse(properties).unwrap()),
        base,
        &TargetManager::new(KonanTarget::Linux, [KonanTarget::Linux, KonanTarget::Wasm32]),
    )
}

#[test]
fn platform_lookup_is_cached_and_limited_to_enabled() {
    let m = manager(PROPERTIES, "/deps");

    let first = m.platform(KonanTarget::Wasm32).unwrap();
    let second = m.platform(KonanTarget::Wasm32).unwrap();
    assert!(Arc::ptr_eq(first, second));

    let err = m.platform(KonanTarget::Mingw).unwrap_err();
    assert!(matches!(
        err,
        PlatformError::NotEnabled {
            target: KonanTarget::Mingw,
            host: KonanTarget::Linux
        }
    ));
    assert_eq!(err.to_string(), "target 'mingw' is not enabled (host 'linux')");
}

#[test]
fn platform_forwards_property_values() {
    let m = manager(PROPERTIES, "/deps");
    let wasm = m.platform(KonanTarget::Wasm32).unwrap();
    assert_eq!(wasm.linker_konan_flags(), vec!["-flag1", "-flag2"]);
    assert_eq!(wasm.llvm_home().as_deref(), Some("/opt/llvm"));
    assert!(wasm.linker_dynamic_flags().is_empty());
}

#[test]
fn helpers_built_on_first_use() {
    let m = manager(PROPERTIES, "/deps");
    let linux = m.platform(KonanTarget::Linux).unwrap();
    assert!(!linux.clang_initialized());
    assert!(!linux.linker_initialized());

    let cmd = linux
        .linker()
        .unwrap()
        .link_command(&["main.o".to_string()], "app.kexe", &LinkOptions::default());
    assert_eq!(cmd[0], "/deps/gcc/bin/ld.gold");
    assert!(cmd.contains(&"-lpthread".to_string()));
    assert!(linux.linker_initialized());
    assert!(!linux.clang_initialized());

    let clang = linux.clang().unwrap().target_clang_cmd();
    assert_eq!(clang[0], "/opt/llvm/bin/clang");
}

#[test]
fn concurrent_first_access_initializes_once() {
    let m = manager(PROPERTIES, "/deps");
    let wasm = m.platform(KonanTarget::Wasm32).unwrap().clone();

    let addresses: Vec<usize> = (0..8)
        .map(|_| {
            let wasm = wasm.clone();
            thread::spawn(move || wasm.clang().unwrap() as *const _ as usize)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert!(addresses.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn download_dependencies_from_mirror() {
    let dir = tempfile::tempdir().unwrap();
    let mirror = dir.path().join("mirror");
    for dep in ["sysroot-a", "wasm-tools"] {
        fs::create_dir_all(mirror.join(dep).join("bin")).unwrap();
        fs::write(mirror.join(dep).join("bin/tool"), dep).unwrap();
    }
    let properties = format!(
        "{PROPERTIES}dependenciesMirror = {}\n\
         dependencies.linux-linux = sysroot-a\n\
         dependencies.linux-wasm32 = sysroot-a wasm-tools\n",
        mirror.display()
    );
    let base = dir.path().join("deps");
    let m = manager(&properties, base.to_str().unwrap());

    let report = m.download_dependencies().unwrap();
    assert_eq!(report.fetched, vec!["sysroot-a", "wasm-tools"]);
    assert!(report.up_to_date.is_empty());
    assert_eq!(
        fs::read_to_string(base.join("wasm-tools/bin/tool")).unwrap(),
        "wasm-tools"
    );

    let again = m.download_dependencies().unwrap();
    assert!(again.fetched.is_empty());
    assert_eq!(again.up_to_date, vec!["sysroot-a", "wasm-tools"]);
}
