//! `konan-config deps`: materialize declared dependencies.

use anyhow::{Context, Result};
use konan_platform::PlatformManager;
use konan_properties::DependencyReport;

pub fn run(manager: &PlatformManager, target: Option<&str>) -> Result<()> {
    let report = download(manager, target)?;
    println!("Dependencies in {}:", manager.base_dir().display());
    print_group("fetched", &report.fetched);
    print_group("up to date", &report.up_to_date);
    print_group("adopted", &report.adopted);
    println!("{} dependencies ready", report.total());
    Ok(())
}

fn download(manager: &PlatformManager, target: Option<&str>) -> Result<DependencyReport> {
    match target {
        Some(name) => {
            let platform = manager.resolve(name)?;
            platform
                .configurables()
                .download_dependencies()
                .with_context(|| format!("downloading dependencies for '{name}'"))
        }
        None => manager
            .download_dependencies()
            .context("downloading dependencies"),
    }
}

fn print_group(label: &str, names: &[String]) {
    for name in names {
        println!("  {label:<11} {name}");
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use konan_properties::PropertyStore;
    use konan_target::{KonanTarget, TargetManager};

    use super::*;

    fn manager_in(dir: &std::path::Path) -> PlatformManager {
        let mirror = dir.join("mirror");
        fs::create_dir_all(mirror.join("wasm-sysroot")).unwrap();
        fs::write(mirror.join("wasm-sysroot/libc.a"), "archive").unwrap();
        let properties = format!(
            "dependenciesMirror = {}\ndependencies.linux-wasm32 = wasm-sysroot\n",
            mirror.display()
        );
        PlatformManager::new(
            Arc::new(PropertyStore::parse(&properties).unwrap()),
            dir.join("deps"),
            &TargetManager::new(KonanTarget::Linux, [KonanTarget::Linux, KonanTarget::Wasm32]),
        )
    }

    #[test]
    fn download_single_target() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());

        let report = download(&manager, Some("wasm32")).unwrap();
        assert_eq!(report.fetched, vec!["wasm-sysroot"]);
        assert!(dir.path().join("deps/wasm-sysroot/libc.a").is_file());

        let host = download(&manager, Some("host")).unwrap();
        assert_eq!(host.total(), 0);
    }

    #[test]
    fn download_all_then_up_to_date() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        assert!(run(&manager, None).is_ok());

        let again = download(&manager, None).unwrap();
        assert_eq!(again.up_to_date, vec!["wasm-sysroot"]);
    }

    #[test]
    fn missing_from_mirror_fails() {
        let dir = tempfile::tempdir().unwrap();
        let properties = "dependencies.linux-linux = absent\n";
        let manager = PlatformManager::new(
            Arc::new(PropertyStore::parse(properties).unwrap()),
            dir.path().join("deps"),
            &TargetManager::new(KonanTarget::Linux, [KonanTarget::Linux]),
        );
        let err = download(&manager, None).unwrap_err();
        assert!(format!("{err:#}").contains("absent"));
    }
}
