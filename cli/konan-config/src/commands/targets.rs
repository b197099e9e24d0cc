//! `konan-config targets`: host and enabled targets.

use anyhow::Result;
use konan_platform::PlatformManager;
use konan_target::KonanTarget;

pub fn run(manager: &PlatformManager) -> Result<()> {
    println!("Host: {}", manager.host());
    println!();
    println!("Enabled targets:");
    for &target in manager.enabled() {
        println!("  {}", summary(target, manager.host()));
    }
    Ok(())
}

fn summary(target: KonanTarget, host: KonanTarget) -> String {
    let marker = if target == host { " (host)" } else { "" };
    format!(
        "{:<16} {:<8} {:<9} {}-bit{marker}",
        target.name(),
        format!("{:?}", target.family()).to_lowercase(),
        format!("{:?}", target.architecture()).to_lowercase(),
        target.architecture().bitness(),
    )
}
