//! `konan-config clang`: clang command line for a target.

use anyhow::Result;
use konan_platform::PlatformManager;

pub fn run(manager: &PlatformManager, target: &str, konan_sources: bool) -> Result<()> {
    println!("{}", command(manager, target, konan_sources)?.join(" "));
    Ok(())
}

fn command(manager: &PlatformManager, target: &str, konan_sources: bool) -> Result<Vec<String>> {
    let clang = manager.resolve(target)?.clang()?;
    let args = &clang.target_args;
    if konan_sources {
        let mut cmd = vec![args.clang_executable().display().to_string()];
        cmd.extend(args.clang_args_for_konan_sources());
        Ok(cmd)
    } else {
        Ok(clang.target_clang_cmd())
    }
}
