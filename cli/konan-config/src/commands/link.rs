//! `konan-config link`: linker command line for a target.

use anyhow::{bail, Result};
use konan_platform::{LinkOptions, PlatformManager};

pub fn run(
    manager: &PlatformManager,
    target: &str,
    output: &str,
    objects: &[String],
    options: &LinkOptions,
) -> Result<()> {
    println!("{}", command(manager, target, output, objects, options)?.join(" "));
    Ok(())
}

fn command(
    manager: &PlatformManager,
    target: &str,
    output: &str,
    objects: &[String],
    options: &LinkOptions,
) -> Result<Vec<String>> {
    if objects.is_empty() {
        bail!("no object files given");
    }
    let linker = manager.resolve(target)?.linker()?;
    tracing::debug!(linker = %linker.linker_path().display(), objects = objects.len(), "building link command");
    Ok(linker.link_command(objects, output, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;

    #[test]
    fn gcc_link_command() {
        let m = fixtures::manager();
        let options = LinkOptions {
            optimize: true,
            ..LinkOptions::default()
        };
        let cmd = command(&m, "linux", "app.kexe", &["main.o".to_string()], &options).unwrap();
        assert_eq!(cmd[0], "/deps/gcc/bin/ld.gold");
        assert!(cmd.contains(&"--gc-sections".to_string()));
        assert!(cmd.contains(&"-ldl".to_string()));
    }

    #[test]
    fn requires_objects() {
        let m = fixtures::manager();
        assert!(command(&m, "linux", "app", &[], &LinkOptions::default()).is_err());
    }
}
