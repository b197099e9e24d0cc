//! `konan-config get`: look up a single property.

use anyhow::{bail, Result};
use clap::ValueEnum;
use konan_platform::PlatformManager;
use konan_properties::TargetableExternalStorage;

/// Which qualifier a lookup applies to the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    /// `key`
    Host,
    /// `key.<target>`
    Target,
    /// `key.<host>-<target>`
    HostTarget,
}

pub fn run(
    manager: &PlatformManager,
    key: &str,
    target: Option<&str>,
    scope: Scope,
    list: bool,
) -> Result<()> {
    match lookup(manager, key, target, scope, list)? {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => bail!("property '{key}' is not set ({scope:?} scope)"),
    }
}

/// The value as printed: a scalar verbatim, a list one item per line.
/// `None` when the key is unset (an empty list counts as unset).
fn lookup(
    manager: &PlatformManager,
    key: &str,
    target: Option<&str>,
    scope: Scope,
    list: bool,
) -> Result<Option<String>> {
    let platform = manager.resolve(target.unwrap_or("host"))?;
    if list {
        let values = match scope {
            Scope::Host => platform.host_list(key),
            Scope::Target => platform.target_list(key),
            Scope::HostTarget => platform.host_target_list(key),
        };
        return Ok((!values.is_empty()).then(|| values.join("\n")));
    }
    Ok(match scope {
        Scope::Host => platform.host_string(key),
        Scope::Target => platform.target_string(key),
        Scope::HostTarget => platform.host_target_string(key),
    })
}
