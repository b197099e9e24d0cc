//! `konan.toml` parsing and toolchain session setup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use konan_platform::PlatformManager;
use konan_properties::PropertyStore;
use konan_target::{KonanTarget, TargetManager};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "konan.toml";

/// The top-level structure of `konan.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KonanConfig {
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    /// Property overrides applied on top of the property file.
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[toolchain]` section. Paths are relative to the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Property file.
    #[serde(default)]
    pub properties: Option<PathBuf>,
    /// Dependency base directory.
    #[serde(default)]
    pub dependencies: Option<PathBuf>,
    /// Host override (e.g. "linux").
    #[serde(default)]
    pub host: Option<String>,
    /// Enabled targets; the host's defaults when omitted.
    #[serde(default)]
    pub targets: Option<Vec<String>>,
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: Option<String>,
}

impl KonanConfig {
    /// Search upward from `start_dir` for a `konan.toml` file, parse and return
    /// it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let config: KonanConfig = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((config, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing konan.toml")
    }
}

/// Values given on the command line; each one beats the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub properties: Option<PathBuf>,
    pub dependencies: Option<PathBuf>,
    pub host: Option<String>,
    pub overrides: Vec<(String, String)>,
}

/// Fully resolved inputs for opening a toolchain session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub properties: PathBuf,
    pub dependencies: PathBuf,
    pub host: Option<String>,
    pub targets: Option<Vec<String>>,
    pub overrides: Vec<(String, String)>,
}

impl Settings {
    /// Merge command-line values over an optional config file found in `config_dir`.
    ///
    /// Command-line paths resolve against `cwd`, config paths against the
    /// directory holding `konan.toml`.
    pub fn resolve(cli: &CliOverrides, config: Option<(&KonanConfig, &Path)>, cwd: &Path) -> Self {
        let (toolchain, base, file_overrides) = match config {
            Some((config, dir)) => (config.toolchain.clone(), dir, config.overrides.clone()),
            None => (ToolchainConfig::default(), cwd, BTreeMap::new()),
        };

        let properties = match &cli.properties {
            Some(path) => cwd.join(path),
            None => base.join(
                toolchain
                    .properties
                    .unwrap_or_else(|| PathBuf::from("konan.properties")),
            ),
        };
        let dependencies = match &cli.dependencies {
            Some(path) => cwd.join(path),
            None => base.join(
                toolchain
                    .dependencies
                    .unwrap_or_else(|| PathBuf::from("dependencies")),
            ),
        };

        let mut overrides: Vec<(String, String)> = file_overrides.into_iter().collect();
        overrides.extend(cli.overrides.iter().cloned());

        Settings {
            properties,
            dependencies,
            host: cli.host.clone().or(toolchain.host),
            targets: toolchain.targets,
            overrides,
        }
    }

    pub fn target_manager(&self) -> Result<TargetManager> {
        let host = match &self.host {
            Some(name) => name
                .parse::<KonanTarget>()
                .and_then(KonanTarget::as_host)
                .with_context(|| format!("invalid host '{name}'"))?,
            None => KonanTarget::detect_host()?,
        };
        let manager = match &self.targets {
            Some(names) => {
                let enabled = names
                    .iter()
                    .map(|name| {
                        name.parse::<KonanTarget>()
                            .with_context(|| format!("invalid target '{name}' in configuration"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                TargetManager::new(host, enabled)
            }
            None => TargetManager::for_host(host),
        };
        Ok(manager)
    }

    pub fn load_store(&self) -> Result<Arc<PropertyStore>> {
        let store = PropertyStore::load(&self.properties)
            .with_context(|| format!("loading {}", self.properties.display()))?;
        let store = if self.overrides.is_empty() {
            store
        } else {
            store.with_overrides(self.overrides.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        };
        tracing::debug!(
            path = %self.properties.display(),
            entries = store.len(),
            overrides = self.overrides.len(),
            "loaded properties"
        );
        Ok(Arc::new(store))
    }

    pub fn open(&self) -> Result<PlatformManager> {
        let targets = self.target_manager()?;
        let store = self.load_store()?;
        Ok(PlatformManager::new(store, &self.dependencies, &targets))
    }
}

/// Parse a `key=value` override.
pub fn parse_override(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use konan_target::TargetError;

    use super::*;

    #[test]
    fn parse_full_config() {
        let config = KonanConfig::from_str(
            r#"
[toolchain]
properties = "etc/konan.properties"
dependencies = "deps"
host = "linux"
targets = ["linux", "wasm32"]

[overrides]
"linkerKonanFlags.linux" = "-lm"

[logging]
level = "info"
"#,
        )
        .unwrap();
        assert_eq!(config.toolchain.host.as_deref(), Some("linux"));
        assert_eq!(config.toolchain.targets.as_ref().unwrap().len(), 2);
        assert_eq!(config.overrides["linkerKonanFlags.linux"], "-lm");
        assert_eq!(config.logging.level.as_deref(), Some("info"));
    }

    #[test]
    fn parse_empty_config() {
        let config = KonanConfig::from_str("").unwrap();
        assert!(config.toolchain.properties.is_none());
        assert!(config.overrides.is_empty());
    }

    #[test]
    fn reject_invalid_toml() {
        assert!(KonanConfig::from_str("[toolchain\nhost = ").is_err());
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[toolchain]\nhost = \"mingw\"\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, found) = KonanConfig::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(config.toolchain.host.as_deref(), Some("mingw"));
        assert_eq!(found, dir.path());
    }

    #[test]
    fn cli_values_take_precedence() {
        let config = KonanConfig::from_str(
            "[toolchain]\nproperties = \"p.properties\"\nhost = \"linux\"\n[overrides]\na = \"1\"\n",
        )
        .unwrap();
        let cli = CliOverrides {
            dependencies: Some(PathBuf::from("d")),
            host: Some("macbook".into()),
            overrides: vec![("a".into(), "2".into())],
            ..CliOverrides::default()
        };
        let settings = Settings::resolve(&cli, Some((&config, Path::new("/proj"))), Path::new("/cwd"));
        assert_eq!(settings.properties, PathBuf::from("/proj/p.properties"));
        assert_eq!(settings.dependencies, PathBuf::from("/cwd/d"));
        assert_eq!(settings.host.as_deref(), Some("macbook"));
        assert_eq!(
            settings.overrides,
            vec![("a".to_string(), "1".to_string()), ("a".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn defaults_without_config() {
        let settings = Settings::resolve(&CliOverrides::default(), None, Path::new("/cwd"));
        assert_eq!(settings.properties, PathBuf::from("/cwd/konan.properties"));
        assert_eq!(settings.dependencies, PathBuf::from("/cwd/dependencies"));
        assert!(settings.host.is_none());
    }

    #[test]
    fn target_manager_from_settings() {
        let mut settings = Settings::resolve(&CliOverrides::default(), None, Path::new("/cwd"));
        settings.host = Some("linux".into());
        assert_eq!(settings.target_manager().unwrap().enabled().len(), 7);

        settings.targets = Some(vec!["wasm32".into(), "linux".into()]);
        let targets = settings.target_manager().unwrap();
        assert_eq!(targets.enabled(), &[KonanTarget::Wasm32, KonanTarget::Linux]);

        settings.targets = Some(vec!["vax".into()]);
        assert!(settings.target_manager().is_err());
    }

    #[test]
    fn non_desktop_host_is_rejected() {
        let mut settings = Settings::resolve(&CliOverrides::default(), None, Path::new("/cwd"));
        for name in ["wasm32", "android_arm64", "raspberrypi"] {
            settings.host = Some(name.into());
            let err = settings.target_manager().unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<TargetError>(),
                    Some(TargetError::UnsupportedHost { .. })
                ),
                "{name}: {err:#}"
            );
        }
    }

    #[test]
    fn overrides_applied_to_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("konan.properties");
        std::fs::write(&path, "llvmHome = llvm-5\n").unwrap();
        let settings = Settings {
            properties: path,
            dependencies: dir.path().join("deps"),
            host: Some("linux".into()),
            targets: None,
            overrides: vec![("llvmHome".into(), "llvm-6".into())],
        };
        assert_eq!(settings.load_store().unwrap().get("llvmHome"), Some("llvm-6"));
    }

    #[test]
    fn parse_override_pairs() {
        assert_eq!(
            parse_override("linkerKonanFlags.linux=-lm -ldl").unwrap(),
            ("linkerKonanFlags.linux".to_string(), "-lm -ldl".to_string())
        );
        assert!(parse_override("novalue").is_err());
        assert!(parse_override("=x").is_err());
    }
}
