//! Toolchain dependency materialization.
//!
//! Each host/target pair declares the dependency trees it needs
//! (`dependencies.<host>-<target>`), e.g. a sysroot or an LLVM
//! distribution. The processor makes sure every one of them is present
//! under the base directory and records a fingerprint for each.
//!
//! Layout:
//! ```text
//! <base>/
//!   .extracted.json      : name → content hash of every materialized dependency
//!   <dependency-name>/   : one unpacked tree per dependency
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::error::{PropertyError, Result};
use crate::integrity::ContentHash;
use crate::values::KonanPropertyValues;

const RECORD_FILE: &str = ".extracted.json";

/// Where missing dependency trees are obtained from.
pub trait DependencySource: fmt::Debug + Send + Sync {
    /// Whether the source can provide `name`.
    fn contains(&self, name: &str) -> bool;

    /// Materialize `name` at `dest`, which does not exist yet.
    fn fetch(&self, name: &str, dest: &Path) -> Result<()>;
}

/// A directory holding unpacked dependency trees, one per subdirectory.
#[derive(Debug, Clone)]
pub struct LocalMirror {
    root: PathBuf,
}

impl LocalMirror {
    pub fn new(root: PathBuf) -> Self {
        LocalMirror { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DependencySource for LocalMirror {
    fn contains(&self, name: &str) -> bool {
        self.root.join(name).is_dir()
    }

    fn fetch(&self, name: &str, dest: &Path) -> Result<()> {
        let source = self.root.join(name);
        if !source.is_dir() {
            return Err(PropertyError::DependencyUnavailable {
                name: name.to_string(),
                detail: format!("not found in mirror {}", self.root.display()),
            });
        }
        copy_tree(&source, dest)
    }
}

/// Outcome of a [`DependencyProcessor::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyReport {
    /// Copied from the source during this run.
    pub fetched: Vec<String>,
    /// Already present with a matching fingerprint.
    pub up_to_date: Vec<String>,
    /// Present but unrecorded; fingerprinted and recorded as-is.
    pub adopted: Vec<String>,
}

impl DependencyReport {
    pub fn total(&self) -> usize {
        self.fetched.len() + self.up_to_date.len() + self.adopted.len()
    }
}

/// Ensures declared dependencies exist under a base directory and resolves
/// relative paths against it.
#[derive(Debug)]
pub struct DependencyProcessor {
    root: PathBuf,
    dependencies: Vec<String>,
    source: Option<Arc<dyn DependencySource>>,
}

impl DependencyProcessor {
    /// Create a processor for the dependencies declared by `values`.
    ///
    /// A relative `root` is anchored at the current directory. If the current
    /// directory cannot be determined, a warning is logged and the root stays
    /// relative, so later filesystem calls resolve it against whatever the
    /// process directory is at that time. A configured `dependenciesMirror`
    /// becomes the [`LocalMirror`] source.
    pub fn new<V>(root: PathBuf, values: &V) -> Self
    where
        V: KonanPropertyValues + ?Sized,
    {
        let root = if root.is_absolute() {
            normalize(&root)
        } else {
            match std::env::current_dir() {
                Ok(cwd) => normalize_join(&cwd, &root),
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        root = %root.display(),
                        "current directory unavailable; dependency root left relative"
                    );
                    normalize(&root)
                }
            }
        };
        let source = values.dependencies_mirror().map(|mirror| {
            Arc::new(LocalMirror::new(normalize_join(&root, Path::new(&mirror))))
                as Arc<dyn DependencySource>
        });
        DependencyProcessor {
            dependencies: values.dependencies(),
            root,
            source,
        }
    }

    /// Replace the dependency source, including a configured mirror.
    pub fn with_source(mut self, source: Arc<dyn DependencySource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Resolve `path` against the base directory.
    ///
    /// Absolute inputs are only normalized.
    pub fn resolve_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize_join(&self.root, path.as_ref())
    }

    /// Make every declared dependency available under the base directory.
    ///
    /// Every name must be a single plain path component; anything else
    /// fails with [`PropertyError::DependencyUnavailable`] before the base
    /// directory is touched.
    pub fn run(&self) -> Result<DependencyReport> {
        for name in &self.dependencies {
            check_name(name)?;
        }
        std::fs::create_dir_all(&self.root)?;
        let record_path = self.root.join(RECORD_FILE);
        let mut record = load_record(&record_path)?;
        let mut report = DependencyReport::default();

        for name in &self.dependencies {
            let dest = self.root.join(name);
            let recorded = record.get(name).cloned();

            if dest.is_dir() {
                let actual = ContentHash::of_dir(&dest)?;
                match recorded {
                    Some(expected) if expected == actual => {
                        tracing::debug!(dependency = %name, "dependency up to date");
                        report.up_to_date.push(name.clone());
                    }
                    Some(expected) => {
                        return Err(PropertyError::IntegrityFailure {
                            name: name.clone(),
                            expected: expected.to_string(),
                            actual: actual.to_string(),
                        });
                    }
                    None => {
                        tracing::debug!(dependency = %name, "adopting existing dependency");
                        record.insert(name.clone(), actual);
                        save_record(&record_path, &record)?;
                        report.adopted.push(name.clone());
                    }
                }
                continue;
            }

            let source = self
                .source
                .as_deref()
                .ok_or_else(|| PropertyError::DependencyUnavailable {
                    name: name.clone(),
                    detail: "no dependency source configured".into(),
                })?;
            if !source.contains(name) {
                return Err(PropertyError::DependencyUnavailable {
                    name: name.clone(),
                    detail: format!("not provided by {source:?}"),
                });
            }
            tracing::info!(dependency = %name, dest = %dest.display(), "fetching dependency");

            let staging = self.root.join(format!(".{name}.partial"));
            if staging.exists() {
                std::fs::remove_dir_all(&staging)?;
            }
            source.fetch(name, &staging)?;
            std::fs::rename(&staging, &dest)?;

            record.insert(name.clone(), ContentHash::of_dir(&dest)?);
            save_record(&record_path, &record)?;
            report.fetched.push(name.clone());
        }

        Ok(report)
    }
}

fn check_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if plain && !name.contains(['/', '\\']) && !name.starts_with('.') {
        return Ok(());
    }
    Err(PropertyError::DependencyUnavailable {
        name: name.to_string(),
        detail: "invalid dependency name".into(),
    })
}

fn load_record(path: &Path) -> Result<BTreeMap<String, ContentHash>> {
    if !path.is_file() {
        return Ok(BTreeMap::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_record(path: &Path, record: &BTreeMap<String, ContentHash>) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);
        let kind = entry.file_type();
        if kind.is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if kind.is_symlink() {
            copy_link(entry.path(), &target)?;
        } else if kind.is_file() {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_link(link: &Path, dest: &Path) -> Result<()> {
    std::os::unix::fs::symlink(std::fs::read_link(link)?, dest)?;
    Ok(())
}

/// Without symlinks, a link is materialized as a copy of what it points to.
#[cfg(not(unix))]
fn copy_link(link: &Path, dest: &Path) -> Result<()> {
    let resolved = std::fs::canonicalize(link)?;
    if resolved.is_dir() {
        copy_tree(&resolved, dest)
    } else {
        std::fs::copy(&resolved, dest)?;
        Ok(())
    }
}

/// Lexically join `path` onto `base` (unless absolute) and normalize.
pub fn normalize_join(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Drop `.` components and fold `..` into their parent, without touching
/// the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
