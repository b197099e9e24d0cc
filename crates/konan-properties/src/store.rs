//! Flat property file parsing and qualified key lookup.
//!
//! The file format follows Java `.properties` conventions:
//!
//! ```text
//! # comment
//! llvmHome = clang-llvm-5.0.0-linux-x86-64
//! linkerKonanFlags.linux = -lm -lpthread \
//!     -ldl
//! targetToolchain.linux-raspberrypi = target-gcc-toolchain-3-linux-x86-64
//! ```
//!
//! A key is looked up under one of three spellings depending on its
//! [`Qualifier`]: bare for host-wide values, `key.<target>` for target
//! values, and `key.<host>-<target>` for values that depend on both.
//!
//! A value (or a list token) of the form `$name` refers to the property
//! `name` under the same qualifier. A reference to a property that does
//! not exist is kept verbatim, so tokens such as `$ORIGIN` in an rpath
//! reach the tool unchanged.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use konan_target::KonanTarget;

use crate::error::{PropertyError, Result};

/// How a bare key is spelled in the property file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    /// `key`
    Host,
    /// `key.<target>`
    Target(KonanTarget),
    /// `key.<host>-<target>`
    HostTarget {
        host: KonanTarget,
        target: KonanTarget,
    },
}

impl Qualifier {
    /// Spell `key` under this qualifier.
    pub fn qualify(&self, key: &str) -> String {
        match self {
            Qualifier::Host => key.to_string(),
            Qualifier::Target(target) => format!("{key}.{}", target.name()),
            Qualifier::HostTarget { host, target } => {
                format!("{key}.{}-{}", host.name(), target.name())
            }
        }
    }
}

/// A reference-check finding.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// An ordered, immutable mapping from property keys to raw values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyStore {
    entries: IndexMap<String, String>,
}

impl PropertyStore {
    /// Load a store from a property file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PropertyError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let store = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), entries = store.len(), "loaded property file");
        Ok(store)
    }

    /// Parse a store from property file text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = IndexMap::new();
        let mut lines = text.lines().enumerate();

        while let Some((index, raw)) = lines.next() {
            let first = raw.trim_start();
            if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
                continue;
            }

            let mut logical = first.trim_end().to_string();
            while ends_with_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim()),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical);
            if key.is_empty() {
                return Err(PropertyError::Parse {
                    line: index + 1,
                    detail: format!("missing key in '{logical}'"),
                });
            }
            entries.insert(key, value);
        }

        Ok(PropertyStore { entries })
    }

    /// Return a copy with `overrides` applied on top (last one wins).
    pub fn with_overrides<K, V>(&self, overrides: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries = self.entries.clone();
        for (key, value) in overrides {
            entries.insert(key.into(), value.into());
        }
        PropertyStore { entries }
    }

    /// Raw value of a fully spelled key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scalar value of `key` under `qualifier`, with references followed.
    pub fn string(&self, key: &str, qualifier: &Qualifier) -> Option<String> {
        let mut path = vec![key.to_string()];
        self.resolve_string(key, qualifier, &mut path)
    }

    /// List value of `key` under `qualifier`, with references spliced in.
    ///
    /// Absent keys yield an empty list.
    pub fn list(&self, key: &str, qualifier: &Qualifier) -> Vec<String> {
        let mut path = vec![key.to_string()];
        let mut out = Vec::new();
        self.resolve_list(key, qualifier, &mut path, &mut out);
        out
    }

    fn resolve_string(
        &self,
        key: &str,
        qualifier: &Qualifier,
        path: &mut Vec<String>,
    ) -> Option<String> {
        let raw = self.get(&qualifier.qualify(key))?;
        let Some(reference) = reference_name(raw) else {
            return Some(raw.to_string());
        };
        if path.iter().any(|k| k == reference) {
            tracing::warn!(key, reference, "property reference cycle; treating as absent");
            return None;
        }
        if !self.contains_key(&qualifier.qualify(reference)) {
            tracing::warn!(key, reference, "unresolved property reference; keeping it verbatim");
            return Some(raw.to_string());
        }
        path.push(reference.to_string());
        let resolved = self.resolve_string(reference, qualifier, path);
        path.pop();
        resolved
    }

    fn resolve_list(
        &self,
        key: &str,
        qualifier: &Qualifier,
        path: &mut Vec<String>,
        out: &mut Vec<String>,
    ) {
        let Some(raw) = self.get(&qualifier.qualify(key)) else {
            return;
        };
        for token in raw.split_whitespace() {
            match reference_name(token) {
                Some(reference) if path.iter().any(|k| k == reference) => {
                    tracing::warn!(key, reference, "property reference cycle; dropping token");
                }
                Some(reference) if !self.contains_key(&qualifier.qualify(reference)) => {
                    tracing::warn!(
                        key,
                        reference,
                        "unresolved property reference; keeping it verbatim"
                    );
                    out.push(token.to_string());
                }
                Some(reference) => {
                    path.push(reference.to_string());
                    self.resolve_list(reference, qualifier, path, out);
                    path.pop();
                }
                None => out.push(token.to_string()),
            }
        }
    }

    /// Report dangling references (warnings) and reference cycles (errors).
    ///
    /// A reference inside `key.<suffix>` is checked against `name.<suffix>`.
    pub fn check_references(&self) -> std::result::Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        let edges: IndexMap<&str, Vec<String>> = self
            .entries
            .iter()
            .map(|(key, value)| {
                let suffix = key.rsplit_once('.').map(|(_, s)| s);
                let targets = value
                    .split_whitespace()
                    .filter_map(reference_name)
                    .map(|name| match suffix {
                        Some(s) => format!("{name}.{s}"),
                        None => name.to_string(),
                    })
                    .collect();
                (key.as_str(), targets)
            })
            .collect();

        for (key, targets) in &edges {
            for target in targets {
                if !self.entries.contains_key(target) {
                    issues.push(ValidationIssue {
                        severity: "warning",
                        message: format!("'{key}' refers to undefined property '{target}'"),
                    });
                }
            }
        }

        let mut reported = HashSet::new();
        for start in edges.keys() {
            if let Some(cycle) = find_cycle(start, &edges) {
                let mut members: Vec<&str> = cycle.iter().map(String::as_str).collect();
                members.sort_unstable();
                members.dedup();
                if reported.insert(members.join(",")) {
                    issues.push(ValidationIssue {
                        severity: "error",
                        message: format!("reference cycle: {}", cycle.join(" -> ")),
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Depth-first search for a cycle passing through `start`.
fn find_cycle(start: &str, edges: &IndexMap<&str, Vec<String>>) -> Option<Vec<String>> {
    fn visit(
        node: &str,
        start: &str,
        edges: &IndexMap<&str, Vec<String>>,
        path: &mut Vec<String>,
        seen: &mut HashSet<String>,
    ) -> bool {
        let Some(next) = edges.get(node) else {
            return false;
        };
        for target in next {
            if target == start {
                path.push(target.clone());
                return true;
            }
            if seen.insert(target.clone()) {
                path.push(target.clone());
                if visit(target, start, edges, path, seen) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }

    let mut path = vec![start.to_string()];
    let mut seen = HashSet::new();
    if visit(start, start, edges, &mut path, &mut seen) {
        Some(path)
    } else {
        None
    }
}

/// `$name` → `name`, if `value` is a reference.
fn reference_name(value: &str) -> Option<&str> {
    let name = value.strip_prefix('$')?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    valid.then_some(name)
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into an unescaped (key, value) pair.
fn split_entry(line: &str) -> (String, String) {
    let mut chars = line.char_indices().peekable();
    let mut key_end = line.len();
    let mut escaped = false;

    while let Some((i, c)) = chars.next() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                // `key  = value`: swallow one separator after the blanks.
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_whitespace() {
                        chars.next();
                    } else {
                        break;
                    }
                }
                if let Some(&(_, '=' | ':')) = chars.peek() {
                    chars.next();
                }
                break;
            }
            _ => {}
        }
    }

    let value_start = chars.peek().map(|&(i, _)| i).unwrap_or(line.len());
    let key = unescape(&line[..key_end]);
    let value = unescape(line[value_start..].trim());
    (key, value)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => {
                        out.push(decoded);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    _ => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
