//! Content fingerprints for materialized dependencies.
//!
//! A dependency directory is fingerprinted with SHA-256 over its entries in
//! sorted relative-path order. Regular files contribute their contents and
//! symbolic links their target, so that any added, removed, renamed,
//! modified, or retargeted entry changes the hash.

use std::fmt::{self, Write as _};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::Result;

const FILE_TAG: u8 = b'f';
const LINK_TAG: u8 = b'l';

/// Fingerprint of a dependency tree, as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Fingerprint every regular file and symbolic link below `dir`.
    ///
    /// Links are not followed.
    pub fn of_dir(dir: &Path) -> Result<Self> {
        let mut hasher = Sha256::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            let kind = entry.file_type();
            if kind.is_dir() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(dir) else {
                continue;
            };
            let name: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            hasher.update(name.join("/").as_bytes());
            hasher.update([0u8]);
            if kind.is_symlink() {
                let link = std::fs::read_link(entry.path())?;
                hasher.update([LINK_TAG]);
                hasher.update(link.to_string_lossy().as_bytes());
            } else {
                hasher.update([FILE_TAG]);
                hasher.update(std::fs::read(entry.path())?);
            }
            hasher.update([0u8]);
        }
        Ok(ContentHash(to_hex(&hasher.finalize())))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_hex(digest: &[u8]) -> String {
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
