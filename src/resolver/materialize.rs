//! Output-tree placement.
//!
//! A module's on-disk location is derived deterministically from its key:
//! dotted name segments become nested directories and the slot is the leaf
//! directory. Placement overwrites stale content from prior partial runs;
//! directory creation is idempotent, so re-materializing the same key is
//! always safe.

use std::path::{Path, PathBuf};

use crate::ResolveError;
use crate::base::ModuleKey;

/// Write one payload file belonging to `key` into the output tree.
///
/// `rel_path` is relative to the module's directory and uses `/`
/// separators (archive entry convention). Returns the number of bytes
/// written.
pub fn place(
    output_root: &Path,
    key: &ModuleKey,
    rel_path: &str,
    bytes: &[u8],
) -> Result<u64, ResolveError> {
    let target = output_root
        .join(key.to_rel_path())
        .join(safe_rel_path(rel_path)?);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&target, bytes)?;
    Ok(bytes.len() as u64)
}

/// Archive entry names are untrusted: refuse anything that could escape
/// the module directory.
fn safe_rel_path(rel_path: &str) -> Result<PathBuf, ResolveError> {
    if rel_path.is_empty()
        || rel_path.starts_with('/')
        || rel_path.split('/').any(|c| c.is_empty() || c == "." || c == "..")
    {
        return Err(ResolveError::Io(std::io::Error::other(format!(
            "unsafe resource path {rel_path:?}"
        ))));
    }
    Ok(rel_path.split('/').collect())
}
