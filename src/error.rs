//! Error types for closure resolution.

use std::path::PathBuf;

use thiserror::Error;

use crate::base::ModuleKey;

/// Errors that can occur while resolving a unit's module closure.
///
/// None of these are retried: a failure is terminal for the run and is
/// surfaced to the invoking build step. Partial output already written to
/// the output tree is tolerated; the build step is expected to re-run from
/// scratch after a fix.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Malformed rewrite-rule configuration line.
    #[error("rule config error at {path}:{line}: {message}", path = .path.display())]
    Config {
        path: PathBuf,
        /// 1-based line number in the configuration file.
        line: usize,
        message: String,
    },

    /// Malformed module descriptor.
    #[error("malformed descriptor {source_name}: {message}")]
    Descriptor {
        /// File path or archive entry name the descriptor came from.
        source_name: String,
        message: String,
    },

    /// A required module key has no provider anywhere in the archive set.
    #[error("no provider archive supplies required module {0}")]
    UnresolvedModule(ModuleKey),

    /// A placeholder artifact reference has no entry in its owning
    /// archive's version table.
    #[error("no version table entry for artifact ${{{expr}}} in {archive}", archive = .archive.display())]
    UnresolvedArtifact { expr: String, archive: PathBuf },

    /// Non-empty missing set but no archive can supply any of it. This is
    /// an internal accounting defect, distinct from [`Self::UnresolvedModule`].
    #[error("resolution stuck: {} module(s) missing but no archive supplies any of them: {}",
        .missing.len(),
        .missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    Stuck { missing: Vec<ModuleKey> },

    /// Provider archive could not be opened or read.
    #[error("archive error in {path}: {message}", path = .path.display())]
    Archive { path: PathBuf, message: String },

    /// IO error on the module tree or output tree.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    /// Create a descriptor error.
    pub fn descriptor(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Descriptor {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create an archive error.
    pub fn archive(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.into(),
        }
    }
}
