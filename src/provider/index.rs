use std::path::PathBuf;

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::ResolveError;
use crate::base::ModuleKey;

use super::archive::ProviderArchive;

/// Lookup over a set of scanned provider archives.
///
/// Archives are scanned in parallel (each scan touches only its own file)
/// but indexed strictly in caller-supplied load order: when two archives
/// declare the same module key, the first one in load order owns it. That
/// tie-break is part of the contract, not an artifact of iteration order.
#[derive(Debug, Default)]
pub struct ProviderIndex {
    archives: Vec<ProviderArchive>,
    by_key: IndexMap<ModuleKey, usize>,
}

impl ProviderIndex {
    /// An index over no archives; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scan all candidate archives and build the key index.
    pub fn scan(paths: &[PathBuf]) -> Result<Self, ResolveError> {
        let archives: Vec<ProviderArchive> = paths
            .par_iter()
            .map(|path| ProviderArchive::scan(path))
            .collect::<Result<_, _>>()?;

        let mut by_key: IndexMap<ModuleKey, usize> = IndexMap::new();
        for (idx, archive) in archives.iter().enumerate() {
            for key in archive.module_keys() {
                match by_key.entry(key.clone()) {
                    indexmap::map::Entry::Vacant(slot) => {
                        slot.insert(idx);
                    }
                    indexmap::map::Entry::Occupied(winner) => {
                        tracing::debug!(
                            module = %key,
                            winner = %archives[*winner.get()].path().display(),
                            loser = %archive.path().display(),
                            "module declared by multiple archives; first in load order wins"
                        );
                    }
                }
            }
            tracing::debug!(
                archive = %archive.path().display(),
                modules = archive.module_keys().count(),
                "indexed provider archive"
            );
        }

        Ok(Self { archives, by_key })
    }

    /// The archive that owns a key, respecting the load-order tie-break.
    pub fn archive_for(&self, key: &ModuleKey) -> Option<&ProviderArchive> {
        self.by_key.get(key).map(|idx| &self.archives[*idx])
    }

    pub fn contains(&self, key: &ModuleKey) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn archive_count(&self) -> usize {
        self.archives.len()
    }
}
