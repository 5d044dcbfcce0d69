use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use zip::ZipArchive;

use crate::ResolveError;
use crate::base::{ArtifactCoord, DESCRIPTOR_FILE, ModuleKey};

/// Well-known entry paths within a provider archive.
pub mod paths {
    /// Root of the bundled module tree.
    pub const MODULES_PREFIX: &str = "modules/";
    /// Extra fixed segment of the layered module tree variant.
    pub const LAYERED_INFIX: &str = "system/layers/base/";
    /// Version table mapping placeholder expressions to coordinates.
    pub const VERSION_TABLE: &str = "META-INF/artifact-versions.properties";
}

/// One scanned provider archive: a module-key index plus the archive's
/// placeholder version table. Built by a single full scan; immutable
/// afterwards. The zip handle is not kept open between operations.
#[derive(Debug)]
pub struct ProviderArchive {
    path: PathBuf,
    /// Module key → descriptor entry name, in entry order.
    modules: IndexMap<ModuleKey, String>,
    /// Placeholder expression → resolved coordinate.
    versions: FxHashMap<String, ArtifactCoord>,
}

impl ProviderArchive {
    /// Scan an archive: enumerate all entries once, indexing descriptor
    /// entries by module key and parsing the version table if present.
    pub fn scan(path: &Path) -> Result<Self, ResolveError> {
        let mut zip = open(path)?;

        let mut modules: IndexMap<ModuleKey, String> = IndexMap::new();
        let mut version_bytes: Option<String> = None;

        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|e| ResolveError::archive(path, format!("bad entry #{i}: {e}")))?;
            let name = entry.name().to_string();

            if name == paths::VERSION_TABLE {
                let mut text = String::new();
                entry
                    .read_to_string(&mut text)
                    .map_err(|e| ResolveError::archive(path, format!("unreadable {name}: {e}")))?;
                version_bytes = Some(text);
                continue;
            }

            if let Some(key) = module_key_from_entry(&name) {
                if let Some(previous) = modules.get(&key) {
                    tracing::debug!(
                        archive = %path.display(),
                        module = %key,
                        kept = previous,
                        ignored = name,
                        "duplicate descriptor entry within archive"
                    );
                } else {
                    modules.insert(key, name);
                }
            }
        }

        let versions = version_bytes
            .map(|text| parse_version_table(&text, path))
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            modules,
            versions,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, key: &ModuleKey) -> bool {
        self.modules.contains_key(key)
    }

    /// Indexed module keys, in archive entry order.
    pub fn module_keys(&self) -> impl Iterator<Item = &ModuleKey> {
        self.modules.keys()
    }

    /// Resolve a placeholder expression against this archive's version table.
    pub fn resolve_expr(&self, expr: &str) -> Option<&ArtifactCoord> {
        self.versions.get(expr)
    }

    /// Extract the descriptor bytes for an indexed module.
    pub fn read_descriptor(&self, key: &ModuleKey) -> Result<Vec<u8>, ResolveError> {
        let entry_name = self.entry_for(key)?;
        let mut zip = open(&self.path)?;
        let mut entry = zip.by_name(&entry_name).map_err(|e| {
            ResolveError::archive(&self.path, format!("missing entry {entry_name}: {e}"))
        })?;
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).map_err(|e| {
            ResolveError::archive(&self.path, format!("unreadable entry {entry_name}: {e}"))
        })?;
        Ok(bytes)
    }

    /// Extract the non-descriptor resource entries co-located with an
    /// indexed module's descriptor, as `(path relative to the module
    /// directory, bytes)` pairs in entry order.
    pub fn read_resources(
        &self,
        key: &ModuleKey,
    ) -> Result<Vec<(String, Vec<u8>)>, ResolveError> {
        let entry_name = self.entry_for(key)?;
        let dir = match entry_name.rfind('/') {
            Some(pos) => &entry_name[..=pos],
            None => "",
        };

        let mut zip = open(&self.path)?;
        let mut resources = Vec::new();
        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|e| ResolveError::archive(&self.path, format!("bad entry #{i}: {e}")))?;
            let name = entry.name().to_string();
            if !name.starts_with(dir) || name == entry_name || name.ends_with('/') {
                continue;
            }
            let rel = name[dir.len()..].to_string();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).map_err(|e| {
                ResolveError::archive(&self.path, format!("unreadable entry {name}: {e}"))
            })?;
            resources.push((rel, bytes));
        }
        Ok(resources)
    }

    fn entry_for(&self, key: &ModuleKey) -> Result<String, ResolveError> {
        self.modules.get(key).cloned().ok_or_else(|| {
            ResolveError::archive(&self.path, format!("module {key} is not indexed here"))
        })
    }
}

fn open(path: &Path) -> Result<ZipArchive<BufReader<File>>, ResolveError> {
    let file = File::open(path)?;
    ZipArchive::new(BufReader::new(file))
        .map_err(|e| ResolveError::archive(path, format!("failed to open archive: {e}")))
}

/// Derive a module key from a descriptor entry path.
///
/// Both the flat layout `modules/<name-dirs>/<slot>/module.xml` and the
/// layered variant `modules/system/layers/base/<name-dirs>/<slot>/module.xml`
/// are recognized; anything else is not a descriptor entry.
fn module_key_from_entry(entry: &str) -> Option<ModuleKey> {
    let rest = entry.strip_prefix(paths::MODULES_PREFIX)?;
    let rest = rest.strip_prefix(paths::LAYERED_INFIX).unwrap_or(rest);
    let rest = rest.strip_suffix(DESCRIPTOR_FILE)?.strip_suffix('/')?;

    let mut segments: Vec<&str> = rest.split('/').collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    let slot = segments.pop()?;
    Some(ModuleKey::new(segments.join("."), slot))
}

/// Parse `expr=group:artifact:version[:classifier]` lines. Blank lines and
/// `#` comments are skipped; malformed lines are logged and skipped, since
/// only expressions actually referenced by a placeholder matter.
fn parse_version_table(text: &str, archive: &Path) -> FxHashMap<String, ArtifactCoord> {
    let mut table = FxHashMap::default();
    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed = line
            .split_once('=')
            .and_then(|(expr, coord)| {
                let expr = expr.trim();
                if expr.is_empty() {
                    return None;
                }
                ArtifactCoord::parse(coord).ok().map(|c| (expr.to_string(), c))
            });
        match parsed {
            Some((expr, coord)) => {
                table.insert(expr, coord);
            }
            None => tracing::warn!(
                archive = %archive.display(),
                line = idx + 1,
                "ignoring bad version table line {line:?}"
            ),
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_flat_entry() {
        assert_eq!(
            module_key_from_entry("modules/org/acme/core/main/module.xml"),
            Some(ModuleKey::new("org.acme.core", "main"))
        );
    }

    #[test]
    fn test_key_from_layered_entry() {
        assert_eq!(
            module_key_from_entry("modules/system/layers/base/org/acme/core/api/module.xml"),
            Some(ModuleKey::new("org.acme.core", "api"))
        );
    }

    #[test]
    fn test_key_requires_name_and_slot_segments() {
        assert_eq!(module_key_from_entry("modules/main/module.xml"), None);
        assert_eq!(module_key_from_entry("modules/module.xml"), None);
        assert_eq!(module_key_from_entry("other/org/acme/main/module.xml"), None);
        assert_eq!(
            module_key_from_entry("modules/org/acme/main/other.xml"),
            None
        );
    }

    #[test]
    fn test_version_table_parsing() {
        let table = parse_version_table(
            "# pinned versions\n\
             org.acme:acme-core=org.acme:acme-core:1.2.3\n\
             org.acme:acme-native::linux-x86_64=org.acme:acme-native:2.0:linux-x86_64\n\
             \n\
             broken line without equals\n",
            Path::new("test.zip"),
        );
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get("org.acme:acme-core"),
            Some(&ArtifactCoord::new("org.acme", "acme-core", "1.2.3"))
        );
        assert_eq!(
            table
                .get("org.acme:acme-native::linux-x86_64")
                .and_then(|c| c.classifier.as_deref()),
            Some("linux-x86_64")
        );
    }
}
