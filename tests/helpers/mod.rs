//! Shared fixtures: build module trees on disk and provider archives as
//! real zip files, and snapshot output trees for byte comparisons.
#![allow(dead_code)] // not every suite uses every fixture

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use modfill::ModuleKey;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Builds a provider archive zip entry by entry.
#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, path: &str, bytes: &[u8]) -> Self {
        self.entries.push((path.to_string(), bytes.to_vec()));
        self
    }

    /// Add a descriptor under the flat `modules/` layout.
    pub fn module(self, key: &str, descriptor: &str) -> Self {
        let path = format!("{}module.xml", module_entry_dir(key, false));
        self.entry(&path, descriptor.as_bytes())
    }

    /// Add a descriptor under the layered `modules/system/layers/base/` layout.
    pub fn layered_module(self, key: &str, descriptor: &str) -> Self {
        let path = format!("{}module.xml", module_entry_dir(key, true));
        self.entry(&path, descriptor.as_bytes())
    }

    /// Add a resource payload next to a module's descriptor.
    pub fn resource(self, key: &str, rel: &str, bytes: &[u8]) -> Self {
        let path = format!("{}{rel}", module_entry_dir(key, false));
        self.entry(&path, bytes)
    }

    /// Add the archive's version table.
    pub fn versions(self, table: &str) -> Self {
        self.entry("META-INF/artifact-versions.properties", table.as_bytes())
    }

    /// Write the archive to `dir/<name>` and return its path.
    pub fn write_to(self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut zip = ZipWriter::new(File::create(&path).expect("create archive"));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (entry, bytes) in self.entries {
            zip.start_file(entry, options).expect("start entry");
            zip.write_all(&bytes).expect("write entry");
        }
        zip.finish().expect("finish archive");
        path
    }
}

fn module_entry_dir(key: &str, layered: bool) -> String {
    let key = ModuleKey::parse(key).expect("valid module key");
    let name_dirs = key.name().replace('.', "/");
    if layered {
        format!("modules/system/layers/base/{name_dirs}/{}/", key.slot())
    } else {
        format!("modules/{name_dirs}/{}/", key.slot())
    }
}

/// Write a descriptor into an on-disk module tree at its key-derived path.
pub fn write_descriptor(root: &Path, key: &str, descriptor: &str) {
    let key = ModuleKey::parse(key).expect("valid module key");
    let dir = root.join(key.to_rel_path());
    std::fs::create_dir_all(&dir).expect("create module dir");
    std::fs::write(dir.join("module.xml"), descriptor).expect("write descriptor");
}

/// Snapshot a tree as relative-path → bytes, for whole-tree comparisons.
pub fn snapshot_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut tree = BTreeMap::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry.expect("walk output tree");
        if entry.file_type().is_file() {
            let rel = entry
                .path()
                .strip_prefix(root)
                .expect("entry under root")
                .to_string_lossy()
                .replace('\\', "/");
            tree.insert(rel, std::fs::read(entry.path()).expect("read file"));
        }
    }
    tree
}

/// Read one descriptor out of an output tree.
pub fn read_descriptor(root: &Path, key: &str) -> String {
    let key = ModuleKey::parse(key).expect("valid module key");
    let path = root.join(key.to_rel_path()).join("module.xml");
    String::from_utf8(std::fs::read(&path).unwrap_or_else(|e| {
        panic!("missing descriptor for {key} at {}: {e}", path.display())
    }))
    .expect("descriptor is UTF-8")
}
