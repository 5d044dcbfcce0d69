//! The closure fixpoint loop.
//!
//! State machine over `{Scanning, Resolving, Materializing, Done, Failed}`:
//!
//! ```text
//! Scanning ──▶ Resolving ──▶ Materializing
//!                 │  ▲              │
//!                 │  └──────────────┘
//!                 ▼
//!               Done            (any error ▶ Failed)
//! ```
//!
//! Scanning walks the unit's own module tree and seeds `available` and
//! `required`. Each Resolving pass computes `missing = required −
//! available − platform`; Materializing pulls every missing module out of
//! its owning provider archive, which may in turn grow `required`. Both
//! sets only ever grow, so the loop terminates: either `missing` empties
//! (fixpoint) or an iteration fails.

use std::mem;
use std::path::Path;

use indexmap::IndexSet;
use walkdir::WalkDir;

use crate::ResolveError;
use crate::base::{DESCRIPTOR_FILE, ModuleKey};
use crate::descriptor::Descriptor;

use super::context::ResolveContext;
use super::materialize::place;
use super::report::{ClosureReport, ReportEntry};

/// Resolve a unit's module closure to completion.
///
/// Convenience wrapper over [`ClosureResolver::run`].
pub fn resolve(ctx: ResolveContext) -> Result<ClosureReport, ResolveError> {
    ClosureResolver::new(ctx).run()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Scanning,
    Resolving,
    Materializing,
    Done,
    Failed,
}

/// One run of the closure algorithm.
///
/// Single-threaded and synchronous by design: each iteration's missing-set
/// computation depends on the full result of the previous one, so the loop
/// must serialize around `required`/`available`. All state is owned here
/// and dropped with the resolver; nothing persists across runs.
pub struct ClosureResolver {
    ctx: ResolveContext,
    required: IndexSet<ModuleKey>,
    available: IndexSet<ModuleKey>,
    materialized: IndexSet<ModuleKey>,
    entries: Vec<ReportEntry>,
    total_bytes: u64,
    iterations: usize,
    phase: Phase,
}

impl ClosureResolver {
    pub fn new(ctx: ResolveContext) -> Self {
        Self {
            ctx,
            required: IndexSet::new(),
            available: IndexSet::new(),
            materialized: IndexSet::new(),
            entries: Vec::new(),
            total_bytes: 0,
            iterations: 0,
            phase: Phase::Scanning,
        }
    }

    /// Drive the state machine to `Done` or `Failed`.
    pub fn run(mut self) -> Result<ClosureReport, ResolveError> {
        match self.drive() {
            Ok(report) => {
                report.log();
                Ok(report)
            }
            Err(e) => {
                self.enter(Phase::Failed);
                Err(e)
            }
        }
    }

    fn drive(&mut self) -> Result<ClosureReport, ResolveError> {
        self.scan()?;

        loop {
            self.enter(Phase::Resolving);
            let missing = self.missing();
            if missing.is_empty() {
                break;
            }

            // Every missing key must be supplied by some archive before
            // any materialization starts; a gap is a build-configuration
            // defect, not something to retry or paper over.
            let mut supplying = IndexSet::new();
            for key in &missing {
                match self.ctx.providers.archive_for(key) {
                    Some(archive) => {
                        supplying.insert(archive.path().to_path_buf());
                    }
                    None => return Err(ResolveError::UnresolvedModule(key.clone())),
                }
            }
            if supplying.is_empty() {
                return Err(ResolveError::Stuck { missing });
            }

            self.enter(Phase::Materializing);
            self.iterations += 1;
            tracing::debug!(
                iteration = self.iterations,
                missing = missing.len(),
                archives = supplying.len(),
                "materializing missing modules"
            );
            for key in &missing {
                self.materialize(key)?;
            }
        }

        self.enter(Phase::Done);
        tracing::debug!(
            available = self.available.len(),
            materialized = self.materialized.len(),
            "fixpoint reached"
        );
        Ok(ClosureReport {
            entries: mem::take(&mut self.entries),
            total_bytes: self.total_bytes,
            available: self.available.iter().cloned().collect(),
            iterations: self.iterations,
        })
    }

    /// Walk the unit's own module tree (plus any previously-filled output
    /// tree), parse every descriptor, rewrite it, and seed the sets.
    fn scan(&mut self) -> Result<(), ResolveError> {
        self.enter(Phase::Scanning);
        if !self.ctx.module_root.is_dir() {
            return Err(ResolveError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!(
                    "module tree root not found: {}",
                    self.ctx.module_root.display()
                ),
            )));
        }

        let mut roots = vec![self.ctx.module_root.clone()];
        if self.ctx.output_root != self.ctx.module_root && self.ctx.output_root.is_dir() {
            roots.push(self.ctx.output_root.clone());
        }

        for root in roots {
            // sort_by_file_name keeps discovery order independent of the
            // filesystem's directory enumeration order
            for entry in WalkDir::new(&root).sort_by_file_name() {
                let entry = entry.map_err(|e| ResolveError::Io(e.into()))?;
                if entry.file_type().is_file()
                    && entry.file_name().to_str() == Some(DESCRIPTOR_FILE)
                {
                    self.scan_descriptor(entry.path())?;
                }
            }
        }

        tracing::debug!(
            available = self.available.len(),
            required = self.required.len(),
            "scanned unit module tree"
        );
        Ok(())
    }

    fn scan_descriptor(&mut self, path: &Path) -> Result<(), ResolveError> {
        let bytes = std::fs::read(path)?;
        let mut desc = Descriptor::parse(&bytes)
            .map_err(|e| ResolveError::descriptor(path.display().to_string(), e.to_string()))?;

        if self.available.contains(desc.key()) {
            // The unit's declared tree wins over previously-filled copies.
            tracing::debug!(module = %desc.key(), path = %path.display(), "skipping duplicate descriptor");
            return Ok(());
        }

        if let Some(module) = desc.as_module_mut() {
            self.ctx.rules.apply(module);
        }

        let out = desc
            .to_bytes()
            .map_err(|e| ResolveError::descriptor(path.display().to_string(), e.to_string()))?;
        if path.starts_with(&self.ctx.output_root) {
            std::fs::write(path, &out)?;
        } else {
            place(&self.ctx.output_root, desc.key(), DESCRIPTOR_FILE, &out)?;
        }

        self.available.insert(desc.key().clone());
        self.required.extend(desc.requirements());
        Ok(())
    }

    /// Pull one missing module out of its owning archive: substitute
    /// placeholders, rewrite, copy payloads, write the descriptor, and
    /// grow the sets.
    fn materialize(&mut self, key: &ModuleKey) -> Result<(), ResolveError> {
        let Some(archive) = self.ctx.providers.archive_for(key) else {
            // archive_for succeeded for this key during Resolving;
            // disagreeing now is an accounting bug
            return Err(ResolveError::Stuck {
                missing: vec![key.clone()],
            });
        };
        let source = format!("{}!{}", archive.path().display(), key);

        let bytes = archive.read_descriptor(key)?;
        let mut desc = Descriptor::parse(&bytes)
            .map_err(|e| ResolveError::descriptor(&source, e.to_string()))?;

        if let Some(module) = desc.as_module_mut() {
            module
                .substitute_placeholders(|expr| archive.resolve_expr(expr).cloned())
                .map_err(|expr| ResolveError::UnresolvedArtifact {
                    expr: expr.to_string(),
                    archive: archive.path().to_path_buf(),
                })?;
            self.ctx.rules.apply(module);
        }

        let mut written = 0u64;
        for (rel, data) in archive.read_resources(key)? {
            written += place(&self.ctx.output_root, key, &rel, &data)?;
        }
        let out = desc
            .to_bytes()
            .map_err(|e| ResolveError::descriptor(&source, e.to_string()))?;
        written += place(&self.ctx.output_root, key, DESCRIPTOR_FILE, &out)?;

        tracing::debug!(
            module = %key,
            archive = %archive.path().display(),
            bytes = written,
            "materialized module"
        );

        let artifacts = match &desc {
            Descriptor::Module(m) => m.resolved_coords(),
            Descriptor::Alias(_) => Vec::new(),
        };
        self.available.insert(key.clone());
        self.materialized.insert(key.clone());
        self.required.extend(desc.requirements());
        self.total_bytes += written;
        self.entries.push(ReportEntry {
            key: key.clone(),
            artifacts,
            bytes: written,
        });
        Ok(())
    }

    /// `required − available`, minus platform-namespace modules, in
    /// requirement discovery order.
    fn missing(&self) -> Vec<ModuleKey> {
        self.required
            .iter()
            .filter(|key| !self.available.contains(*key) && !self.ctx.is_platform(key))
            .cloned()
            .collect()
    }

    fn enter(&mut self, phase: Phase) {
        tracing::trace!(from = ?self.phase, to = ?phase, "phase transition");
        self.phase = phase;
    }
}
