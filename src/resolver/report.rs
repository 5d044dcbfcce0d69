//! Per-run closure report.

use std::fmt;

use crate::base::{ArtifactCoord, ModuleKey};

/// One materialized module: its key, the resolved artifact coordinates it
/// carries (none for an alias), and the payload bytes written for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportEntry {
    pub key: ModuleKey,
    pub artifacts: Vec<ArtifactCoord>,
    pub bytes: u64,
}

/// Size and membership report for one resolver run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClosureReport {
    /// Materialized modules, in materialization order.
    pub entries: Vec<ReportEntry>,
    /// Total bytes written for materialized modules.
    pub total_bytes: u64,
    /// The final available set, in discovery order.
    pub available: Vec<ModuleKey>,
    /// Fixpoint iterations that materialized at least one module.
    pub iterations: usize,
}

impl ClosureReport {
    /// Emit the report through tracing at info level.
    pub fn log(&self) {
        for entry in &self.entries {
            tracing::info!(
                module = %entry.key,
                artifacts = entry
                    .artifacts
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                bytes = entry.bytes,
                "materialized module"
            );
        }
        tracing::info!(
            modules = self.entries.len(),
            iterations = self.iterations,
            total_bytes = self.total_bytes,
            "module closure complete"
        );
    }
}

impl fmt::Display for ClosureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{} ({} bytes)", entry.key, entry.bytes)?;
            for coord in &entry.artifacts {
                write!(f, "\n    {coord}")?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "{} module(s) materialized in {} iteration(s), {} bytes total",
            self.entries.len(),
            self.iterations,
            self.total_bytes
        )
    }
}
