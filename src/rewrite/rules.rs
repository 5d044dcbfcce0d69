use smol_str::SmolStr;

use crate::base::{ArtifactCoord, ModuleKey};
use crate::descriptor::ModuleDescriptor;

/// Match pattern for resource artifacts: group, artifact and classifier
/// must be equal; the version is always ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactMatch {
    pub group: SmolStr,
    pub artifact: SmolStr,
    pub classifier: Option<SmolStr>,
}

impl ArtifactMatch {
    /// Parse `group:artifact[:classifier]`.
    pub fn parse(text: &str) -> Option<Self> {
        let parts: Vec<&str> = text.trim().split(':').collect();
        match parts.as_slice() {
            [g, a] if !g.is_empty() && !a.is_empty() => Some(Self {
                group: (*g).into(),
                artifact: (*a).into(),
                classifier: None,
            }),
            [g, a, c] if !g.is_empty() && !a.is_empty() && !c.is_empty() => Some(Self {
                group: (*g).into(),
                artifact: (*a).into(),
                classifier: Some((*c).into()),
            }),
            _ => None,
        }
    }

    pub fn matches(&self, coord: &ArtifactCoord) -> bool {
        coord.group == self.group
            && coord.artifact == self.artifact
            && coord.classifier == self.classifier
    }
}

/// One rewrite operation, applied to a descriptor in configuration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Mark the named dependency edge optional, if present.
    MakeOptional(ModuleKey),
    /// Ensure a dependency edge to the key exists; no-op if present.
    Include(ModuleKey),
    /// Mark the named dependency edge exported, if present.
    Export(ModuleKey),
    /// Retarget the matching dependency edge.
    ReplaceDependency { from: ModuleKey, to: ModuleKey },
    /// Remove matching resource artifacts outright.
    RemoveArtifact(ArtifactMatch),
    /// Substitute the version on matching resource artifacts.
    ForceVersion {
        matcher: ArtifactMatch,
        version: SmolStr,
    },
    /// Swap matching resource artifacts to a different coordinate.
    ReplaceArtifact {
        matcher: ArtifactMatch,
        replacement: ArtifactCoord,
    },
}

impl Rule {
    /// Apply this rule to a descriptor. A rule whose target section is
    /// absent is a no-op; sections are never fabricated. Returns whether
    /// anything changed.
    pub fn apply(&self, descriptor: &mut ModuleDescriptor) -> bool {
        match self {
            Self::MakeOptional(target) => descriptor.mark_dependency_optional(target),
            Self::Include(target) => descriptor.ensure_dependency(target),
            Self::Export(target) => descriptor.mark_dependency_export(target),
            Self::ReplaceDependency { from, to } => descriptor.retarget_dependency(from, to),
            Self::RemoveArtifact(matcher) => {
                descriptor.remove_artifacts_where(|c| matcher.matches(c)) > 0
            }
            Self::ForceVersion { matcher, version } => {
                descriptor.rewrite_artifacts_where(|c| {
                    matcher.matches(c).then(|| {
                        let mut c = c.clone();
                        c.version = version.clone();
                        c
                    })
                }) > 0
            }
            Self::ReplaceArtifact {
                matcher,
                replacement,
            } => {
                descriptor.rewrite_artifacts_where(|c| {
                    matcher.matches(c).then(|| replacement.clone())
                }) > 0
            }
        }
    }
}
