//! Typed descriptor model.
//!
//! [`Descriptor`] discriminates the two descriptor kinds by their root
//! element: a full `module` or a `module-alias` redirect. Both are typed
//! views over a preserved [`RawDocument`]; every read accessor navigates
//! the tree and every mutation edits it in place, so content the model
//! does not understand survives a read-modify-write cycle untouched.

use smol_str::SmolStr;

use crate::base::{ArtifactCoord, ArtifactRef, DEFAULT_SLOT, ModuleKey};

use super::codec::{self, RawDocument};
use super::error::DescriptorError;
use super::tree::XmlNode;

/// Well-known element and attribute names of the descriptor format.
pub mod names {
    pub const MODULE: &str = "module";
    pub const MODULE_ALIAS: &str = "module-alias";
    pub const RESOURCES: &str = "resources";
    pub const DEPENDENCIES: &str = "dependencies";
    pub const ARTIFACT: &str = "artifact";
    pub const SYSTEM: &str = "system";
    pub const NAME: &str = "name";
    pub const SLOT: &str = "slot";
    pub const TARGET_NAME: &str = "target-name";
    pub const TARGET_SLOT: &str = "target-slot";
    pub const OPTIONAL: &str = "optional";
    pub const EXPORT: &str = "export";
    pub const SERVICES: &str = "services";
}

/// Services handling declared on a dependency edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ServicesMode {
    #[default]
    None,
    Import,
    Export,
}

/// Read view of one `dependencies > module` edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyEdge {
    pub target: ModuleKey,
    pub optional: bool,
    pub export: bool,
    pub services: ServicesMode,
}

/// Read view of the optional `dependencies > system` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemDependency {
    pub export: bool,
}

/// A parsed descriptor of either kind.
#[derive(Clone, Debug)]
pub enum Descriptor {
    Module(ModuleDescriptor),
    Alias(ModuleAlias),
}

impl Descriptor {
    /// Parse descriptor bytes, discriminating on the root element.
    ///
    /// Malformed input is a fatal error; there is no partial recovery.
    pub fn parse(input: &[u8]) -> Result<Self, DescriptorError> {
        let doc = codec::parse_document(input)?;
        match doc.root.name.as_str() {
            names::MODULE => ModuleDescriptor::from_document(doc).map(Self::Module),
            names::MODULE_ALIAS => ModuleAlias::from_document(doc).map(Self::Alias),
            other => Err(DescriptorError::UnexpectedRoot(other.to_string())),
        }
    }

    pub fn key(&self) -> &ModuleKey {
        match self {
            Self::Module(m) => m.key(),
            Self::Alias(a) => a.key(),
        }
    }

    /// Module keys this descriptor requires: the non-optional dependency
    /// targets of a module, or the sole redirect target of an alias. An
    /// alias contributes no resources of its own.
    pub fn requirements(&self) -> Vec<ModuleKey> {
        match self {
            Self::Module(m) => m
                .dependencies()
                .into_iter()
                .filter(|d| !d.optional)
                .map(|d| d.target)
                .collect(),
            Self::Alias(a) => vec![a.target().clone()],
        }
    }

    /// Serialize back to bytes, the structural inverse of [`Self::parse`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, DescriptorError> {
        match self {
            Self::Module(m) => m.to_bytes(),
            Self::Alias(a) => codec::write_document(&a.doc),
        }
    }

    pub fn as_module_mut(&mut self) -> Option<&mut ModuleDescriptor> {
        match self {
            Self::Module(m) => Some(m),
            Self::Alias(_) => None,
        }
    }
}

// ============================================================================
// MODULE DESCRIPTOR
// ============================================================================

/// A full module descriptor: identity, resource artifacts, dependency edges.
#[derive(Clone, Debug)]
pub struct ModuleDescriptor {
    key: ModuleKey,
    doc: RawDocument,
}

impl ModuleDescriptor {
    fn from_document(doc: RawDocument) -> Result<Self, DescriptorError> {
        let name = doc
            .root
            .attr(names::NAME)
            .ok_or(DescriptorError::missing_attribute(names::MODULE, names::NAME))?;
        let slot = doc.root.attr(names::SLOT).unwrap_or(DEFAULT_SLOT);
        let key = ModuleKey::new(name, slot);

        let descriptor = Self { key, doc };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Reject structurally broken sections up front so the accessors and
    /// mutators below can stay infallible.
    fn validate(&self) -> Result<(), DescriptorError> {
        if let Some(deps) = self.doc.root.find_child(names::DEPENDENCIES) {
            for edge in deps.child_elements().filter(|e| e.name == names::MODULE) {
                edge.attr(names::NAME)
                    .ok_or(DescriptorError::missing_attribute(names::MODULE, names::NAME))?;
                if let Some(services) = edge.attr(names::SERVICES) {
                    parse_services(services)?;
                }
            }
        }
        if let Some(resources) = self.doc.root.find_child(names::RESOURCES) {
            for artifact in resources.child_elements().filter(|e| e.name == names::ARTIFACT) {
                let name = artifact.attr(names::NAME).ok_or(
                    DescriptorError::missing_attribute(names::ARTIFACT, names::NAME),
                )?;
                ArtifactRef::parse(name)?;
            }
        }
        Ok(())
    }

    pub fn key(&self) -> &ModuleKey {
        &self.key
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DescriptorError> {
        codec::write_document(&self.doc)
    }

    // ── Read views ──────────────────────────────────────────────────

    /// All declared dependency edges, in document order.
    pub fn dependencies(&self) -> Vec<DependencyEdge> {
        let Some(deps) = self.doc.root.find_child(names::DEPENDENCIES) else {
            return Vec::new();
        };
        deps.child_elements()
            .filter(|e| e.name == names::MODULE)
            .map(|e| DependencyEdge {
                target: edge_target(e),
                optional: bool_attr(e, names::OPTIONAL),
                export: bool_attr(e, names::EXPORT),
                services: e
                    .attr(names::SERVICES)
                    .and_then(|s| parse_services(s).ok())
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// The special dependency onto the host's own classpath, if declared.
    pub fn system_dependency(&self) -> Option<SystemDependency> {
        let deps = self.doc.root.find_child(names::DEPENDENCIES)?;
        deps.child_elements()
            .find(|e| e.name == names::SYSTEM)
            .map(|e| SystemDependency {
                export: bool_attr(e, names::EXPORT),
            })
    }

    /// All resource artifact references, in document order.
    pub fn artifacts(&self) -> Vec<ArtifactRef> {
        let Some(resources) = self.doc.root.find_child(names::RESOURCES) else {
            return Vec::new();
        };
        resources
            .child_elements()
            .filter(|e| e.name == names::ARTIFACT)
            .filter_map(|e| e.attr(names::NAME))
            .filter_map(|name| ArtifactRef::parse(name).ok())
            .collect()
    }

    /// Concrete coordinates among the resource references.
    pub fn resolved_coords(&self) -> Vec<ArtifactCoord> {
        self.artifacts()
            .into_iter()
            .filter_map(|r| r.as_coord().cloned())
            .collect()
    }

    // ── Mutations (defined rewrite operations only) ─────────────────

    /// Mark the edge to `target` optional. Returns whether an edge matched.
    pub fn mark_dependency_optional(&mut self, target: &ModuleKey) -> bool {
        self.update_edge(target, |e| e.set_attr(names::OPTIONAL, "true"))
    }

    /// Mark the edge to `target` exported. Returns whether an edge matched.
    pub fn mark_dependency_export(&mut self, target: &ModuleKey) -> bool {
        self.update_edge(target, |e| e.set_attr(names::EXPORT, "true"))
    }

    /// Ensure an edge to `target` exists. Returns `true` if one was added,
    /// `false` if it already existed or the descriptor has no
    /// `dependencies` section (the section is never fabricated).
    pub fn ensure_dependency(&mut self, target: &ModuleKey) -> bool {
        let has_edge = self
            .dependencies()
            .iter()
            .any(|d| &d.target == target);
        if has_edge {
            return false;
        }
        let Some(deps) = self.doc.root.find_child_mut(names::DEPENDENCIES) else {
            return false;
        };
        let mut node = XmlNode::new(names::MODULE).with_attr(names::NAME, target.name());
        if target.slot() != DEFAULT_SLOT {
            node.set_attr(names::SLOT, target.slot());
        }
        deps.append_element(node);
        true
    }

    /// Retarget the edge `from` to point at `to`. Returns whether an edge
    /// matched.
    pub fn retarget_dependency(&mut self, from: &ModuleKey, to: &ModuleKey) -> bool {
        let to = to.clone();
        self.update_edge(from, move |e| {
            e.set_attr(names::NAME, to.name());
            if to.slot() == DEFAULT_SLOT {
                e.remove_attr(names::SLOT);
            } else {
                e.set_attr(names::SLOT, to.slot());
            }
        })
    }

    /// Remove every resource artifact whose concrete coordinate matches the
    /// predicate. Placeholder references are never matched. Returns the
    /// number of entries removed.
    pub fn remove_artifacts_where(
        &mut self,
        mut matches: impl FnMut(&ArtifactCoord) -> bool,
    ) -> usize {
        let Some(resources) = self.doc.root.find_child_mut(names::RESOURCES) else {
            return 0;
        };
        resources.retain_elements(|e| {
            if e.name != names::ARTIFACT {
                return true;
            }
            match e.attr(names::NAME).map(ArtifactRef::parse) {
                Some(Ok(ArtifactRef::Coord(coord))) => !matches(&coord),
                _ => true,
            }
        })
    }

    /// Rewrite resource artifacts in place: the callback returns the new
    /// coordinate for entries it wants to change. Placeholder references
    /// are not offered. Returns the number of entries rewritten.
    pub fn rewrite_artifacts_where(
        &mut self,
        mut rewrite: impl FnMut(&ArtifactCoord) -> Option<ArtifactCoord>,
    ) -> usize {
        let Some(resources) = self.doc.root.find_child_mut(names::RESOURCES) else {
            return 0;
        };
        let mut changed = 0;
        for entry in resources
            .child_elements_mut()
            .filter(|e| e.name == names::ARTIFACT)
        {
            let Some(Ok(ArtifactRef::Coord(coord))) = entry.attr(names::NAME).map(ArtifactRef::parse)
            else {
                continue;
            };
            if let Some(replacement) = rewrite(&coord) {
                entry.set_attr(names::NAME, replacement.to_string());
                changed += 1;
            }
        }
        changed
    }

    /// Substitute every `${expr}` placeholder through the given version
    /// table lookup. Fails with the offending expression if any placeholder
    /// has no entry. Returns the number of substitutions performed.
    pub fn substitute_placeholders(
        &mut self,
        resolve: impl Fn(&str) -> Option<ArtifactCoord>,
    ) -> Result<usize, SmolStr> {
        let Some(resources) = self.doc.root.find_child_mut(names::RESOURCES) else {
            return Ok(0);
        };
        let mut substituted = 0;
        for entry in resources
            .child_elements_mut()
            .filter(|e| e.name == names::ARTIFACT)
        {
            let Some(Ok(ArtifactRef::Placeholder(expr))) =
                entry.attr(names::NAME).map(ArtifactRef::parse)
            else {
                continue;
            };
            match resolve(&expr) {
                Some(coord) => {
                    entry.set_attr(names::NAME, coord.to_string());
                    substituted += 1;
                }
                None => return Err(expr),
            }
        }
        Ok(substituted)
    }

    fn update_edge(&mut self, target: &ModuleKey, update: impl FnOnce(&mut XmlNode)) -> bool {
        let Some(deps) = self.doc.root.find_child_mut(names::DEPENDENCIES) else {
            return false;
        };
        let edge = deps
            .child_elements_mut()
            .filter(|e| e.name == names::MODULE)
            .find(|e| &edge_target(e) == target);
        match edge {
            Some(e) => {
                update(e);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// MODULE ALIAS
// ============================================================================

/// A redirect descriptor: `key` is nothing but another name for `target`.
#[derive(Clone, Debug)]
pub struct ModuleAlias {
    key: ModuleKey,
    target: ModuleKey,
    doc: RawDocument,
}

impl ModuleAlias {
    fn from_document(doc: RawDocument) -> Result<Self, DescriptorError> {
        let name = doc.root.attr(names::NAME).ok_or(
            DescriptorError::missing_attribute(names::MODULE_ALIAS, names::NAME),
        )?;
        let slot = doc.root.attr(names::SLOT).unwrap_or(DEFAULT_SLOT);
        let target_name = doc.root.attr(names::TARGET_NAME).ok_or(
            DescriptorError::missing_attribute(names::MODULE_ALIAS, names::TARGET_NAME),
        )?;
        let target_slot = doc.root.attr(names::TARGET_SLOT).unwrap_or(DEFAULT_SLOT);

        Ok(Self {
            key: ModuleKey::new(name, slot),
            target: ModuleKey::new(target_name, target_slot),
            doc,
        })
    }

    pub fn key(&self) -> &ModuleKey {
        &self.key
    }

    pub fn target(&self) -> &ModuleKey {
        &self.target
    }
}

fn edge_target(e: &XmlNode) -> ModuleKey {
    ModuleKey::new(
        e.attr(names::NAME).unwrap_or_default(),
        e.attr(names::SLOT).unwrap_or(DEFAULT_SLOT),
    )
}

fn bool_attr(e: &XmlNode, name: &str) -> bool {
    e.attr(name) == Some("true")
}

fn parse_services(text: &str) -> Result<ServicesMode, DescriptorError> {
    match text {
        "none" => Ok(ServicesMode::None),
        "import" => Ok(ServicesMode::Import),
        "export" => Ok(ServicesMode::Export),
        other => Err(DescriptorError::xml(format!(
            "invalid services mode {other:?} (expected none, import or export)"
        ))),
    }
}
