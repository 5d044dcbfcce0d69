//! Foundation types for closure resolution.
//!
//! This module provides the identity types used throughout the crate:
//! - [`ModuleKey`] - `(name, slot)` module identity
//! - [`ArtifactCoord`] - Maven-style `group:artifact:version[:classifier]`
//! - [`ArtifactRef`] - a concrete coordinate or a `${expr}` placeholder
//!
//! This module has NO dependencies on other modfill modules.

mod artifact;
mod key;

pub use artifact::{ArtifactCoord, ArtifactRef, InvalidCoord};
pub use key::ModuleKey;

/// Default slot assumed whenever source text omits one.
pub const DEFAULT_SLOT: &str = "main";

/// Name of a module descriptor file, both on disk and inside archives.
pub const DESCRIPTOR_FILE: &str = "module.xml";
