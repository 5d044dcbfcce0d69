//! # modfill
//!
//! Module dependency closure resolver for modular runtime units.
//!
//! A unit declares a tree of module descriptors (`module.xml` files in the
//! JBoss-Modules layout). Those descriptors reference other modules the unit
//! does not carry itself. `modfill` computes the transitive closure of
//! non-optional module dependencies, pulls every required-but-missing module
//! out of a set of provider archives, patches each materialized descriptor
//! through a small rewrite-rule language, and iterates until the required
//! set is fully satisfied or resolution is provably impossible.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! resolver    → ResolveContext, fixpoint loop, materializer, report
//!   ↓
//! provider    → archive scan, version tables, ProviderIndex
//!   ↓
//! rewrite     → rule language: config compiler + apply engine
//!   ↓
//! descriptor  → module descriptor model + round-trip XML codec
//!   ↓
//! base        → primitives (ModuleKey, ArtifactCoord, placeholders)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use modfill::resolver::{ResolveContext, resolve};
//!
//! let ctx = ResolveContext::new("unit/modules", "out/modules")
//!     .with_providers(&provider_paths)?
//!     .with_rules_file(Some("module-rewrite.conf".as_ref()))?;
//! let report = resolve(ctx)?;
//! tracing::info!("materialized {} modules", report.entries.len());
//! ```

// ============================================================================
// MODULES (dependency order: base → descriptor → rewrite → provider → resolver)
// ============================================================================

/// Foundation types: ModuleKey, ArtifactCoord, placeholder expressions
pub mod base;

/// Module descriptor model and round-trip preserving XML codec
pub mod descriptor;

/// Rewrite rules: line-oriented config compiler and apply engine
pub mod rewrite;

/// Provider archives: zip scanning, version tables, key lookup
pub mod provider;

/// Closure resolution: context, fixpoint loop, materialization, report
pub mod resolver;

mod error;

pub use error::ResolveError;

// Re-export foundation types
pub use base::{ArtifactCoord, ArtifactRef, ModuleKey};
