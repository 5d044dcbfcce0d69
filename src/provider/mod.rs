//! Provider archives.
//!
//! A provider archive is a zip that bundles complete modules: descriptor
//! entries in the `modules/` tree (flat or layered layout), the resource
//! payloads next to them, and optionally a version table that resolves
//! `${expr}` artifact placeholders used by the bundled descriptors.
//!
//! [`ProviderArchive::scan`] enumerates an archive's entries exactly once
//! and builds the per-archive index; [`ProviderIndex`] combines many
//! archives into a single key lookup with a deterministic load-order
//! tie-break. Zip handles are scoped to one scan or one extraction and
//! closed on every exit path.

mod archive;
mod index;

pub use archive::{ProviderArchive, paths};
pub use index::ProviderIndex;
