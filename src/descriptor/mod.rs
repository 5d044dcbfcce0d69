//! Module descriptor model and codec.
//!
//! A descriptor is the serialized metadata file describing one module:
//! its identity, resource artifacts, and dependency edges. This module
//! provides:
//!
//! - [`Descriptor`] / [`ModuleDescriptor`] / [`ModuleAlias`] - the typed
//!   model, discriminated on the root element kind
//! - parse/serialize via quick-xml with lossless preservation of any
//!   structure the model does not expose (foreign attributes, nested
//!   elements, comments, whitespace)
//!
//! The preservation guarantee is structural: a descriptor obtained via
//! [`Descriptor::parse`] and modified only through the defined mutation
//! operations serializes with every untouched subtree byte-identical to
//! its input form.

mod codec;
mod error;
mod model;
mod tree;

pub use error::DescriptorError;
pub use model::{
    Descriptor, DependencyEdge, ModuleAlias, ModuleDescriptor, ServicesMode, SystemDependency,
    names,
};
pub use tree::{XmlContent, XmlNode};
