//! Error type for descriptor parsing and serialization.

use thiserror::Error;

use crate::base::InvalidCoord;

/// Errors from the descriptor codec and the typed mutation API.
///
/// Malformed input is fatal; the codec never attempts partial recovery.
/// Callers that know where the bytes came from wrap this in
/// [`crate::ResolveError::Descriptor`] with the source path attached.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// XML is not well-formed or uses a construct the codec rejects.
    #[error("XML error: {0}")]
    Xml(String),

    /// The root element is neither `module` nor `module-alias`.
    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),

    /// A required attribute is absent.
    #[error("missing required attribute {name:?} on <{element}>")]
    MissingAttribute { element: &'static str, name: &'static str },

    /// An artifact name attribute is neither a coordinate nor a placeholder.
    #[error(transparent)]
    Coord(#[from] InvalidCoord),
}

impl DescriptorError {
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    pub fn missing_attribute(element: &'static str, name: &'static str) -> Self {
        Self::MissingAttribute { element, name }
    }
}
