use std::fmt;

use smol_str::SmolStr;
use thiserror::Error;

/// A coordinate string that could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid artifact coordinate: {0:?}")]
pub struct InvalidCoord(pub String);

/// A resolved Maven-style artifact coordinate.
///
/// Displayed and parsed as `group:artifact:version[:classifier]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactCoord {
    pub group: SmolStr,
    pub artifact: SmolStr,
    pub version: SmolStr,
    pub classifier: Option<SmolStr>,
}

impl ArtifactCoord {
    pub fn new(
        group: impl Into<SmolStr>,
        artifact: impl Into<SmolStr>,
        version: impl Into<SmolStr>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<SmolStr>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Parse `group:artifact:version[:classifier]`.
    pub fn parse(text: &str) -> Result<Self, InvalidCoord> {
        let parts: Vec<&str> = text.trim().split(':').collect();
        match parts.as_slice() {
            [g, a, v] if !g.is_empty() && !a.is_empty() && !v.is_empty() => {
                Ok(Self::new(*g, *a, *v))
            }
            [g, a, v, c] if !g.is_empty() && !a.is_empty() && !v.is_empty() && !c.is_empty() => {
                Ok(Self::new(*g, *a, *v).with_classifier(*c))
            }
            _ => Err(InvalidCoord(text.to_string())),
        }
    }
}

impl fmt::Display for ArtifactCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(c) = &self.classifier {
            write!(f, ":{c}")?;
        }
        Ok(())
    }
}

/// An artifact reference as it appears in a descriptor's `resources` section.
///
/// Either a concrete coordinate, or an unresolved `${expr}` placeholder whose
/// expression keys the owning provider archive's version table. Placeholder
/// expressions use the same `group:artifact[::classifier]` shape as version
/// table keys (the empty middle position is where the version would go).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArtifactRef {
    Coord(ArtifactCoord),
    Placeholder(SmolStr),
}

impl ArtifactRef {
    /// Parse an `artifact name="..."` attribute value.
    ///
    /// `${...}` is a placeholder; anything else must be a full coordinate.
    pub fn parse(text: &str) -> Result<Self, InvalidCoord> {
        let text = text.trim();
        if let Some(expr) = text.strip_prefix("${").and_then(|t| t.strip_suffix('}')) {
            if expr.is_empty() {
                return Err(InvalidCoord(text.to_string()));
            }
            return Ok(Self::Placeholder(expr.into()));
        }
        ArtifactCoord::parse(text).map(Self::Coord)
    }

    /// The concrete coordinate, if this reference is resolved.
    pub fn as_coord(&self) -> Option<&ArtifactCoord> {
        match self {
            Self::Coord(c) => Some(c),
            Self::Placeholder(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coord(c) => c.fmt(f),
            Self::Placeholder(expr) => write!(f, "${{{expr}}}"),
        }
    }
}
