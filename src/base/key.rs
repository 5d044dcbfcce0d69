use std::fmt;
use std::path::PathBuf;

use smol_str::SmolStr;

use super::DEFAULT_SLOT;

/// Identity of a module: a name plus a slot.
///
/// The slot distinguishes build variants of the same named module (`main`,
/// `api`, ...) and defaults to [`DEFAULT_SLOT`] when absent in source text.
/// Keys are case-sensitive and compared structurally; there is no version
/// component anywhere in module identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleKey {
    name: SmolStr,
    slot: SmolStr,
}

impl ModuleKey {
    /// Create a key from explicit name and slot.
    pub fn new(name: impl Into<SmolStr>, slot: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            slot: slot.into(),
        }
    }

    /// Create a key in the default `main` slot.
    pub fn in_default_slot(name: impl Into<SmolStr>) -> Self {
        Self::new(name, DEFAULT_SLOT)
    }

    /// Parse `name[:slot]` text; the slot defaults to `main` when omitted.
    ///
    /// Returns `None` for an empty name or an empty explicit slot.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (name, slot) = match text.split_once(':') {
            Some((name, slot)) => (name, slot),
            None => (text, DEFAULT_SLOT),
        };
        if name.is_empty() || slot.is_empty() {
            return None;
        }
        Some(Self::new(name, slot))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Relative directory for this module: dotted name segments become
    /// nested directories, the slot is the leaf directory.
    ///
    /// `org.acme.io:main` → `org/acme/io/main`.
    pub fn to_rel_path(&self) -> PathBuf {
        let mut path: PathBuf = self.name.split('.').collect();
        path.push(self.slot.as_str());
        path
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_slot() {
        let key = ModuleKey::parse("org.acme.core:api").unwrap();
        assert_eq!(key.name(), "org.acme.core");
        assert_eq!(key.slot(), "api");
    }

    #[test]
    fn test_parse_defaults_slot_to_main() {
        let key = ModuleKey::parse("org.acme.core").unwrap();
        assert_eq!(key.slot(), "main");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(ModuleKey::parse("").is_none());
        assert!(ModuleKey::parse("name:").is_none());
        assert!(ModuleKey::parse(":slot").is_none());
    }

    #[test]
    fn test_keys_compare_structurally() {
        assert_eq!(
            ModuleKey::parse("a.b:main").unwrap(),
            ModuleKey::in_default_slot("a.b")
        );
        assert_ne!(
            ModuleKey::new("a.b", "main"),
            ModuleKey::new("a.b", "api"),
            "Slot is part of identity"
        );
        assert_ne!(
            ModuleKey::in_default_slot("a.B"),
            ModuleKey::in_default_slot("a.b"),
            "Keys are case-sensitive"
        );
    }

    #[test]
    fn test_rel_path_nests_dotted_name() {
        let key = ModuleKey::new("org.acme.io", "api");
        assert_eq!(key.to_rel_path(), PathBuf::from("org/acme/io/api"));
    }
}
