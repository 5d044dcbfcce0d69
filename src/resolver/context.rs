use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use crate::ResolveError;
use crate::base::ModuleKey;
use crate::provider::ProviderIndex;
use crate::rewrite::{self, RewriteRuleSet};

/// Platform-namespace exclusion.
///
/// Modules in these namespaces belong to the host runtime: they are
/// assumed always available and never treated as missing, so they never
/// trigger materialization.
pub mod platform {
    /// Host-runtime built-in namespaces.
    pub const DEFAULT_PREFIXES: &[&str] = &["java.", "javax.", "jdk.", "sun."];
}

/// Everything one resolver run needs, built fresh per invocation.
///
/// There is no process-wide registry anywhere in this crate; all state
/// flows through this context, which is what makes two runs over the same
/// inputs reproducible.
#[derive(Debug)]
pub struct ResolveContext {
    pub(super) module_root: PathBuf,
    pub(super) output_root: PathBuf,
    pub(super) rules: RewriteRuleSet,
    pub(super) providers: ProviderIndex,
    pub(super) platform_prefixes: Vec<SmolStr>,
}

impl ResolveContext {
    /// Create a context for a unit whose declared module tree lives under
    /// `module_root`, materializing into `output_root`. The two may be the
    /// same directory.
    pub fn new(module_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            module_root: module_root.into(),
            output_root: output_root.into(),
            rules: RewriteRuleSet::empty(),
            providers: ProviderIndex::empty(),
            platform_prefixes: platform::DEFAULT_PREFIXES
                .iter()
                .map(|p| SmolStr::from(*p))
                .collect(),
        }
    }

    /// Scan the candidate provider archives, in load order.
    pub fn with_providers(mut self, archive_paths: &[PathBuf]) -> Result<Self, ResolveError> {
        self.providers = ProviderIndex::scan(archive_paths)?;
        Ok(self)
    }

    /// Use an already-built provider index.
    pub fn with_provider_index(mut self, providers: ProviderIndex) -> Self {
        self.providers = providers;
        self
    }

    /// Compile rewrite rules from a configuration file; `None` means no
    /// rules are configured.
    pub fn with_rules_file(mut self, path: Option<&Path>) -> Result<Self, ResolveError> {
        self.rules = rewrite::from_path(path)?;
        Ok(self)
    }

    /// Use an already-compiled rule set.
    pub fn with_rules(mut self, rules: RewriteRuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the platform-namespace exclusion list.
    pub fn with_platform_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.platform_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub(super) fn is_platform(&self, key: &ModuleKey) -> bool {
        self.platform_prefixes
            .iter()
            .any(|prefix| key.name().starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_platform_prefixes() {
        let ctx = ResolveContext::new("in", "out");
        assert!(ctx.is_platform(&ModuleKey::in_default_slot("java.logging")));
        assert!(ctx.is_platform(&ModuleKey::in_default_slot("jdk.unsupported")));
        assert!(!ctx.is_platform(&ModuleKey::in_default_slot("org.acme.core")));
    }

    #[test]
    fn test_custom_platform_prefixes_replace_defaults() {
        let ctx = ResolveContext::new("in", "out").with_platform_prefixes(["org.host."]);
        assert!(ctx.is_platform(&ModuleKey::in_default_slot("org.host.runtime")));
        assert!(!ctx.is_platform(&ModuleKey::in_default_slot("java.logging")));
    }
}
