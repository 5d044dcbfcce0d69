use std::path::Path;

use indexmap::IndexMap;

use crate::ResolveError;
use crate::base::ModuleKey;
use crate::descriptor::ModuleDescriptor;

use super::rules::Rule;

/// The sentinel key whose rules apply to every descriptor.
pub fn wildcard_key() -> ModuleKey {
    ModuleKey::new("ALL", "ALL")
}

/// A tolerated configuration problem, reported with its 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigIssue {
    pub line: usize,
    pub message: String,
}

/// Compiled rewrite rules, keyed by module.
///
/// Rules execute in file order within a module's list; the wildcard list
/// (`ALL:ALL`) always executes after module-specific rules, regardless of
/// where it appears in the configuration file.
#[derive(Clone, Debug, Default)]
pub struct RewriteRuleSet {
    pub(super) rules: IndexMap<ModuleKey, Vec<Rule>>,
    pub(super) issues: Vec<ConfigIssue>,
}

impl RewriteRuleSet {
    /// An empty rule set; rewriting with it is the identity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rules registered for a specific module key.
    pub fn rules_for(&self, key: &ModuleKey) -> &[Rule] {
        self.rules.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Configuration problems tolerated during compilation. Callers that
    /// want Maven-era log-and-continue behavior can ignore these; strict
    /// callers abort when non-empty.
    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.rules.values().all(Vec::is_empty)
    }

    /// Promote the first tolerated issue to a hard error, for callers that
    /// want configuration problems to abort the run instead of being
    /// logged and skipped.
    pub fn ensure_valid(&self, path: &Path) -> Result<(), ResolveError> {
        match self.issues.first() {
            Some(issue) => Err(ResolveError::Config {
                path: path.to_path_buf(),
                line: issue.line,
                message: issue.message.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Apply all applicable rules to a descriptor: the module-specific
    /// list first, then the wildcard list.
    pub fn apply(&self, descriptor: &mut ModuleDescriptor) {
        let key = descriptor.key().clone();
        let wildcard = wildcard_key();
        let specific = self.rules_for(&key);
        let global = if key == wildcard {
            &[]
        } else {
            self.rules_for(&wildcard)
        };

        let mut applied = 0usize;
        for rule in specific.iter().chain(global) {
            if rule.apply(descriptor) {
                applied += 1;
            }
        }
        if applied > 0 {
            tracing::debug!(module = %key, rules = applied, "rewrote descriptor");
        }
    }
}
