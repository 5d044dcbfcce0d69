//! Rule configuration compiler.
//!
//! The configuration is line-oriented. Leading and trailing whitespace is
//! trimmed per line; blank lines and `#` comments are skipped. Grammar:
//!
//! ```text
//! module: <name>[:<slot>]                        open a rule list
//! optional: <name>[:<slot>]                      mark edge optional
//! include: <name>[:<slot>]                       ensure edge exists
//! export: <name>[:<slot>]                        mark edge exported
//! replace: <name>[:<slot>]=<name>[:<slot>]       retarget edge
//! remove-artifact: <G>:<A>[:<C>]                 drop resource entries
//! force-version: <G>:<A>[:<C>]=<version>         substitute version
//! replace-artifact: <G>:<A>[:<C>]=<G>:<A>:<V>[:<C>]  swap coordinate
//! ```
//!
//! `module: ALL:ALL` opens the wildcard list applied to every descriptor
//! (always after its specific rules). A line with an unknown prefix, a
//! malformed argument, or a rule before any `module:` line is reported
//! with its 1-based line number, logged, and skipped; compilation itself
//! never aborts.

use std::path::Path;

use crate::base::{ArtifactCoord, ModuleKey};

use super::rules::{ArtifactMatch, Rule};
use super::set::{ConfigIssue, RewriteRuleSet};

/// Compile a rule set from a configuration file. `None` (the file is not
/// configured) yields the empty set.
pub fn from_path(path: Option<&Path>) -> Result<RewriteRuleSet, std::io::Error> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let set = compile(&text);
            for issue in set.issues() {
                tracing::warn!(
                    path = %path.display(),
                    line = issue.line,
                    "ignoring bad rewrite rule: {}",
                    issue.message
                );
            }
            Ok(set)
        }
        None => Ok(RewriteRuleSet::empty()),
    }
}

/// Compile a rule set from configuration text.
pub fn compile(text: &str) -> RewriteRuleSet {
    let mut set = RewriteRuleSet::empty();
    let mut current: Option<ModuleKey> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(args) = line.strip_prefix("module:") {
            match ModuleKey::parse(args) {
                Some(key) => {
                    set.rules.entry(key.clone()).or_default();
                    current = Some(key);
                }
                None => issue(&mut set, line_no, format!("bad module key {args:?}")),
            }
            continue;
        }

        let Some(rule) = parse_rule(line) else {
            issue(&mut set, line_no, format!("unrecognized rule line {line:?}"));
            continue;
        };
        match rule {
            Ok(rule) => match &current {
                Some(key) => set.rules.entry(key.clone()).or_default().push(rule),
                None => issue(
                    &mut set,
                    line_no,
                    "rule line before any module: line".to_string(),
                ),
            },
            Err(message) => issue(&mut set, line_no, message),
        }
    }

    set
}

fn issue(set: &mut RewriteRuleSet, line: usize, message: String) {
    set.issues.push(ConfigIssue { line, message });
}

/// Parse one rule line. `None` means the prefix itself is unknown;
/// `Some(Err(..))` means the prefix matched but the arguments did not.
fn parse_rule(line: &str) -> Option<Result<Rule, String>> {
    if let Some(args) = line.strip_prefix("optional:") {
        return Some(module_arg(args).map(Rule::MakeOptional));
    }
    if let Some(args) = line.strip_prefix("include:") {
        return Some(module_arg(args).map(Rule::Include));
    }
    if let Some(args) = line.strip_prefix("export:") {
        return Some(module_arg(args).map(Rule::Export));
    }
    // replace-artifact must be tried before replace
    if let Some(args) = line.strip_prefix("replace-artifact:") {
        return Some(replace_artifact_args(args));
    }
    if let Some(args) = line.strip_prefix("replace:") {
        return Some(replace_args(args));
    }
    if let Some(args) = line.strip_prefix("remove-artifact:") {
        return Some(artifact_arg(args).map(Rule::RemoveArtifact));
    }
    if let Some(args) = line.strip_prefix("force-version:") {
        return Some(force_version_args(args));
    }
    None
}

fn module_arg(args: &str) -> Result<ModuleKey, String> {
    ModuleKey::parse(args).ok_or_else(|| format!("bad module key {:?}", args.trim()))
}

fn artifact_arg(args: &str) -> Result<ArtifactMatch, String> {
    ArtifactMatch::parse(args)
        .ok_or_else(|| format!("bad artifact matcher {:?} (expected group:artifact[:classifier])", args.trim()))
}

fn split_assignment(args: &str) -> Result<(&str, &str), String> {
    args.split_once('=')
        .map(|(l, r)| (l.trim(), r.trim()))
        .ok_or_else(|| format!("expected '=' in {:?}", args.trim()))
}

fn replace_args(args: &str) -> Result<Rule, String> {
    let (from, to) = split_assignment(args)?;
    Ok(Rule::ReplaceDependency {
        from: module_arg(from)?,
        to: module_arg(to)?,
    })
}

fn force_version_args(args: &str) -> Result<Rule, String> {
    let (matcher, version) = split_assignment(args)?;
    if version.is_empty() {
        return Err("empty version".to_string());
    }
    Ok(Rule::ForceVersion {
        matcher: artifact_arg(matcher)?,
        version: version.into(),
    })
}

fn replace_artifact_args(args: &str) -> Result<Rule, String> {
    let (matcher, replacement) = split_assignment(args)?;
    Ok(Rule::ReplaceArtifact {
        matcher: artifact_arg(matcher)?,
        replacement: ArtifactCoord::parse(replacement).map_err(|e| e.to_string())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::wildcard_key;

    #[test]
    fn test_compile_module_blocks() {
        let set = compile(
            "# comment\n\
             module: org.acme.core\n\
             optional: org.acme.extras\n\
             include: org.acme.spi:api\n\
             \n\
             module: org.acme.io:api\n\
             export: org.acme.core\n",
        );
        assert!(set.issues().is_empty());
        assert_eq!(
            set.rules_for(&ModuleKey::in_default_slot("org.acme.core")),
            &[
                Rule::MakeOptional(ModuleKey::in_default_slot("org.acme.extras")),
                Rule::Include(ModuleKey::new("org.acme.spi", "api")),
            ]
        );
        assert_eq!(
            set.rules_for(&ModuleKey::new("org.acme.io", "api")).len(),
            1
        );
    }

    #[test]
    fn test_compile_artifact_rules() {
        let set = compile(
            "module: ALL:ALL\n\
             remove-artifact: org.acme:acme-docs\n\
             force-version: org.acme:acme-core=2.0\n\
             replace-artifact: org.acme:acme-old=org.acme:acme-new:3.1:jdk11\n",
        );
        assert!(set.issues().is_empty());
        let rules = set.rules_for(&wildcard_key());
        assert_eq!(rules.len(), 3);
        assert_eq!(
            rules[2],
            Rule::ReplaceArtifact {
                matcher: ArtifactMatch::parse("org.acme:acme-old").unwrap(),
                replacement: ArtifactCoord::new("org.acme", "acme-new", "3.1")
                    .with_classifier("jdk11"),
            }
        );
    }

    #[test]
    fn test_unknown_prefix_reports_line_number() {
        let set = compile("module: a\n\nfrobnicate: b\noptional: c\n");
        assert_eq!(set.issues().len(), 1);
        assert_eq!(set.issues()[0].line, 3);
        assert_eq!(set.rules_for(&ModuleKey::in_default_slot("a")).len(), 1,
            "Good lines after a bad one still compile");
    }

    #[test]
    fn test_rule_before_module_block_is_an_issue() {
        let set = compile("optional: org.acme.core\n");
        assert_eq!(set.issues().len(), 1);
        assert_eq!(set.issues()[0].line, 1);
        assert!(set.is_empty());
    }

    #[test]
    fn test_malformed_arguments_are_issues() {
        let set = compile(
            "module: a\n\
             replace: only-one-side\n\
             force-version: org.acme:x=\n\
             remove-artifact: nocolon\n",
        );
        let lines: Vec<usize> = set.issues().iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let set = compile("   module: a   \n\t optional: b \n");
        assert!(set.issues().is_empty());
        assert_eq!(set.rules_for(&ModuleKey::in_default_slot("a")).len(), 1);
    }
}
