//! Per-module rewrite rules.
//!
//! Materialized descriptors rarely fit the target unit as-is: an edge must
//! become optional, a bundled artifact must be dropped or pinned, a
//! dependency must be retargeted at the unit's own variant of a module.
//! This module compiles a small line-oriented rule language into a
//! [`RewriteRuleSet`] and applies it to descriptors.
//!
//! Ordering contract: a descriptor's module-specific rules run first, in
//! file order; the `ALL:ALL` wildcard list runs after them. A rule whose
//! target section is absent from the descriptor is a no-op.

mod config;
mod rules;
mod set;

pub use config::{compile, from_path};
pub use rules::{ArtifactMatch, Rule};
pub use set::{ConfigIssue, RewriteRuleSet, wildcard_key};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ModuleKey;
    use crate::descriptor::{Descriptor, ModuleDescriptor};

    fn descriptor() -> ModuleDescriptor {
        let input = br#"<module name="org.acme.web">
    <resources>
        <artifact name="org.acme:acme-web:1.0"/>
    </resources>
    <dependencies>
        <module name="org.acme.core"/>
    </dependencies>
</module>
"#;
        match Descriptor::parse(input).unwrap() {
            Descriptor::Module(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_specific_rules_run_before_wildcard() {
        // The specific rule flips the edge optional, the wildcard rule
        // exports it; both effects must land on the same edge.
        let set = compile(
            "module: ALL:ALL\n\
             export: org.acme.core\n\
             module: org.acme.web\n\
             optional: org.acme.core\n",
        );
        let mut d = descriptor();
        set.apply(&mut d);

        let deps = d.dependencies();
        assert!(deps[0].optional, "Specific rule applied");
        assert!(deps[0].export, "Wildcard rule applied after it");
    }

    #[test]
    fn test_wildcard_applies_to_unlisted_modules() {
        let set = compile("module: ALL:ALL\nremove-artifact: org.acme:acme-web\n");
        let mut d = descriptor();
        set.apply(&mut d);
        assert!(d.artifacts().is_empty());
    }

    #[test]
    fn test_rules_for_other_modules_do_not_apply() {
        let set = compile("module: org.acme.other\noptional: org.acme.core\n");
        let mut d = descriptor();
        set.apply(&mut d);
        assert!(!d.dependencies()[0].optional);
    }

    #[test]
    fn test_missing_section_is_noop() {
        let set = compile("module: bare\ninclude: org.acme.core\nremove-artifact: g:a\n");
        let mut d = match Descriptor::parse(b"<module name=\"bare\"/>").unwrap() {
            Descriptor::Module(m) => m,
            _ => unreachable!(),
        };
        set.apply(&mut d);
        assert_eq!(
            d.to_bytes().unwrap().as_slice(),
            b"<module name=\"bare\"/>".as_slice(),
            "No section may be fabricated"
        );
    }

    #[test]
    fn test_include_then_retarget_in_file_order() {
        let set = compile(
            "module: org.acme.web\n\
             include: org.acme.logging\n\
             replace: org.acme.logging=org.acme.logging:slim\n",
        );
        let mut d = descriptor();
        set.apply(&mut d);
        assert!(
            d.dependencies()
                .iter()
                .any(|e| e.target == ModuleKey::new("org.acme.logging", "slim"))
        );
    }
}
