//! Key-set rules

use super::{Rule, RuleContext};
use crate::diagnostics::Diagnostic;

/// Every hook past the first sharing a key identifier is reported against
/// the first one. Hooks lacking concept or source are left to HOOK-001.
pub(super) fn unique_key_identifiers(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (key, refs) in &ctx.key_index {
        let Some((first, rest)) = refs.split_first() else {
            continue;
        };
        if first.hook.concept.is_empty() || first.hook.source.is_empty() {
            continue;
        }
        for r in rest {
            diagnostics.push(rule.emit(
                format!(
                    "Key identifier '{key}' of hook '{}' at {} collides with hook '{}' at {}",
                    r.hook.name,
                    r.path(),
                    first.hook.name,
                    first.path()
                ),
                r.path(),
                "Add a qualifier or tenant to one of the hooks so each derives a distinct key",
            ));
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use crate::model::{Frame, FrameSource, Hook, HookRole};
    use crate::rules::tests_support::{manifest, run};

    #[test]
    fn test_collision_across_frames_cites_both_hooks() {
        let m = manifest().with_frame(
            Frame::new("frame.account", FrameSource::relation("psa.account"))
                .with_hook(Hook::new("_hk__customer", HookRole::Primary, "customer", "CRM", "account_owner")),
        );
        let d = run(&m, "KEYSET-001");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].path, "frames[1].hooks[0]");
        assert!(d[0].message.contains("CUSTOMER@CRM"));
        assert!(d[0].message.contains("frames[0].hooks[0]"));
        assert!(d[0].message.contains("frames[1].hooks[0]"));
    }

    #[test]
    fn test_qualifier_and_tenant_disambiguate() {
        let m = manifest().with_frame(
            Frame::new("frame.account", FrameSource::relation("psa.account"))
                .with_hook(
                    Hook::new("_hk__customer__owner", HookRole::Primary, "customer", "CRM", "owner_id")
                        .with_qualifier("owner"),
                )
                .with_hook(
                    Hook::new("_hk__customer", HookRole::Foreign, "customer", "CRM", "eu_customer_id")
                        .with_tenant("EU"),
                ),
        );
        assert!(run(&m, "KEYSET-001").is_empty());
    }

    #[test]
    fn test_three_way_collision_reports_each_later_hook() {
        let hook = Hook::new("_hk__customer", HookRole::Primary, "customer", "CRM", "customer_id");
        let m = manifest()
            .with_frame(Frame::new("frame.b", FrameSource::relation("psa.b")).with_hook(hook.clone()))
            .with_frame(Frame::new("frame.c", FrameSource::relation("psa.c")).with_hook(hook));
        let paths: Vec<_> = run(&m, "KEYSET-001").into_iter().map(|d| d.path).collect();
        assert_eq!(paths, vec!["frames[1].hooks[0]", "frames[2].hooks[0]"]);
    }
}
