//! Hook-level rules

use std::collections::BTreeSet;

use super::{Rule, RuleContext};
use crate::diagnostics::Diagnostic;
use crate::expression::ExprClass;
use crate::model::HookRole;
use crate::naming;
use crate::registry::hooks;

pub(super) fn required_fields(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    hooks(ctx.manifest)
        .filter_map(|r| {
            let hook = r.hook;
            let missing: Vec<&str> = [
                ("name", hook.name.is_empty()),
                ("role", hook.role.is_none()),
                ("concept", hook.concept.is_empty()),
                ("source", hook.source.is_empty()),
                ("expr", hook.expr.is_empty()),
            ]
            .into_iter()
            .filter_map(|(field, absent)| absent.then_some(field))
            .collect();
            if missing.is_empty() {
                return None;
            }
            let fields = missing.join(", ");
            Some(rule.emit(
                format!("Hook is missing required fields: {fields}"),
                r.path(),
                format!("Add the missing fields: {fields}"),
            ))
        })
        .collect()
}

pub(super) fn name_format(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let settings = &ctx.manifest.settings;
    let prefixes = settings.prefixes();
    hooks(ctx.manifest)
        .filter(|r| !naming::hook_name(&r.hook.name, &prefixes))
        .map(|r| {
            let example = if r.hook.concept.is_empty() {
                naming::suggest_hook_name(&settings.hook_prefix, "customer", None)
            } else {
                naming::suggest_hook_name(
                    &settings.hook_prefix,
                    &r.hook.concept,
                    r.hook.qualifier.as_deref(),
                )
            };
            rule.emit(
                format!(
                    "Invalid hook name: '{}'. Must be <prefix><concept>[__<qualifier>] with prefix '{}' or '{}'",
                    r.hook.name, settings.hook_prefix, settings.weak_hook_prefix
                ),
                format!("{}.name", r.path()),
                format!("Use format like '{example}'"),
            )
        })
        .collect()
}

pub(super) fn role(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    hooks(ctx.manifest)
        .filter_map(|r| match &r.hook.role {
            Some(HookRole::Other(value)) => Some(rule.emit(
                format!("Invalid hook role: '{value}'. Must be 'primary' or 'foreign'"),
                format!("{}.role", r.path()),
                "Set role to 'primary' (defines grain) or 'foreign' (references)",
            )),
            _ => None,
        })
        .collect()
}

pub(super) fn concept_casing(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for r in hooks(ctx.manifest) {
        let hook = r.hook;
        if !hook.concept.is_empty() && !naming::lower_snake(&hook.concept) {
            diagnostics.push(rule.emit(
                format!("Invalid concept name: '{}'. Must be lower_snake_case", hook.concept),
                format!("{}.concept", r.path()),
                "Use format like 'customer', 'order_line', 'product'",
            ));
        }
        if let Some(qualifier) = hook.qualifier.as_deref().filter(|q| !q.is_empty()) {
            if !naming::lower_snake(qualifier) {
                diagnostics.push(rule.emit(
                    format!("Invalid qualifier: '{qualifier}'. Must be lower_snake_case"),
                    format!("{}.qualifier", r.path()),
                    "Use format like 'manager', 'billing', 'shipping'",
                ));
            }
        }
    }
    diagnostics
}

pub(super) fn source_casing(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for r in hooks(ctx.manifest) {
        let hook = r.hook;
        if !hook.source.is_empty() && !naming::upper_snake(&hook.source) {
            diagnostics.push(rule.emit(
                format!("Invalid source: '{}'. Must be UPPER_SNAKE_CASE", hook.source),
                format!("{}.source", r.path()),
                "Use format like 'CRM', 'SAP', 'SAP_FIN'",
            ));
        }
        if let Some(tenant) = hook.tenant.as_deref().filter(|t| !t.is_empty()) {
            if !naming::upper_snake(tenant) {
                diagnostics.push(rule.emit(
                    format!("Invalid tenant: '{tenant}'. Must be UPPER_SNAKE_CASE"),
                    format!("{}.tenant", r.path()),
                    "Use format like 'AU', 'US', 'EU_WEST'",
                ));
            }
        }
    }
    diagnostics
}

pub(super) fn expr_shape(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    hooks(ctx.manifest)
        .filter_map(|r| {
            let message = match ctx.expr_class(r.frame_index, r.hook_index) {
                ExprClass::Empty => "Expression is empty".to_string(),
                ExprClass::Unparseable { message } => {
                    format!("Expression '{}' could not be parsed: {message}", r.hook.expr)
                }
                ExprClass::Statement { kind } => format!(
                    "Expression '{}' is a {kind} statement; only scalar expressions are allowed",
                    r.hook.expr
                ),
                ExprClass::Subquery => format!(
                    "Expression '{}' contains a subquery; only scalar expressions are allowed",
                    r.hook.expr
                ),
                ExprClass::NonDeterministic { .. } | ExprClass::Pure => return None,
            };
            Some(rule.emit(
                message,
                format!("{}.expr", r.path()),
                "Use column references, literals, operators, CASE, CAST and scalar functions only",
            ))
        })
        .collect()
}

pub(super) fn name_unique_in_frame(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (name, refs) in &ctx.hook_index {
        if name.is_empty() {
            continue;
        }
        let mut seen_frames = BTreeSet::new();
        for r in refs {
            if !seen_frames.insert(r.frame_index) {
                diagnostics.push(rule.emit(
                    format!("Duplicate hook name '{name}' in frame '{}'", r.frame_name),
                    format!("{}.name", r.path()),
                    "Use unique hook names within each frame. Add a qualifier to tell the roles apart",
                ));
            }
        }
    }
    diagnostics
}

pub(super) fn weak_prefix_mismatch(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let settings = &ctx.manifest.settings;
    hooks(ctx.manifest)
        .filter_map(|r| {
            let concept = ctx
                .manifest
                .concepts
                .iter()
                .find(|c| c.name == r.hook.concept)?;
            let uses_weak = settings.is_weak_hook_name(&r.hook.name);
            let uses_strong = !uses_weak && r.hook.name.starts_with(&settings.hook_prefix);

            let (message, fix) = if uses_weak && !concept.is_weak {
                (
                    format!(
                        "Hook '{}' uses weak prefix but concept '{}' has is_weak=false",
                        r.hook.name, concept.name
                    ),
                    "Either set the concept's is_weak to true or use the strong hook prefix",
                )
            } else if uses_strong && concept.is_weak {
                (
                    format!(
                        "Hook '{}' uses strong prefix but concept '{}' has is_weak=true",
                        r.hook.name, concept.name
                    ),
                    "Either set the concept's is_weak to false or use the weak hook prefix",
                )
            } else {
                return None;
            };
            Some(rule.emit(message, format!("{}.name", r.path()), fix))
        })
        .collect()
}

pub(super) fn expr_non_deterministic(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    hooks(ctx.manifest)
        .filter_map(|r| match ctx.expr_class(r.frame_index, r.hook_index) {
            ExprClass::NonDeterministic { function } => Some(rule.emit(
                format!(
                    "Expression '{}' calls non-deterministic {function}; the derived key changes between loads",
                    r.hook.expr
                ),
                format!("{}.expr", r.path()),
                "Derive the business key from stored columns only",
            )),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::model::{Concept, Hook, HookRole};
    use crate::rules::tests_support::{manifest, run};

    #[test]
    fn test_missing_fields_listed_together() {
        let mut m = manifest();
        m.frames[0].hooks[0].role = None;
        m.frames[0].hooks[0].expr.clear();
        let d = run(&m, "HOOK-001");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].path, "frames[0].hooks[0]");
        assert_eq!(d[0].message, "Hook is missing required fields: role, expr");
    }

    #[test]
    fn test_bad_hook_name_suggests_canonical() {
        let mut m = manifest();
        m.frames[0].hooks[0].name = "customer_hook".to_string();
        let d = run(&m, "HOOK-002");
        assert_eq!(d[0].path, "frames[0].hooks[0].name");
        assert!(d[0].fix.contains("_hk__customer"));
    }

    #[test]
    fn test_custom_prefixes() {
        let mut m = manifest();
        m.settings.hook_prefix = "hk_".to_string();
        assert_eq!(run(&m, "HOOK-002").len(), 1);
        m.frames[0].hooks[0].name = "hk_customer".to_string();
        assert!(run(&m, "HOOK-002").is_empty());
    }

    #[test]
    fn test_unknown_role() {
        let mut m = manifest();
        m.frames[0].hooks[0].role = Some(HookRole::from("lookup"));
        let d = run(&m, "HOOK-003");
        assert_eq!(d[0].path, "frames[0].hooks[0].role");
        assert!(d[0].message.contains("'lookup'"));
    }

    #[test]
    fn test_casing() {
        let mut m = manifest();
        let hook = &mut m.frames[0].hooks[0];
        hook.concept = "Customer".to_string();
        hook.qualifier = Some("Billing".to_string());
        hook.source = "crm".to_string();
        hook.tenant = Some("eu".to_string());

        let paths: Vec<_> = run(&m, "HOOK-004").into_iter().map(|d| d.path).collect();
        assert_eq!(paths, vec!["frames[0].hooks[0].concept", "frames[0].hooks[0].qualifier"]);
        let paths: Vec<_> = run(&m, "HOOK-005").into_iter().map(|d| d.path).collect();
        assert_eq!(paths, vec!["frames[0].hooks[0].source", "frames[0].hooks[0].tenant"]);
    }

    #[test]
    fn test_rejected_expressions() {
        for expr in ["(SELECT MAX(id) FROM orders)", "SELECT 1", "a +", "   "] {
            let mut m = manifest();
            m.frames[0].hooks[0].expr = expr.to_string();
            let d = run(&m, "HOOK-006");
            assert_eq!(d.len(), 1, "expected rejection of {expr:?}");
            assert_eq!(d[0].path, "frames[0].hooks[0].expr");
        }
    }

    #[test]
    fn test_non_deterministic_is_only_a_warning() {
        let mut m = manifest();
        m.frames[0].hooks[0].expr = "CURRENT_TIMESTAMP".to_string();
        assert!(run(&m, "HOOK-006").is_empty());
        let d = run(&m, "HOOK-W002");
        assert_eq!(d.len(), 1);
        assert!(d[0].message.contains("CURRENT_TIMESTAMP"));
    }

    #[test]
    fn test_duplicate_name_within_frame() {
        let mut m = manifest();
        m.frames[0].hooks.push(
            Hook::new("_hk__customer", HookRole::Foreign, "customer", "CRM", "parent_id")
                .with_qualifier("parent"),
        );
        let d = run(&m, "HOOK-007");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].path, "frames[0].hooks[1].name");
    }

    #[test]
    fn test_same_name_across_frames_is_fine() {
        let m = manifest();
        let mut other = m.frames[0].clone();
        other.name = "frame.customer_address".to_string();
        let m = m.with_frame(other);
        assert!(run(&m, "HOOK-007").is_empty());
    }

    #[test]
    fn test_weak_prefix_mismatch_both_directions() {
        let mut m = manifest();
        m.frames[0].hooks[0].name = "_wk__customer".to_string();
        let d = run(&m, "HOOK-W001");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].path, "frames[0].hooks[0].name");

        let mut m = manifest();
        m.concepts = vec![Concept::new("customer", "A person or company that buys").weak()];
        assert!(run(&m, "HOOK-W001")[0].message.contains("strong prefix"));
    }

    #[test]
    fn test_weak_prefix_without_declared_concept() {
        let mut m = manifest();
        m.concepts.clear();
        m.frames[0].hooks[0].name = "_wk__customer".to_string();
        assert!(run(&m, "HOOK-W001").is_empty());
    }
}
