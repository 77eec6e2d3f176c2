//! Frame-level rules

use std::collections::BTreeMap;

use super::{frame_paths, Rule, RuleContext};
use crate::diagnostics::Diagnostic;
use crate::naming;

pub(super) fn has_hooks(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    frame_paths(ctx.manifest)
        .filter(|(_, frame)| frame.hooks.is_empty())
        .map(|(path, frame)| {
            rule.emit(
                format!("Frame '{}' has no hooks", frame.name),
                format!("{path}.hooks"),
                "Add at least one hook to the frame",
            )
        })
        .collect()
}

pub(super) fn name_format(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    frame_paths(ctx.manifest)
        .filter(|(_, frame)| !naming::frame_name(&frame.name))
        .map(|(path, frame)| {
            rule.emit(
                format!(
                    "Invalid frame name: '{}'. Must be <schema>.<table> in lower_snake_case",
                    frame.name
                ),
                format!("{path}.name"),
                "Use format like 'frame.customer', 'psa.order', 'staging.order_header'",
            )
        })
        .collect()
}

pub(super) fn has_primary_hook(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    frame_paths(ctx.manifest)
        .filter(|(_, frame)| frame.primary_hooks().next().is_none())
        .map(|(path, frame)| {
            rule.emit(
                format!(
                    "Frame '{}' has no primary hook. Every frame needs at least one hook defining its grain",
                    frame.name
                ),
                format!("{path}.hooks"),
                "Change at least one hook's role to 'primary'",
            )
        })
        .collect()
}

pub(super) fn source_present(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    frame_paths(ctx.manifest)
        .filter(|(_, frame)| frame.source.is_none())
        .map(|(path, frame)| {
            rule.emit(
                format!("Frame '{}' is missing source", frame.name),
                format!("{path}.source"),
                "Add a source with either 'relation' or 'path'",
            )
        })
        .collect()
}

pub(super) fn source_exclusive(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (path, frame) in frame_paths(ctx.manifest) {
        let Some(source) = &frame.source else {
            continue;
        };
        match (&source.relation, &source.path) {
            (Some(_), Some(_)) => diagnostics.push(rule.emit(
                format!(
                    "Frame '{}' source has both relation and path. Use exactly one",
                    frame.name
                ),
                format!("{path}.source"),
                "Remove either 'relation' or 'path' from source",
            )),
            (None, None) => diagnostics.push(rule.emit(
                format!("Frame '{}' source has neither relation nor path", frame.name),
                format!("{path}.source"),
                "Add either 'relation' or 'path' to source",
            )),
            _ => {}
        }
    }
    diagnostics
}

pub(super) fn source_nonempty(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (path, frame) in frame_paths(ctx.manifest) {
        let Some(source) = &frame.source else {
            continue;
        };
        if source.relation.as_deref().is_some_and(|r| r.trim().is_empty()) {
            diagnostics.push(rule.emit(
                format!("Frame '{}' source.relation is empty", frame.name),
                format!("{path}.source.relation"),
                "Provide a non-empty relation value (e.g., 'psa.customer')",
            ));
        }
        if source.path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            diagnostics.push(rule.emit(
                format!("Frame '{}' source.path is empty", frame.name),
                format!("{path}.source.path"),
                "Provide a non-empty path value (e.g., '//server/qvd/customer.qvd')",
            ));
        }
    }
    diagnostics
}

pub(super) fn too_many_hooks(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let limit = ctx.config.limits.max_hooks_per_frame;
    frame_paths(ctx.manifest)
        .filter(|(_, frame)| frame.hooks.len() > limit)
        .map(|(path, frame)| {
            rule.emit(
                format!(
                    "Frame '{}' has {} hooks (exceeds {limit}). Consider splitting the frame",
                    frame.name,
                    frame.hooks.len()
                ),
                format!("{path}.hooks"),
                "Group related hooks into separate frames by concern",
            )
        })
        .collect()
}

pub(super) fn duplicate_source(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut first_seen: BTreeMap<&str, (String, &str)> = BTreeMap::new();
    let mut diagnostics = Vec::new();

    for (path, frame) in frame_paths(ctx.manifest) {
        let Some(location) = frame
            .source
            .as_ref()
            .and_then(|s| s.location())
            .filter(|l| !l.trim().is_empty())
        else {
            continue;
        };
        match first_seen.get(location) {
            Some((first_path, first_name)) => diagnostics.push(rule.emit(
                format!(
                    "Source '{location}' of frame '{}' is already used by frame '{first_name}' ({first_path})",
                    frame.name
                ),
                format!("{path}.source"),
                "Review if these frames should share a source or be consolidated",
            )),
            None => {
                first_seen.insert(location, (path, frame.name.as_str()));
            }
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use crate::model::{Frame, FrameSource, Hook, HookRole};
    use crate::rules::tests_support::{manifest, run};

    #[test]
    fn test_frame_without_hooks() {
        let m = manifest().with_frame(Frame::new("frame.empty", FrameSource::relation("psa.empty")));
        let d = run(&m, "FRAME-001");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].path, "frames[1].hooks");
        assert_eq!(d[0].message, "Frame 'frame.empty' has no hooks");
        // an empty frame also lacks a primary hook
        assert_eq!(run(&m, "FRAME-003")[0].path, "frames[1].hooks");
    }

    #[test]
    fn test_bad_frame_name() {
        let mut m = manifest();
        m.frames[0].name = "Customer".to_string();
        assert_eq!(run(&m, "FRAME-002")[0].path, "frames[0].name");
    }

    #[test]
    fn test_only_foreign_hooks() {
        let mut m = manifest();
        m.frames[0].hooks[0].role = Some(HookRole::Foreign);
        assert_eq!(run(&m, "FRAME-003").len(), 1);
    }

    #[test]
    fn test_composite_grain_is_allowed() {
        let m = manifest();
        let mut frame = m.frames[0].clone();
        frame.hooks.push(Hook::new("_hk__store", HookRole::Primary, "store", "CRM", "store_id"));
        let m = m.with_frame(Frame { name: "frame.visit".into(), source: Some(FrameSource::relation("psa.visit")), ..frame });
        assert!(run(&m, "FRAME-003").is_empty());
    }

    #[test]
    fn test_source_shape() {
        let mut m = manifest();
        m.frames[0].source = None;
        assert_eq!(run(&m, "FRAME-004")[0].path, "frames[0].source");
        assert!(run(&m, "FRAME-005").is_empty());

        m.frames[0].source = Some(FrameSource {
            relation: Some("psa.customer".into()),
            path: Some("/data/customer.qvd".into()),
        });
        assert_eq!(run(&m, "FRAME-005")[0].path, "frames[0].source");

        m.frames[0].source = Some(FrameSource::default());
        assert!(run(&m, "FRAME-005")[0].message.contains("neither"));
    }

    #[test]
    fn test_blank_source_values() {
        let mut m = manifest();
        m.frames[0].source = Some(FrameSource::relation(""));
        assert_eq!(run(&m, "FRAME-006")[0].path, "frames[0].source.relation");

        m.frames[0].source = Some(FrameSource::path("  "));
        assert_eq!(run(&m, "FRAME-006")[0].path, "frames[0].source.path");
    }

    #[test]
    fn test_hook_limit() {
        let mut m = manifest();
        let hook = m.frames[0].hooks[0].clone();
        m.frames[0].hooks = vec![hook; 21];
        let d = run(&m, "FRAME-W001");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].path, "frames[0].hooks");
    }

    #[test]
    fn test_duplicate_source_flags_later_frame() {
        let m = manifest();
        let mut second = m.frames[0].clone();
        second.name = "frame.customer_copy".to_string();
        let m = m.with_frame(second);

        let d = run(&m, "FRAME-W002");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].path, "frames[1].source");
        assert!(d[0].message.contains("frames[0]"));
    }
}
