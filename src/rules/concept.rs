//! Concept-level rules

use std::collections::BTreeMap;

use super::{Rule, RuleContext};
use crate::diagnostics::Diagnostic;

const MIN_DESCRIPTION_CHARS: usize = 10;
const MAX_DESCRIPTION_CHARS: usize = 200;

pub(super) fn used_by_hook(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    ctx.manifest
        .concepts
        .iter()
        .enumerate()
        .filter(|(_, concept)| !ctx.concept_names.contains(&concept.name))
        .map(|(k, concept)| {
            rule.emit(
                format!("Concept '{}' is defined but not used in any hook", concept.name),
                format!("concepts[{k}]"),
                "Either use this concept in a hook or remove it from the concepts section",
            )
        })
        .collect()
}

pub(super) fn description_length(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    ctx.manifest
        .concepts
        .iter()
        .enumerate()
        .filter_map(|(k, concept)| {
            let length = concept.description.chars().count();
            if (MIN_DESCRIPTION_CHARS..=MAX_DESCRIPTION_CHARS).contains(&length) {
                return None;
            }
            Some(rule.emit(
                format!(
                    "Concept '{}' description is {length} characters; expected {MIN_DESCRIPTION_CHARS} to {MAX_DESCRIPTION_CHARS}",
                    concept.name
                ),
                format!("concepts[{k}].description"),
                "Describe the concept in one or two sentences",
            ))
        })
        .collect()
}

pub(super) fn no_duplicates(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut first_seen: BTreeMap<&str, usize> = BTreeMap::new();
    let mut diagnostics = Vec::new();
    for (k, concept) in ctx.manifest.concepts.iter().enumerate() {
        match first_seen.get(concept.name.as_str()) {
            Some(first) => diagnostics.push(rule.emit(
                format!(
                    "Duplicate concept name: '{}' (first defined at concepts[{first}])",
                    concept.name
                ),
                format!("concepts[{k}].name"),
                "Remove duplicate concept or rename one of them",
            )),
            None => {
                first_seen.insert(concept.name.as_str(), k);
            }
        }
    }
    diagnostics
}

pub(super) fn too_many_concepts(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let count = ctx.manifest.concepts.len();
    let limit = ctx.config.limits.max_concepts;
    if count <= limit {
        return Vec::new();
    }
    vec![rule.emit(
        format!("Manifest has {count} concepts (exceeds {limit}). Consider splitting into multiple manifests"),
        "concepts",
        "Group related concepts into separate manifests by domain",
    )]
}
