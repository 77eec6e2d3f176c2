//! Derived registries
//!
//! Indexes computed from a [`Manifest`] once per validation run. Nothing is
//! cached between runs; each function walks the hooks exactly once.
//!
//! Key identifiers follow `CONCEPT[~QUALIFIER]@SOURCE[~TENANT]`:
//!
//! ```text
//! CUSTOMER@CRM
//! EMPLOYEE~MANAGER@CRM
//! ORDER@SAP~AU
//! ORDER~BILLING@SAP~EU
//! ```

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Hook, Manifest};

/// A hook together with its position in the manifest
#[derive(Debug, Clone, Copy)]
pub struct HookRef<'a> {
    pub frame_index: usize,
    pub hook_index: usize,
    pub frame_name: &'a str,
    pub hook: &'a Hook,
}

impl HookRef<'_> {
    /// Manifest path of the hook, e.g. `frames[1].hooks[0]`
    pub fn path(&self) -> String {
        format!("frames[{}].hooks[{}]", self.frame_index, self.hook_index)
    }
}

/// Every hook in frame order, then hook order
pub fn hooks(manifest: &Manifest) -> impl Iterator<Item = HookRef<'_>> {
    manifest
        .frames
        .iter()
        .enumerate()
        .flat_map(|(frame_index, frame)| {
            frame.hooks.iter().enumerate().map(move |(hook_index, hook)| HookRef {
                frame_index,
                hook_index,
                frame_name: frame.name.as_str(),
                hook,
            })
        })
}

/// Key identifier of a single hook. Absent (or empty) qualifier and tenant
/// omit their segment entirely.
pub fn key_identifier(hook: &Hook) -> String {
    let mut key = hook.concept.to_uppercase();
    if let Some(qualifier) = hook.qualifier.as_deref().filter(|q| !q.is_empty()) {
        key.push('~');
        key.push_str(&qualifier.to_uppercase());
    }
    key.push('@');
    key.push_str(&hook.source.to_uppercase());
    if let Some(tenant) = hook.tenant.as_deref().filter(|t| !t.is_empty()) {
        key.push('~');
        key.push_str(&tenant.to_uppercase());
    }
    key
}

/// All distinct key identifiers in the manifest
pub fn derive_key_identifiers(manifest: &Manifest) -> BTreeSet<String> {
    hooks(manifest).map(|r| key_identifier(r.hook)).collect()
}

/// All distinct concept names referenced by hooks
pub fn derive_concept_names(manifest: &Manifest) -> BTreeSet<String> {
    hooks(manifest).map(|r| r.hook.concept.clone()).collect()
}

/// Hooks grouped by hook name, each group in manifest order
pub fn derive_hook_index(manifest: &Manifest) -> BTreeMap<String, Vec<HookRef<'_>>> {
    let mut index: BTreeMap<String, Vec<HookRef<'_>>> = BTreeMap::new();
    for r in hooks(manifest) {
        index.entry(r.hook.name.clone()).or_default().push(r);
    }
    index
}

/// Hooks grouped by derived key identifier, each group in manifest order
pub fn derive_key_index(manifest: &Manifest) -> BTreeMap<String, Vec<HookRef<'_>>> {
    let mut index: BTreeMap<String, Vec<HookRef<'_>>> = BTreeMap::new();
    for r in hooks(manifest) {
        index.entry(key_identifier(r.hook)).or_default().push(r);
    }
    index
}

/// A derived key set and the frames it appears in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySet {
    /// Key identifier, e.g. `ORDER~BILLING@SAP~EU`
    pub name: String,
    pub concept: String,
    /// Frame names in first-seen order, without repeats
    pub frames: Vec<String>,
}

/// Key sets sorted by name
pub fn derive_key_sets(manifest: &Manifest) -> Vec<KeySet> {
    derive_key_index(manifest)
        .into_iter()
        .map(|(name, refs)| {
            let concept = refs
                .first()
                .map(|r| r.hook.concept.clone())
                .unwrap_or_default();
            let mut frames: Vec<String> = Vec::new();
            for r in &refs {
                if !frames.iter().any(|f| f == r.frame_name) {
                    frames.push(r.frame_name.to_string());
                }
            }
            KeySet { name, concept, frames }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Frame, FrameSource, HookRole, Metadata};
    use chrono::{TimeZone, Utc};

    fn manifest() -> Manifest {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Manifest::new("1.0.0", "1.0.0", Metadata::new("sales", at))
            .with_frame(
                Frame::new("frame.customer", FrameSource::relation("psa.customer"))
                    .with_hook(Hook::new("_hk__customer", HookRole::Primary, "customer", "CRM", "customer_id")),
            )
            .with_frame(
                Frame::new("frame.order", FrameSource::relation("psa.order"))
                    .with_hook(
                        Hook::new("_hk__order", HookRole::Primary, "order", "SAP", "order_id")
                            .with_tenant("EU"),
                    )
                    .with_hook(
                        Hook::new("_hk__order__billing", HookRole::Foreign, "order", "SAP", "billing_id")
                            .with_qualifier("billing")
                            .with_tenant("EU"),
                    )
                    .with_hook(Hook::new("_hk__customer", HookRole::Foreign, "customer", "CRM", "customer_id")),
            )
    }

    #[test]
    fn test_key_identifier_segments() {
        let hook = Hook::new("_hk__employee__manager", HookRole::Primary, "employee", "crm", "id")
            .with_qualifier("manager");
        assert_eq!(key_identifier(&hook), "EMPLOYEE~MANAGER@CRM");

        let hook = Hook::new("_hk__order", HookRole::Primary, "order", "SAP", "id").with_tenant("au");
        assert_eq!(key_identifier(&hook), "ORDER@SAP~AU");
    }

    #[test]
    fn test_empty_optional_segments_are_omitted() {
        let hook = Hook::new("_hk__customer", HookRole::Primary, "customer", "CRM", "id")
            .with_qualifier("")
            .with_tenant("");
        assert_eq!(key_identifier(&hook), "CUSTOMER@CRM");
    }

    #[test]
    fn test_derive_key_identifiers() {
        let keys = derive_key_identifiers(&manifest());
        let keys: Vec<_> = keys.into_iter().collect();
        assert_eq!(keys, vec!["CUSTOMER@CRM", "ORDER@SAP~EU", "ORDER~BILLING@SAP~EU"]);
    }

    #[test]
    fn test_no_hooks_yields_empty_set() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let empty = Manifest::new("1.0.0", "1.0.0", Metadata::new("empty", at));
        assert!(derive_key_identifiers(&empty).is_empty());
        assert!(derive_concept_names(&empty).is_empty());
        assert!(derive_hook_index(&empty).is_empty());
    }

    #[test]
    fn test_derivation_is_repeatable() {
        let m = manifest();
        assert_eq!(derive_key_identifiers(&m), derive_key_identifiers(&m));
    }

    #[test]
    fn test_concept_names() {
        let names: Vec<_> = derive_concept_names(&manifest()).into_iter().collect();
        assert_eq!(names, vec!["customer", "order"]);
    }

    #[test]
    fn test_hook_index_groups_across_frames() {
        let m = manifest();
        let index = derive_hook_index(&m);
        let customer = &index["_hk__customer"];
        assert_eq!(customer.len(), 2);
        assert_eq!(customer[0].frame_name, "frame.customer");
        assert_eq!(customer[1].frame_name, "frame.order");
        assert_eq!(customer[1].path(), "frames[1].hooks[2]");
    }

    #[test]
    fn test_key_sets_list_frames() {
        let sets = derive_key_sets(&manifest());
        let customer = sets.iter().find(|s| s.name == "CUSTOMER@CRM").unwrap();
        assert_eq!(customer.concept, "customer");
        assert_eq!(customer.frames, vec!["frame.customer", "frame.order"]);
    }
}
