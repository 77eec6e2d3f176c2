//! Validation entry points
//!
//! Runs the whole [`CATALOGUE`] against one manifest. Every rule is
//! evaluated regardless of what earlier rules found; results are
//! concatenated in catalogue order.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::ValidatorConfig;
use crate::diagnostics::{Diagnostic, Outcome, Severity};
use crate::error::Result;
use crate::model::Manifest;
use crate::reader;
use crate::rules::{RuleContext, CATALOGUE};

/// Diagnostics of one validation run plus the derived outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub outcome: Outcome,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            outcome: Outcome::from_diagnostics(&diagnostics),
            diagnostics,
        }
    }

    pub fn into_parts(self) -> (Outcome, Vec<Diagnostic>) {
        (self.outcome, self.diagnostics)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn is_valid(&self) -> bool {
        self.outcome.is_accepted()
    }
}

/// Validate with default limits and warnings enabled
pub fn validate(manifest: &Manifest) -> Report {
    validate_with(manifest, &ValidatorConfig::default())
}

/// Validate with explicit configuration
pub fn validate_with(manifest: &Manifest, config: &ValidatorConfig) -> Report {
    let ctx = RuleContext::new(manifest, config);
    let mut diagnostics = Vec::new();

    for rule in CATALOGUE {
        if rule.severity == Severity::Warn && !config.validation.include_warnings {
            continue;
        }
        let found = rule.evaluate(&ctx);
        debug!(rule = rule.id, count = found.len(), "rule evaluated");
        diagnostics.extend(found);
    }

    let report = Report::new(diagnostics);
    info!(
        manifest = %manifest.metadata.name,
        outcome = %report.outcome,
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validation complete"
    );
    report
}

/// Read a manifest file and validate it. Structural read errors are
/// returned as `Err` and never produce a report.
pub fn validate_file(path: impl AsRef<Path>, config: &ValidatorConfig) -> Result<Report> {
    let manifest = reader::read_manifest_file(path)?;
    Ok(validate_with(&manifest, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tests_support::manifest;

    #[test]
    fn test_clean_manifest_passes() {
        let report = validate(&manifest());
        assert_eq!(report.outcome, Outcome::Pass);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_warnings_can_be_disabled() {
        let mut m = manifest();
        m.frames[0].hooks[0].expr = "NOW()".to_string();
        assert_eq!(validate(&m).outcome, Outcome::PassWithWarnings);

        let mut config = ValidatorConfig::default();
        config.validation.include_warnings = false;
        let report = validate_with(&m, &config);
        assert_eq!(report.outcome, Outcome::Pass);
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn test_diagnostics_follow_catalogue_order() {
        let mut m = manifest();
        m.schema_version = "x".to_string();
        m.manifest_version = "y".to_string();
        m.frames[0].hooks[0].expr = "RANDOM()".to_string();
        m.concepts[0].description = "tiny".to_string();

        let ids: Vec<_> = validate(&m)
            .diagnostics
            .iter()
            .map(|d| d.rule_id.clone())
            .collect();
        assert_eq!(ids, vec!["MANIFEST-001", "MANIFEST-002", "CONCEPT-002", "HOOK-W002"]);
    }

    #[test]
    fn test_validation_does_not_mutate_input() {
        let mut m = manifest();
        m.frames[0].hooks[0].name = "bad".to_string();
        let before = m.clone();
        let _ = validate(&m);
        assert_eq!(m, before);
    }
}
