//! Report rendering for terminals and machines

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Outcome};
use crate::validate::Report;

/// Human-readable report: one block per diagnostic, then a summary line
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    for diagnostic in &report.diagnostics {
        out.push_str(&diagnostic.to_string());
        out.push('\n');
    }
    out.push_str(&summary_line(report));
    out
}

/// `valid`, or error and warning counts
pub fn summary_line(report: &Report) -> String {
    if report.diagnostics.is_empty() {
        return "valid".to_string();
    }
    let errors = report.error_count();
    let warnings = report.warning_count();
    format!(
        "{errors} error{}, {warnings} warning{}",
        plural(errors),
        plural(warnings)
    )
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    valid: bool,
    outcome: Outcome,
    errors: Vec<&'a Diagnostic>,
    warnings: Vec<&'a Diagnostic>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    error_count: usize,
    warning_count: usize,
}

/// Machine-readable record of the report
pub fn to_json_value(report: &Report) -> serde_json::Result<serde_json::Value> {
    let errors: Vec<_> = report.errors().collect();
    let warnings: Vec<_> = report.warnings().collect();
    serde_json::to_value(JsonReport {
        valid: report.is_valid(),
        outcome: report.outcome,
        summary: JsonSummary {
            error_count: errors.len(),
            warning_count: warnings.len(),
        },
        errors,
        warnings,
    })
}

pub fn render_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&to_json_value(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tests_support::manifest;
    use crate::validate::validate;

    #[test]
    fn test_text_for_clean_manifest() {
        assert_eq!(render_text(&validate(&manifest())), "valid");
    }

    #[test]
    fn test_text_lists_diagnostics_then_summary() {
        let mut m = manifest();
        m.frames[0].hooks[0].source = "crm".to_string();
        let text = render_text(&validate(&m));
        assert!(text.starts_with("ERROR [HOOK-005] Invalid source: 'crm'"));
        assert!(text.contains("\n  at: frames[0].hooks[0].source\n"));
        assert!(text.ends_with("1 error, 0 warnings"));
    }

    #[test]
    fn test_json_shape() {
        let mut m = manifest();
        m.frames[0].hooks[0].expr = "CURRENT_DATE".to_string();
        let value = to_json_value(&validate(&m)).unwrap();
        assert_eq!(value["valid"], true);
        assert_eq!(value["outcome"], "pass_with_warnings");
        assert_eq!(value["summary"]["warning_count"], 1);
        assert_eq!(value["warnings"][0]["rule_id"], "HOOK-W002");
        assert_eq!(value["warnings"][0]["severity"], "WARN");
        assert!(value["errors"].as_array().unwrap().is_empty());
    }
}
