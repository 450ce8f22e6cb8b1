//! Text and JSON rendering of validation results.

use std::fmt::Write;

use crate::error::Result;
use crate::validate::ValidationResult;

/// Render a result as a fixed-order, human-readable summary.
pub fn format_report(result: &ValidationResult) -> String {
    let stats = &result.stats;
    let mut out = String::new();

    writeln!(out, "IFC validation report").unwrap();
    writeln!(out, "Valid: {}", if result.is_valid { "yes" } else { "no" }).unwrap();
    writeln!(out, "Entities: {}", stats.total_entities).unwrap();
    writeln!(out, "Entity types: {}", stats.entity_types).unwrap();
    writeln!(out, "Entity counts:").unwrap();
    for (type_name, count) in &stats.entity_counts {
        writeln!(out, "  {type_name}: {count}").unwrap();
    }
    writeln!(
        out,
        "References: {} total, {} resolved, {} broken",
        stats.references.total, stats.references.resolved, stats.references.broken
    )
    .unwrap();
    writeln!(out, "Errors: {}", result.errors.len()).unwrap();
    for finding in &result.errors {
        writeln!(out, "  {finding}").unwrap();
    }
    writeln!(out, "Warnings: {}", result.warnings.len()).unwrap();
    for finding in &result.warnings {
        writeln!(out, "  {finding}").unwrap();
    }
    out
}

/// Render a result as pretty-printed JSON with camelCase keys.
pub fn format_json(result: &ValidationResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
