//! Validation pipeline: section → lines → entities → graph → checks + stats.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::checks::StructuralChecks;
use crate::config::ValidatorConfig;
use crate::error::{Result, StepError};
use crate::finding::{Finding, FindingKind};
use crate::graph::EntityGraph;
use crate::parser::parse_entity_line;
use crate::section::{DataSection, LineNumbering};
use crate::stats::Stats;

/// Outcome of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// `true` iff there are no errors.
    pub is_valid: bool,
    /// Error-severity findings.
    pub errors: Vec<Finding>,
    /// Warning-severity findings.
    pub warnings: Vec<Finding>,
    /// Statistics of the parsed graph.
    pub stats: Stats,
}

impl ValidationResult {
    /// Partition findings by severity.
    pub fn from_findings(findings: Vec<Finding>, stats: Stats) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            findings.into_iter().partition(Finding::is_error);
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            stats,
        }
    }

    /// Result of a run that could not get past tokenization: one SYNTAX
    /// error and zeroed statistics.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![Finding::error(FindingKind::Syntax, message)],
            warnings: Vec::new(),
            stats: Stats::default(),
        }
    }
}

/// Data section parsed into a graph, before structural checks.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// The entity graph.
    pub graph: EntityGraph,
    /// Warnings raised while parsing lines.
    pub warnings: Vec<Finding>,
}

/// A configured validator. Cheap to share across threads.
#[derive(Debug, Clone)]
pub struct Validator {
    checks: StructuralChecks,
    line_numbering: LineNumbering,
}

impl Validator {
    /// Create a validator, compiling the configured patterns.
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        Ok(Self {
            checks: StructuralChecks::new(&config)?,
            line_numbering: config.line_numbering,
        })
    }

    /// Validate the full text of an IFC file. Never fails: any problem,
    /// including a panic inside the pipeline, becomes a SYNTAX error.
    pub fn validate(&self, content: &str) -> ValidationResult {
        let span = tracing::debug_span!("validate", bytes = content.len());
        let _enter = span.enter();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(content)));
        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!("validation aborted: {}", e);
                ValidationResult::fatal(e.to_string())
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!("validation panicked: {}", message);
                ValidationResult::fatal(StepError::internal(message).to_string())
            }
        };

        info!(
            valid = result.is_valid,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            entities = result.stats.total_entities,
            "validation finished"
        );
        result
    }

    /// Parse the data section into a graph without running structural
    /// checks. Fails only when there is no data section.
    pub fn parse(&self, content: &str) -> Result<ParsedFile> {
        let section = DataSection::extract(content)?;
        debug!(first_line = section.first_line, "found data section");

        let mut warnings = Vec::new();
        let mut entities = Vec::new();
        let mut skipped = 0usize;
        for line in section.lines() {
            let Some(parsed) = parse_entity_line(line.text, line.number(self.line_numbering))
            else {
                debug!(line = line.source_line, "skipping non-entity line");
                skipped += 1;
                continue;
            };
            if let Some(issue) = parsed.issue {
                warnings.push(
                    Finding::warning(
                        FindingKind::Syntax,
                        format!(
                            "Malformed parameters in entity #{}: {}",
                            parsed.entity.id, issue
                        ),
                    )
                    .for_entity(&parsed.entity),
                );
            }
            entities.push(parsed.entity);
        }
        debug!(entities = entities.len(), skipped, "parsed data section");

        Ok(ParsedFile {
            graph: EntityGraph::build(entities),
            warnings,
        })
    }

    fn run(&self, content: &str) -> Result<ValidationResult> {
        let ParsedFile {
            graph,
            mut warnings,
        } = self.parse(content)?;

        let stats = Stats::collect(&graph);
        let mut findings = self.checks.run(&graph);
        findings.append(&mut warnings);

        Ok(ValidationResult::from_findings(findings, stats))
    }
}

/// Validate IFC text with the default configuration.
pub fn validate(content: &str) -> ValidationResult {
    match Validator::new(ValidatorConfig::default()) {
        Ok(validator) => validator.validate(content),
        Err(e) => ValidationResult::fatal(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;

    fn ifc(data: &str) -> String {
        format!(
            "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION((''),'2;1');\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n{data}\nENDSEC;\nEND-ISO-10303-21;\n"
        )
    }

    #[test]
    fn test_scenario_valid() {
        let result = validate(&ifc("#1=IFCPERSON('John');\n#2=IFCORGANIZATION($);"));
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.stats.total_entities, 2);
        assert_eq!(result.stats.entity_counts.len(), 2);
        assert_eq!(result.stats.entity_counts["IFCPERSON"], 1);
        assert_eq!(result.stats.entity_counts["IFCORGANIZATION"], 1);
    }

    #[test]
    fn test_scenario_broken_reference() {
        let result = validate(&ifc("#1=IFCPERSON('John');\n#2=IFCORGANIZATION(#99);"));
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        let err = &result.errors[0];
        assert_eq!(err.kind, FindingKind::Semantic);
        assert_eq!(err.entity_id, Some(2));
        assert!(err.message.contains("99"));
        assert_eq!(result.stats.references.broken, 1);
    }

    #[test]
    fn test_scenario_duplicate_id() {
        let result = validate(&ifc(
            "#1=IFCPERSON('A');\n#2=IFCORGANIZATION(#1);\n#1=IFCPERSON('B');",
        ));
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, FindingKind::Schema);
        assert!(result.errors[0].message.contains("Duplicate ID found: 1"));
        assert_eq!(result.stats.total_entities, 2);
        assert_eq!(result.stats.entity_counts["IFCPERSON"], 1);
    }

    #[test]
    fn test_missing_data_section() {
        let result = validate("ISO-10303-21;\nHEADER;\nENDSEC;\nEND-ISO-10303-21;\n");
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, FindingKind::Syntax);
        assert_eq!(result.errors[0].message, "DATA section not found");
        assert!(result.warnings.is_empty());
        assert!(result.stats.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let result = validate("");
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.stats.is_empty());
    }

    #[test]
    fn test_empty_data_section_is_valid() {
        let result = validate(&ifc(""));
        assert!(result.is_valid);
        assert_eq!(result.stats.total_entities, 0);
    }

    #[test]
    fn test_stray_lines_skipped() {
        let result = validate(&ifc(
            "#1=IFCPERSON('John');\nthis is not an entity\n#2=ifcthing($);\n#3=IFCACTOR(#1);",
        ));
        assert!(result.is_valid);
        assert_eq!(result.stats.total_entities, 2);
    }

    #[test]
    fn test_one_entity_per_line() {
        let result = validate("DATA;#1=IFCX($);#2=IFCY(#1);ENDSEC;");
        assert!(result.is_valid);
        assert_eq!(result.stats.total_entities, 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(
            result.warnings[0].message,
            "Malformed parameters in entity #1: unclosed parenthesis"
        );
    }

    #[test]
    fn test_unterminated_string_is_warning() {
        let result = validate(&ifc("#1=IFCPERSON('John);\n#2=IFCACTOR(#1);"));
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        let w = &result.warnings[0];
        assert_eq!(w.kind, FindingKind::Syntax);
        assert_eq!(w.severity, Severity::Warning);
        assert_eq!(w.entity_id, Some(1));
        assert_eq!(w.message, "Malformed parameters in entity #1: unterminated string");
        assert_eq!(result.stats.total_entities, 2);
    }

    #[test]
    fn test_line_numbering() {
        let content = ifc("#1=IFCPERSON($);\n\n\n#2=IFCACTOR(#7);");

        let result = validate(&content);
        assert_eq!(result.errors[0].line, Some(10));

        let config = ValidatorConfig {
            line_numbering: LineNumbering::Filtered,
            ..ValidatorConfig::default()
        };
        let result = Validator::new(config).unwrap().validate(&content);
        assert_eq!(result.errors[0].line, Some(2));
    }

    #[test]
    fn test_idempotent() {
        let content = ifc("#1=IFCPERSON('A');\n#1=IFCPERSON(#5);\n#2=IFCGLOBALLYUNIQUEID('x');");
        assert_eq!(validate(&content), validate(&content));
    }

    #[test]
    fn test_parse_exposes_graph() {
        let validator = Validator::new(ValidatorConfig::default()).unwrap();
        let parsed = validator
            .parse(&ifc("#1=IFCPERSON('A');\n#2=IFCACTOR(#1);"))
            .unwrap();
        let actor = parsed.graph.get(2).unwrap();
        let person = parsed.graph.resolve(&actor.params[0]).unwrap();
        assert_eq!(person.type_name, "IFCPERSON");
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_parse_missing_section() {
        let validator = Validator::new(ValidatorConfig::default()).unwrap();
        assert!(matches!(
            validator.parse("HEADER;ENDSEC;"),
            Err(StepError::MissingDataSection)
        ));
    }

    #[test]
    fn test_validator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();

        let validator = Validator::new(ValidatorConfig::default()).unwrap();
        let validator = &validator;
        let inputs = [ifc("#1=IFCPERSON($);"), ifc("#1=IFCPERSON(#2);")];
        std::thread::scope(|s| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|input| s.spawn(move || validator.validate(input)))
                .collect();
            let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert!(results[0].is_valid);
            assert!(!results[1].is_valid);
        });
    }
}
