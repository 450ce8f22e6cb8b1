//! Structural checks over a finished entity graph.
//!
//! Three independent checks, each run over every declaration:
//! 1. duplicate ids (SCHEMA)
//! 2. references to undeclared ids (SEMANTIC)
//! 3. global identifier format (SCHEMA)
//!
//! No check stops another. A duplicated entity is still checked for broken
//! references and identifier format.

use std::collections::HashSet;

use regex::Regex;

use crate::config::ValidatorConfig;
use crate::error::{Result, StepError};
use crate::finding::{Finding, FindingKind};
use crate::graph::EntityGraph;
use crate::parser::ParamValue;

/// Compiled structural checks.
#[derive(Debug, Clone)]
pub struct StructuralChecks {
    global_id_types: HashSet<String>,
    global_id_pattern: Regex,
}

impl StructuralChecks {
    /// Compile the checks for a configuration.
    pub fn new(config: &ValidatorConfig) -> Result<Self> {
        let global_id_pattern = Regex::new(&config.global_id_pattern)
            .map_err(|e| StepError::pattern(&config.global_id_pattern, e))?;
        Ok(Self {
            global_id_types: config.global_id_types.iter().cloned().collect(),
            global_id_pattern,
        })
    }

    /// Run all checks. Findings come out grouped by check, in source order
    /// within each group.
    pub fn run(&self, graph: &EntityGraph) -> Vec<Finding> {
        let mut findings = duplicate_ids(graph);
        findings.extend(broken_references(graph));
        findings.extend(self.global_ids(graph));
        findings
    }

    fn global_ids(&self, graph: &EntityGraph) -> Vec<Finding> {
        graph
            .declarations()
            .iter()
            .filter(|e| self.global_id_types.contains(&e.type_name))
            .filter_map(|e| {
                let value = e.params.first()?;
                let text = value.unquoted()?;
                if self.global_id_pattern.is_match(&text) {
                    return None;
                }
                Some(
                    Finding::error(
                        FindingKind::Schema,
                        format!("Invalid Global ID format: {}", value.as_str()?),
                    )
                    .for_entity(e),
                )
            })
            .collect()
    }
}

/// Every declaration after the first one for an id.
fn duplicate_ids(graph: &EntityGraph) -> Vec<Finding> {
    let mut seen = HashSet::new();
    graph
        .declarations()
        .iter()
        .filter(|e| !seen.insert(e.id))
        .map(|e| {
            Finding::error(FindingKind::Schema, format!("Duplicate ID found: {}", e.id))
                .for_entity(e)
        })
        .collect()
}

/// One finding per reference parameter whose target is not declared.
fn broken_references(graph: &EntityGraph) -> Vec<Finding> {
    let mut findings = Vec::new();
    for entity in graph.declarations() {
        for target in entity.params.iter().filter_map(ParamValue::as_reference) {
            if !graph.contains(target) {
                findings.push(
                    Finding::error(
                        FindingKind::Semantic,
                        format!("Broken reference to ID {target}"),
                    )
                    .for_entity(entity),
                );
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;
    use crate::parser::parse_entity_line;

    fn run(lines: &[&str]) -> Vec<Finding> {
        run_with(&ValidatorConfig::default(), lines)
    }

    fn run_with(config: &ValidatorConfig, lines: &[&str]) -> Vec<Finding> {
        let graph = EntityGraph::build(
            lines
                .iter()
                .enumerate()
                .filter_map(|(i, l)| parse_entity_line(l, i + 1))
                .map(|p| p.entity),
        );
        StructuralChecks::new(config).unwrap().run(&graph)
    }

    #[test]
    fn test_clean_graph() {
        assert!(run(&[
            "#1=IFCPERSON('John');",
            "#2=IFCORGANIZATION(#1);",
            "#3=IFCGLOBALLYUNIQUEID('2O2Fr$t4X7Zf8NOew3FLOH');",
        ])
        .is_empty());
    }

    #[test]
    fn test_duplicate_reported_on_later_entity() {
        let findings = run(&[
            "#1=IFCPERSON('A');",
            "#1=IFCPERSON('B');",
            "#1=IFCPERSON('C');",
        ]);
        assert_eq!(findings.len(), 2);
        for (f, line) in findings.iter().zip([2, 3]) {
            assert_eq!(f.kind, FindingKind::Schema);
            assert_eq!(f.severity, Severity::Error);
            assert_eq!(f.message, "Duplicate ID found: 1");
            assert_eq!(f.entity_id, Some(1));
            assert_eq!(f.line, Some(line));
        }
    }

    #[test]
    fn test_broken_reference_points_at_owner() {
        let findings = run(&["#1=IFCPERSON($);", "#2=IFCORGANIZATION(#99,#1,#98);"]);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].kind, FindingKind::Semantic);
        assert_eq!(findings[0].message, "Broken reference to ID 99");
        assert_eq!(findings[0].entity_id, Some(2));
        assert_eq!(findings[1].message, "Broken reference to ID 98");
    }

    #[test]
    fn test_duplicate_still_checked_for_references() {
        let findings = run(&["#1=IFCPERSON($);", "#1=IFCPERSON(#5);"]);
        let kinds: Vec<FindingKind> = findings.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FindingKind::Schema, FindingKind::Semantic]);
        assert_eq!(findings[1].line, Some(2));
    }

    #[test]
    fn test_self_reference_resolves() {
        assert!(run(&["#1=IFCPERSON(#1);"]).is_empty());
    }

    #[test]
    fn test_global_id_format() {
        let findings = run(&[
            "#1=IFCGLOBALLYUNIQUEID('too-short');",
            "#2=IFCGLOBALLYUNIQUEID('2O2Fr$t4X7Zf8NOew3FLOH');",
            "#3=IFCGLOBALLYUNIQUEID('2O2Fr$t4X7Zf8NOew3FLO!');",
            "#4=IFCGLOBALLYUNIQUEID($);",
            "#5=IFCGLOBALLYUNIQUEID();",
            "#6=IFCPERSON('too-short');",
        ]);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].message, "Invalid Global ID format: 'too-short'");
        assert_eq!(findings[0].entity_id, Some(1));
        assert_eq!(findings[1].entity_id, Some(3));
        assert!(findings.iter().all(|f| f.kind == FindingKind::Schema));
    }

    #[test]
    fn test_configured_global_id_types() {
        let config = ValidatorConfig {
            global_id_types: vec!["IFCWALL".into()],
            ..ValidatorConfig::default()
        };
        let findings = run_with(
            &config,
            &[
                "#1=IFCWALL('bad',$);",
                "#2=IFCGLOBALLYUNIQUEID('bad');",
            ],
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].entity_id, Some(1));
    }

    #[test]
    fn test_checks_do_not_short_circuit() {
        let findings = run(&[
            "#1=IFCGLOBALLYUNIQUEID('x',#40);",
            "#1=IFCGLOBALLYUNIQUEID('y');",
        ]);
        let messages: Vec<&str> = findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Duplicate ID found: 1",
                "Broken reference to ID 40",
                "Invalid Global ID format: 'x'",
                "Invalid Global ID format: 'y'",
            ]
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let config = ValidatorConfig {
            global_id_pattern: "([".into(),
            ..ValidatorConfig::default()
        };
        assert!(matches!(
            StructuralChecks::new(&config),
            Err(StepError::Pattern { .. })
        ));
    }
}
