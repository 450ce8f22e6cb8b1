//! Validation findings (errors and warnings).

use serde::Serialize;
use std::fmt;

use crate::parser::Entity;

/// Category of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    /// Tokenization failed or a parameter list is malformed.
    Syntax,
    /// Identifier-space violation (duplicate ids, malformed global ids).
    Schema,
    /// Graph-consistency violation (dangling references).
    Semantic,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FindingKind::Syntax => "SYNTAX",
            FindingKind::Schema => "SCHEMA",
            FindingKind::Semantic => "SEMANTIC",
        };
        f.write_str(s)
    }
}

/// Severity of a finding. Only errors affect validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Makes the file invalid.
    Error,
    /// Reported, but the file stays valid.
    Warning,
}

/// A single error or warning produced during validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Category.
    pub kind: FindingKind,
    /// Severity.
    pub severity: Severity,
    /// Id of the entity the finding belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<u64>,
    /// 1-based line number, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Human-readable message.
    pub message: String,
}

impl Finding {
    /// Create an error finding.
    pub fn error(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            entity_id: None,
            line: None,
            message: message.into(),
        }
    }

    /// Create a warning finding.
    pub fn warning(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, message)
        }
    }

    /// Attach the owning entity (its id and line).
    pub fn for_entity(mut self, entity: &Entity) -> Self {
        self.entity_id = Some(entity.id);
        self.line = Some(entity.line);
        self
    }

    /// Check if this finding makes the file invalid.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Where the finding points, as `#<id> line <n>`, `#<id>`, `line <n>` or `-`.
    pub fn location(&self) -> String {
        match (self.entity_id, self.line) {
            (Some(id), Some(line)) => format!("#{id} line {line}"),
            (Some(id), None) => format!("#{id}"),
            (None, Some(line)) => format!("line {line}"),
            (None, None) => "-".to_string(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_keeps_kind() {
        let w = Finding::warning(FindingKind::Syntax, "unterminated string");
        assert_eq!(w.kind, FindingKind::Syntax);
        assert_eq!(w.severity, Severity::Warning);
        assert!(!w.is_error());
    }

    #[test]
    fn test_display() {
        let mut e = Finding::error(FindingKind::Semantic, "Broken reference to ID 99");
        assert_eq!(e.to_string(), "[SEMANTIC] -: Broken reference to ID 99");
        e.entity_id = Some(2);
        e.line = Some(4);
        assert_eq!(e.to_string(), "[SEMANTIC] #2 line 4: Broken reference to ID 99");
    }

    #[test]
    fn test_json_shape() {
        let e = Finding::error(FindingKind::Schema, "Duplicate ID found: 1");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "SCHEMA");
        assert_eq!(json["severity"], "ERROR");
        assert!(json.get("entityId").is_none());
    }
}
