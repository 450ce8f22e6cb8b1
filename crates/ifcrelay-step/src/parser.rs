//! Entity line parser: turns data-section lines into typed entities.
//!
//! Each line is matched against `#<id>=<TYPE>(<params>);`. The parameter text
//! is split by the [lexer](crate::lexer) and every token is classified into a
//! [`ParamValue`]. Lines that do not match are not entities and are skipped.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::lexer::{split_params, LexIssue};

static ENTITY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(\d+)\s*=\s*([A-Z][A-Z0-9_]*)\s*\((.*)\)\s*;$")
        .expect("static regex must compile")
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("static regex must compile")
});

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(\d+)$").expect("static regex must compile"));

/// A single parameter value of an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Anything that is not a reference, null, or number. Kept verbatim,
    /// quotes included (e.g. `'John'`, `.T.`, `(#1,#2)`).
    String(String),
    /// Numeric literal (e.g. `3.14`, `-1.5E-10`, `42`).
    Number(f64),
    /// Entity reference (e.g. `#123` becomes `Reference(123)`).
    Reference(u64),
    /// Unset value (`$`).
    Null,
}

impl ParamValue {
    /// Classify one raw parameter token.
    pub fn classify(raw: &str) -> Self {
        if let Some(caps) = REFERENCE.captures(raw) {
            if let Ok(id) = caps[1].parse() {
                return ParamValue::Reference(id);
            }
        }
        if raw == "$" {
            return ParamValue::Null;
        }
        if NUMBER.is_match(raw) {
            if let Ok(v) = raw.parse() {
                return ParamValue::Number(v);
            }
        }
        ParamValue::String(raw.to_string())
    }

    /// Try to get as an entity reference.
    pub fn as_reference(&self) -> Option<u64> {
        match self {
            ParamValue::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the verbatim string text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Logical text of a string value: surrounding quotes removed and doubled
    /// `''` collapsed. Unquoted strings (enumerations, groups) come back as is.
    pub fn unquoted(&self) -> Option<Cow<'_, str>> {
        let s = self.as_str()?;
        match s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
            Some(inner) if inner.contains("''") => Some(Cow::Owned(inner.replace("''", "'"))),
            Some(inner) => Some(Cow::Borrowed(inner)),
            None => Some(Cow::Borrowed(s)),
        }
    }

    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

/// A parsed data-section entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Entity ID (from `#123`), as declared in the source.
    pub id: u64,
    /// Entity type name (e.g., `IFCWALL`).
    pub type_name: String,
    /// Parameters in declaration order.
    pub params: Vec<ParamValue>,
    /// The source line, trimmed.
    pub source: String,
    /// 1-based line number.
    pub line: usize,
}

impl Entity {
    /// Ids referenced directly by this entity's parameters, in order.
    pub fn references(&self) -> impl Iterator<Item = u64> + '_ {
        self.params.iter().filter_map(ParamValue::as_reference)
    }
}

/// One successfully matched line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// The entity built from the line.
    pub entity: Entity,
    /// Parameter-list problem, if the lexer had to close something at end of line.
    pub issue: Option<LexIssue>,
}

/// Parse one data-section line. Returns `None` if the line is not an entity
/// declaration.
pub fn parse_entity_line(text: &str, line: usize) -> Option<ParsedLine> {
    let text = text.trim();
    let caps = ENTITY_LINE.captures(text)?;
    let id: u64 = caps[1].parse().ok()?;
    let split = split_params(caps.get(3).map_or("", |m| m.as_str()));

    Some(ParsedLine {
        entity: Entity {
            id,
            type_name: caps[2].to_string(),
            params: split.tokens.into_iter().map(ParamValue::classify).collect(),
            source: text.to_string(),
            line,
        },
        issue: split.issue,
    })
}
