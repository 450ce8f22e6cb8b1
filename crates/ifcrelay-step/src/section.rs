//! Data section extraction.
//!
//! Finds the `DATA;` ... `ENDSEC;` region of a Part 21 file and breaks it into
//! candidate entity lines. The `HEADER` section and anything after the data
//! section's `ENDSEC;` are ignored.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, StepError};

// Markers only count at a statement boundary: start of a line or after `;`.
static DATA_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?:^|;)\s*DATA\s*;").expect("static regex must compile"));

static ENDSEC_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?:^|;)\s*(ENDSEC)\s*;").expect("static regex must compile"));

/// Which line number an entity reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineNumbering {
    /// Line number in the raw source text.
    #[default]
    Source,
    /// Position among the non-blank, non-comment lines of the data section.
    Filtered,
}

/// A candidate entity line from the data section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLine<'a> {
    /// Line text, `\r` stripped.
    pub text: &'a str,
    /// 1-based line number in the whole source.
    pub source_line: usize,
    /// 1-based position among the kept lines.
    pub filtered_line: usize,
}

impl SectionLine<'_> {
    /// The line number selected by `numbering`.
    pub fn number(&self, numbering: LineNumbering) -> usize {
        match numbering {
            LineNumbering::Source => self.source_line,
            LineNumbering::Filtered => self.filtered_line,
        }
    }
}

/// Interior of the data section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSection<'a> {
    /// Text between `DATA;` and `ENDSEC;`.
    pub body: &'a str,
    /// 1-based source line on which `body` starts.
    pub first_line: usize,
}

impl<'a> DataSection<'a> {
    /// Locate the data section in `content`.
    pub fn extract(content: &'a str) -> Result<Self> {
        let data = DATA_MARKER
            .find(content)
            .ok_or(StepError::MissingDataSection)?;
        let rest = &content[data.end()..];
        let endsec = ENDSEC_MARKER
            .captures(rest)
            .and_then(|caps| caps.get(1))
            .ok_or(StepError::MissingDataSection)?;

        Ok(Self {
            body: &rest[..endsec.start()],
            first_line: content[..data.end()].matches('\n').count() + 1,
        })
    }

    /// Non-blank, non-comment lines in source order.
    pub fn lines(&self) -> impl Iterator<Item = SectionLine<'a>> {
        let first_line = self.first_line;
        self.body
            .split('\n')
            .enumerate()
            .map(move |(i, raw)| (first_line + i, raw.strip_suffix('\r').unwrap_or(raw)))
            .filter(|(_, text)| !is_irrelevant(text))
            .enumerate()
            .map(|(kept, (source_line, text))| SectionLine {
                text,
                source_line,
                filtered_line: kept + 1,
            })
    }
}

fn is_irrelevant(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || (line.starts_with("/*") && line.ends_with("*/"))
}
