//! Parameter-list lexer.
//!
//! Splits the text between an entity's outer parentheses into top-level
//! parameter tokens. Handles:
//! - Nested groups (e.g., `(#1,#2)`), kept verbatim inside one token
//! - Strings (e.g., `'a, b'`), commas inside them do not split
//! - Doubled quotes (`'it''s'`), which toggle string mode twice
//! - Backslash escapes: `\x` passes `x` through without toggling string mode
//!
//! The lexer never fails. Open strings and groups are closed at end of line
//! and reported as a [`LexIssue`] next to the tokens.

use std::fmt;

/// Structural problem detected while splitting a parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexIssue {
    /// A quote was opened and never closed.
    UnterminatedString,
    /// A `(` was opened and never closed.
    UnclosedGroup,
    /// A `)` appeared with no open group.
    UnbalancedClose,
}

impl fmt::Display for LexIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LexIssue::UnterminatedString => "unterminated string",
            LexIssue::UnclosedGroup => "unclosed parenthesis",
            LexIssue::UnbalancedClose => "unbalanced closing parenthesis",
        };
        f.write_str(s)
    }
}

/// Raw tokens of one parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitParams<'a> {
    /// Top-level tokens in source order, trimmed of surrounding whitespace.
    pub tokens: Vec<&'a str>,
    /// Problem found while splitting, if any.
    pub issue: Option<LexIssue>,
}

/// Lexer for a single parameter list.
pub struct ParamLexer<'a> {
    text: &'a str,
    input: &'a [u8],
    pos: usize,
    depth: usize,
    in_string: bool,
    stray_close: bool,
}

impl<'a> ParamLexer<'a> {
    /// Create a new lexer for the given parameter text.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            input: text.as_bytes(),
            pos: 0,
            depth: 0,
            in_string: false,
            stray_close: false,
        }
    }

    /// Split the whole parameter text on top-level commas.
    pub fn split(mut self) -> SplitParams<'a> {
        if self.text.trim().is_empty() {
            return SplitParams {
                tokens: Vec::new(),
                issue: None,
            };
        }

        let mut tokens = Vec::new();
        let mut start = 0;
        while let Some(ch) = self.peek_char() {
            match ch {
                b'\\' => {
                    self.advance();
                    self.advance();
                }
                b'\'' => {
                    self.in_string = !self.in_string;
                    self.advance();
                }
                b'(' if !self.in_string => {
                    self.depth += 1;
                    self.advance();
                }
                b')' if !self.in_string => {
                    if self.depth == 0 {
                        self.stray_close = true;
                    } else {
                        self.depth -= 1;
                    }
                    self.advance();
                }
                b',' if !self.in_string && self.depth == 0 => {
                    tokens.push(self.text[start..self.pos].trim());
                    self.advance();
                    start = self.pos;
                }
                _ => {
                    self.advance();
                }
            }
        }
        tokens.push(self.text[start..].trim());

        SplitParams {
            tokens,
            issue: self.issue(),
        }
    }

    fn issue(&self) -> Option<LexIssue> {
        if self.in_string {
            Some(LexIssue::UnterminatedString)
        } else if self.depth > 0 {
            Some(LexIssue::UnclosedGroup)
        } else if self.stray_close {
            Some(LexIssue::UnbalancedClose)
        } else {
            None
        }
    }

    fn peek_char(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.input.get(self.pos).copied()?;
        self.pos += 1;
        Some(ch)
    }
}

/// Split a parameter list into raw top-level tokens.
pub fn split_params(text: &str) -> SplitParams<'_> {
    ParamLexer::new(text).split()
}
