#![warn(missing_docs)]

//! IFC data section parsing and structural validation.
//!
//! Reads the text of an IFC file (ISO 10303-21 physical file syntax), builds
//! an id-addressable entity graph from its `DATA` section, and checks it for
//! duplicate ids, dangling references, and malformed global identifiers.
//! Validation never fails: problems come back as findings in a
//! [`ValidationResult`].
//!
//! # Example
//!
//! ```
//! use ifcrelay_step::{format_report, validate};
//!
//! let content = "ISO-10303-21;
//! HEADER;
//! ENDSEC;
//! DATA;
//! #1=IFCPERSON('John');
//! #2=IFCORGANIZATION(#99);
//! ENDSEC;
//! END-ISO-10303-21;
//! ";
//!
//! let result = validate(content);
//! assert!(!result.is_valid);
//! assert_eq!(result.stats.total_entities, 2);
//! println!("{}", format_report(&result));
//! ```

mod checks;
mod config;
mod error;
mod finding;
mod graph;
mod lexer;
mod parser;
mod report;
mod section;
mod stats;
mod validate;

pub use config::{ValidatorConfig, DEFAULT_GLOBAL_ID_PATTERN, DEFAULT_GLOBAL_ID_TYPE};
pub use error::{Result, StepError};
pub use finding::{Finding, FindingKind, Severity};
pub use graph::EntityGraph;
pub use lexer::LexIssue;
pub use parser::{Entity, ParamValue};
pub use report::{format_json, format_report};
pub use section::LineNumbering;
pub use stats::{ReferenceCounts, Stats};
pub use validate::{validate, ParsedFile, ValidationResult, Validator};
