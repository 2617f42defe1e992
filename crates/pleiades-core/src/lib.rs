//! Reading, writing and combining SAMMY parameter (`.par`) files.
//!
//! The crate keeps every fixed-column field as the exact text sliced
//! from its line, so an unmodified set writes back byte-for-byte;
//! typed views parse on demand and edits re-render canonically.

pub mod domain;
pub mod format;
pub mod par;

pub use domain::{ParError, ParResult, RecordKind, SectionKind, SourceIdentity};
pub use par::{
    ParameterSet, ParseOptions, compose, normalized, parse, parse_source, parse_with, render,
    write,
};
