use super::{RecordKind, SectionKind};
use std::path::PathBuf;

pub type ParResult<T> = Result<T, ParError>;

/// Failure taxonomy for the par-file subsystem.
///
/// Every variant aborts the current operation; the positional nature of
/// the format makes partial recovery unsafe, so nothing here is ever
/// downgraded to a warning.
#[derive(Debug, thiserror::Error)]
pub enum ParError {
    #[error("{kind} record line is missing or empty")]
    MalformedRecord { kind: RecordKind },

    #[error("value '{value}' does not fit field '{field}' of {kind} (width {width})")]
    FieldWidth {
        kind: RecordKind,
        field: &'static str,
        value: String,
        width: usize,
    },

    #[error("{kind} section truncated at line {line}")]
    TruncatedSection { kind: SectionKind, line: usize },

    #[error("duplicate {kind} section at line {line}")]
    DuplicateSection { kind: SectionKind, line: usize },

    #[error("cannot parse line {line}: '{content}'")]
    UnparsableLine { line: usize, content: String },

    #[error("dangling cross-reference: {0}")]
    CrossReference(String),

    #[error("parameter set holds no data to write")]
    EmptyData,

    #[error("unknown field '{field}' for {kind}")]
    UnknownField { kind: RecordKind, field: String },

    #[error("malformed numeric token '{token}' in field '{field}'")]
    BadNumber { field: &'static str, token: String },

    #[error("failed to {action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ParError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
