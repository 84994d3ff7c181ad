use thiserror::Error;

/// A stand-off line that cannot become an annotation record.
///
/// These are never fatal: the parser logs them and moves to the next line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("expected at least 3 tab-separated fields, found {0}")]
    FieldCount(usize),

    #[error("malformed span `{0}`")]
    BadSpan(String),

    #[error("cannot parse attributes near `{0}`")]
    BadAttribute(String),

    #[error("duplicate annotation id `{0}`")]
    DuplicateId(String),
}
