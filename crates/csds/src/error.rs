use thiserror::Error;

/// Why the builder refused to turn an annotation into a typed record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("missing required attribute `{0}`")]
    MissingAttribute(&'static str),

    #[error("annotation is not inside any sentence")]
    Unanchored,

    #[error("unknown attitude type `{0}`")]
    UnknownAttitudeType(String),

    #[error("attribute `{attribute}` has unexpected value `{value}`")]
    InvalidValue { attribute: &'static str, value: String },
}

impl BuildError {
    /// Unresolvable spans are reported apart from other malformed records.
    pub fn is_unanchored(&self) -> bool {
        matches!(self, BuildError::Unanchored)
    }
}

/// Something suspicious in a record that was still built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildWarning {
    #[error("ambiguous polarity `{0}`, left unset")]
    AmbiguousPolarity(String),

    #[error("unknown intensity `{value}` in `{attribute}`, left unset")]
    UnknownIntensity { attribute: &'static str, value: String },

    #[error("dropped link `{id}` in `{attribute}`: no such {expected} in this document")]
    DanglingLink {
        attribute: &'static str,
        id: String,
        expected: String,
    },
}

impl BuildWarning {
    pub fn is_dangling_link(&self) -> bool {
        matches!(self, BuildWarning::DanglingLink { .. })
    }
}
