use std::collections::HashMap;

use crate::error::{BuildError, BuildWarning};
use crate::schema::{AnnotationType, Intensity, Polarity};

/// Tokens that mark the first hyphen segment as part of the polarity itself.
const POLARITY_TOKENS: &[&str] = &["positive", "negative", "both", "neutral", "uncertain", "pos", "neg"];

/// Maps corpus type vocabulary to [`AnnotationType`].
pub struct TypeMapper {
    /// Maps corpus spelling -> annotation type
    aliases: HashMap<&'static str, AnnotationType>,
}

impl TypeMapper {
    pub fn new() -> Self {
        let aliases = HashMap::from([
            ("sentiment", AnnotationType::Sentiment),
            ("arguing", AnnotationType::Arguing),
            ("agreement", AnnotationType::Agreement),
            ("intention", AnnotationType::Intention),
            ("speculation", AnnotationType::Speculation),
            // misspelling found in the corpus
            ("specilation", AnnotationType::Speculation),
            ("other-attitude", AnnotationType::OtherAttitude),
            ("other_attitude", AnnotationType::OtherAttitude),
            ("expressive_subjectivity", AnnotationType::ExpressiveSubjectivity),
            ("objective-speech-event", AnnotationType::ObjectiveSpeechEvent),
            ("sentence", AnnotationType::Sentence),
            ("unknown", AnnotationType::Unknown),
        ]);
        Self { aliases }
    }

    pub fn map(&self, key: &str) -> Option<AnnotationType> {
        self.aliases.get(key.trim()).copied()
    }

    /// Type and polarity from an `attitude-type` value such as `sentiment-pos`.
    ///
    /// Any `other` substring makes the whole record `other_attitude`. Otherwise
    /// the last hyphen segment gives the polarity and the one before it the
    /// type, with any `agree*` segment read as agreement.
    pub fn attitude_type(&self, raw: &str) -> Result<(AnnotationType, Option<Polarity>), BuildError> {
        let raw = raw.trim();
        if raw.contains("other") {
            return Ok((AnnotationType::OtherAttitude, None));
        }

        if !raw.contains('-') {
            let kind = self
                .map(raw)
                .ok_or_else(|| BuildError::UnknownAttitudeType(raw.to_string()))?;
            return Ok((kind, None));
        }

        let segments: Vec<&str> = raw.split('-').collect();
        let last = segments[segments.len() - 1];
        let kind_segment = segments[segments.len() - 2];

        let polarity = if last.contains("pos") {
            Polarity::Positive
        } else {
            Polarity::Negative
        };
        let kind = if kind_segment.contains("agree") {
            AnnotationType::Agreement
        } else {
            self.map(kind_segment)
                .ok_or_else(|| BuildError::UnknownAttitudeType(raw.to_string()))?
        };

        Ok((kind, Some(polarity)))
    }
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Polarity from an expressive-subjectivity `polarity` or `ese-type` value.
///
/// - no hyphen: the value itself (`positive`)
/// - one hyphen: both segments when the first is a polarity token
///   (`uncertain-negative`), else the second (`writer-negative` -> `negative`)
/// - two hyphens: the last two segments (`x-uncertain-positive`)
///
/// Anything else, or a result outside the polarity vocabulary, is ambiguous.
pub fn expressive_polarity(raw: &str) -> Result<Polarity, BuildWarning> {
    let raw = raw.trim();
    let segments: Vec<&str> = raw.split('-').collect();

    let candidate = match segments.as_slice() {
        [single] => single.to_string(),
        [first, second] if POLARITY_TOKENS.contains(first) => format!("{}-{}", first, second),
        [_, second] => second.to_string(),
        [_, second, third] => format!("{}-{}", second, third),
        _ => return Err(BuildWarning::AmbiguousPolarity(raw.to_string())),
    };

    candidate
        .parse()
        .map_err(|_| BuildWarning::AmbiguousPolarity(raw.to_string()))
}

pub fn parse_intensity(attribute: &'static str, raw: &str) -> Result<Intensity, BuildWarning> {
    raw.parse().map_err(|_| BuildWarning::UnknownIntensity {
        attribute,
        value: raw.to_string(),
    })
}

/// Yes/no style flags (`isNegated`, `implicit`, ...).
pub fn parse_flag(attribute: &'static str, raw: &str) -> Result<bool, BuildError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" => Ok(true),
        "no" | "false" | "" => Ok(false),
        _ => Err(BuildError::InvalidValue {
            attribute,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expressive_polarity_branches() {
        assert_eq!(expressive_polarity("writer-negative"), Ok(Polarity::Negative));
        assert_eq!(expressive_polarity("positive"), Ok(Polarity::Positive));
        assert_eq!(expressive_polarity("uncertain-negative"), Ok(Polarity::UncertainNegative));
        assert_eq!(expressive_polarity("sentiment-pos"), Ok(Polarity::Positive));
        assert_eq!(expressive_polarity("x-uncertain-both"), Ok(Polarity::UncertainBoth));
    }

    #[test]
    fn test_ambiguous_polarity_is_flagged() {
        assert!(matches!(
            expressive_polarity("a-b-c-d"),
            Err(BuildWarning::AmbiguousPolarity(_))
        ));
        assert!(matches!(
            expressive_polarity("writer-sideways"),
            Err(BuildWarning::AmbiguousPolarity(_))
        ));
    }

    #[test]
    fn test_agreement_attitude() {
        let mapper = TypeMapper::new();
        assert_eq!(
            mapper.attitude_type("agreement-pos"),
            Ok((AnnotationType::Agreement, Some(Polarity::Positive)))
        );
        assert_eq!(
            mapper.attitude_type("agree-neg"),
            Ok((AnnotationType::Agreement, Some(Polarity::Negative)))
        );
    }

    #[test]
    fn test_other_attitude_ignores_polarity() {
        let mapper = TypeMapper::new();
        assert_eq!(
            mapper.attitude_type("other-attitude-neg"),
            Ok((AnnotationType::OtherAttitude, None))
        );
    }

    #[test]
    fn test_plain_and_unknown_attitude_types() {
        let mapper = TypeMapper::new();
        assert_eq!(mapper.attitude_type("specilation"), Ok((AnnotationType::Speculation, None)));
        assert_eq!(
            mapper.attitude_type("sentiment-neg"),
            Ok((AnnotationType::Sentiment, Some(Polarity::Negative)))
        );
        assert!(matches!(
            mapper.attitude_type("gossip-pos"),
            Err(BuildError::UnknownAttitudeType(_))
        ));
    }

    #[test]
    fn test_flags() {
        assert_eq!(parse_flag("isNegated", "yes"), Ok(true));
        assert_eq!(parse_flag("isNegated", "False"), Ok(false));
        assert!(parse_flag("isNegated", "maybe").is_err());
    }
}
