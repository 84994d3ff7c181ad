use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Corpus-wide record id: `<doc>&&<local id>`.
///
/// Local ids are only unique within a document, so every cross-reference is
/// qualified with the owning document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(String);

impl RecordKey {
    pub const SEPARATOR: &'static str = "&&";

    pub fn new(doc_id: &str, local_id: &str) -> Self {
        Self(format!("{}{}{}", doc_id, Self::SEPARATOR, local_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `(doc_id, local_id)`
    pub fn split(&self) -> Option<(&str, &str)> {
        self.0.split_once(Self::SEPARATOR)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RecordKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationType {
    Sentiment,
    Arguing,
    Agreement,
    Intention,
    Speculation,
    OtherAttitude,
    ExpressiveSubjectivity,
    ObjectiveSpeechEvent,
    Sentence,
    #[default]
    Unknown,
    /// Pseudo-label for un-annotated tokens.
    #[serde(rename = "O")]
    O,
}

impl AnnotationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationType::Sentiment => "sentiment",
            AnnotationType::Arguing => "arguing",
            AnnotationType::Agreement => "agreement",
            AnnotationType::Intention => "intention",
            AnnotationType::Speculation => "speculation",
            AnnotationType::OtherAttitude => "other_attitude",
            AnnotationType::ExpressiveSubjectivity => "expressive_subjectivity",
            AnnotationType::ObjectiveSpeechEvent => "objective_speech_event",
            AnnotationType::Sentence => "sentence",
            AnnotationType::Unknown => "unknown",
            AnnotationType::O => "O",
        }
    }
}

impl fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    Positive,
    Negative,
    Both,
    Neutral,
    Uncertain,
    UncertainPositive,
    UncertainNegative,
    UncertainBoth,
    UncertainNeutral,
}

impl FromStr for Polarity {
    type Err = ();

    /// Accepts the corpus spellings, including the `pos`/`neg` short forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let polarity = match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" => Polarity::Positive,
            "negative" | "neg" => Polarity::Negative,
            "both" => Polarity::Both,
            "neutral" => Polarity::Neutral,
            "uncertain" => Polarity::Uncertain,
            "uncertain-positive" | "uncertain-pos" => Polarity::UncertainPositive,
            "uncertain-negative" | "uncertain-neg" => Polarity::UncertainNegative,
            "uncertain-both" => Polarity::UncertainBoth,
            "uncertain-neutral" => Polarity::UncertainNeutral,
            _ => return Err(()),
        };
        Ok(polarity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intensity {
    Neutral,
    Low,
    LowMedium,
    Medium,
    MediumHigh,
    High,
    HighExtreme,
    Extreme,
}

impl FromStr for Intensity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let intensity = match s.trim().to_ascii_lowercase().as_str() {
            "neutral" => Intensity::Neutral,
            "low" => Intensity::Low,
            "low-medium" => Intensity::LowMedium,
            "medium" => Intensity::Medium,
            "medium-high" => Intensity::MediumHigh,
            "high" => Intensity::High,
            "high-extreme" => Intensity::HighExtreme,
            "extreme" => Intensity::Extreme,
            _ => return Err(()),
        };
        Ok(intensity)
    }
}

/// Cognitive State Data Structure: one example pairing a sentence with a
/// labeled head span inside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsdsInstance {
    pub unique_id: RecordKey,
    pub doc_id: String,
    pub id: String,
    pub sentence_id: Option<String>,
    /// Sentence containing the head; `None` for sentence records themselves.
    pub text: Option<String>,
    pub head_start: usize,
    pub head_end: usize,
    pub head: String,
    pub belief: Option<String>,
    pub polarity: Option<Polarity>,
    pub intensity: Option<Intensity>,
    pub expression_intensity: Option<Intensity>,
    pub implicit: Option<bool>,
    pub annotation_type: AnnotationType,
    pub target_link: Vec<RecordKey>,
    pub nested_source_link: Vec<RecordKey>,
    pub attitude_link: Vec<RecordKey>,
}

impl CsdsInstance {
    /// Sentence with the head wrapped in `* ... *`.
    pub fn marked_text(&self) -> Option<String> {
        let text = self.text.as_deref()?;
        let chars: Vec<char> = text.chars().collect();
        if self.head_start > self.head_end || self.head_end > chars.len() {
            return None;
        }
        let before: String = chars[..self.head_start].iter().collect();
        let head: String = chars[self.head_start..self.head_end].iter().collect();
        let after: String = chars[self.head_end..].iter().collect();
        Some(format!("{}* {} *{}", before, head, after))
    }

    pub fn info_short(&self) -> String {
        format!(
            "<CSDS Doc: {} Sentence: {} Head: {}..{} Text: {} Head: {} Type: {} Polarity: {:?}>",
            self.doc_id,
            self.sentence_id.as_deref().unwrap_or("-"),
            self.head_start,
            self.head_end,
            self.text.as_deref().unwrap_or("-"),
            self.head,
            self.annotation_type,
            self.polarity,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target_kind")]
pub enum TargetKind {
    #[serde(rename = "target")]
    Target,
    #[serde(rename = "targetFrame")]
    TargetFrame,
    #[serde(rename = "sTarget")]
    STarget {
        target_uncertain: Option<String>,
        /// eTargets covered by this span.
        etarget_link: Vec<RecordKey>,
    },
    #[serde(rename = "eTarget")]
    ETarget {
        etarget_type: String,
        is_negated: bool,
        is_referred_in_span: bool,
    },
}

/// What an attitude or expression is directed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub unique_id: RecordKey,
    pub doc_id: String,
    pub id: String,
    pub sentence_id: Option<String>,
    pub text: String,
    pub head_start: usize,
    pub head_end: usize,
    pub head: String,
    /// Raw annotation type, e.g. `target-speech` or `sTarget`.
    pub annotation_type: String,
    #[serde(flatten)]
    pub kind: TargetKind,
}

/// Span value used when an agent has no literal text.
pub const NO_SPAN: i64 = -1;

/// Source of a private state or speech event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub unique_id: RecordKey,
    pub doc_id: String,
    pub id: String,
    /// `None` means the agent sits in no sentence; only the writer does.
    pub sentence_id: Option<String>,
    pub text: Option<String>,
    pub head_start: i64,
    pub head_end: i64,
    pub head: String,
    pub agent_uncertain: Option<String>,
    /// Agent chain from the writer down to the immediate source.
    pub nested_source: Vec<RecordKey>,
}

impl Agent {
    /// True for the implicit writer agent. Agents outside every sentence are
    /// never built, so the `-1` span is reserved for it.
    pub fn is_writer(&self) -> bool {
        self.head_start == NO_SPAN && self.head_end == NO_SPAN
    }
}

/// Output of the record builder for one annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltRecord {
    Csds(CsdsInstance),
    Target(Target),
    Agent(Agent),
}
