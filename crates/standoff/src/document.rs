use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use crate::attributes::{AttrValue, Attributes};
use crate::error::LineError;
use crate::line::{AnnotationLine, parse_line};
use crate::span::{CharIndex, Span};

/// Annotation category, taken from the annotation-type column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Agent,
    ExpressiveSubjectivity,
    DirectSubjective,
    ObjectiveSpeechEvent,
    Attitude,
    Target,
    TargetSpeech,
    Sentence,
    ETarget,
    STarget,
    TargetFrame,
    /// Not part of the known schema; kept but reported.
    Other(String),
}

impl Category {
    pub fn from_anno_type(anno_type: &str) -> Self {
        match anno_type {
            "agent" => Category::Agent,
            "expressive-subjectivity" => Category::ExpressiveSubjectivity,
            "direct-subjective" => Category::DirectSubjective,
            "objective-speech-event" => Category::ObjectiveSpeechEvent,
            "attitude" => Category::Attitude,
            "target" => Category::Target,
            "target-speech" => Category::TargetSpeech,
            "sentence" => Category::Sentence,
            "eTarget" => Category::ETarget,
            "sTarget" => Category::STarget,
            "targetFrame" => Category::TargetFrame,
            other => Category::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Agent => "agent",
            Category::ExpressiveSubjectivity => "expressive-subjectivity",
            Category::DirectSubjective => "direct-subjective",
            Category::ObjectiveSpeechEvent => "objective-speech-event",
            Category::Attitude => "attitude",
            Category::Target => "target",
            Category::TargetSpeech => "target-speech",
            Category::Sentence => "sentence",
            Category::ETarget => "eTarget",
            Category::STarget => "sTarget",
            Category::TargetFrame => "targetFrame",
            Category::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a record sits inside its sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceAnchor {
    /// Position in [`Document::sentences`].
    pub sentence: usize,
    pub span_in_sentence: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub id: String,
    pub line_id: String,
    pub category: Category,
    pub span_in_doc: Span,
    /// Document text covered by `span_in_doc`.
    pub head: String,
    pub attributes: Attributes,
    pub anchor: Option<SentenceAnchor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    pub index: usize,
    pub id: String,
    pub span: Span,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub lines: usize,
    pub records: usize,
    pub malformed_lines: usize,
    pub schema_warnings: usize,
}

/// All annotation records of one document, stored as an arena with an
/// id -> position index and a per-category id list.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub text: String,
    pub(crate) records: Vec<AnnotationRecord>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) categories: Vec<(Category, Vec<usize>)>,
    pub(crate) sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            records: Vec::new(),
            index: HashMap::new(),
            categories: Vec::new(),
            sentences: Vec::new(),
        }
    }

    /// Parse annotation files for this document.
    ///
    /// `sources` are `(file name, file content)` pairs; file names only
    /// appear in log output. Bad lines are logged and skipped.
    pub fn parse<'a, I>(name: &str, text: &str, sources: I) -> (Self, ParseStats)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut doc = Document::new(name, text);
        let mut stats = ParseStats::default();
        let chars = CharIndex::new(text);

        for (source, content) in sources {
            for (line_no, raw) in content.lines().enumerate() {
                stats.lines += 1;
                let outcome = parse_line(raw).and_then(|line| match line {
                    Some(line) => doc.push_line(line, &chars).map(Some),
                    None => Ok(None),
                });

                match outcome {
                    Ok(Some(category)) => {
                        stats.records += 1;
                        if !category.is_known() {
                            stats.schema_warnings += 1;
                            warn!(doc = %name, source, line = line_no + 1, anno_type = %category, "Unknown annotation type");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        stats.malformed_lines += 1;
                        warn!(doc = %name, source, line = line_no + 1, error = %e, "Skipping malformed annotation line");
                    }
                }
            }
        }

        debug!(doc = %name, records = stats.records, "Parsed annotation files");
        (doc, stats)
    }

    fn push_line(&mut self, mut line: AnnotationLine, chars: &CharIndex<'_>) -> Result<Category, LineError> {
        let span = chars.clamp(line.span);
        if span != line.span {
            warn!(
                doc = %self.name,
                line_id = %line.line_id,
                start = line.span.start,
                end = line.span.end,
                len = chars.char_len(),
                "Span runs past the document text, clamping"
            );
        }
        let head = chars.slice(span).unwrap_or_default();

        let category = Category::from_anno_type(&line.anno_type);
        let mut id = match line.attributes.remove("id") {
            Some(AttrValue::Scalar(id)) if !id.is_empty() => id,
            _ => line.line_id.clone(),
        };
        // Sentence ids come from a separate file and collide with line ids.
        if category == Category::Sentence {
            id = format!("sentence{}", id);
        }
        if self.index.contains_key(&id) {
            return Err(LineError::DuplicateId(id));
        }

        let position = self.records.len();
        self.index.insert(id.clone(), position);
        match self.categories.iter_mut().find(|(c, _)| *c == category) {
            Some((_, ids)) => ids.push(position),
            None => self.categories.push((category.clone(), vec![position])),
        }

        self.records.push(AnnotationRecord {
            id,
            line_id: line.line_id,
            category: category.clone(),
            span_in_doc: span,
            head: head.to_string(),
            attributes: line.attributes,
            anchor: None,
        });

        Ok(category)
    }

    pub fn get(&self, id: &str) -> Option<&AnnotationRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    /// Records of one category in file order.
    pub fn in_category<'a>(&'a self, category: &Category) -> impl Iterator<Item = &'a AnnotationRecord> + 'a {
        self.categories
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, ids)| ids.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.records[i])
    }

    /// Categories present in this document, in order of first appearance.
    pub fn categories(&self) -> impl Iterator<Item = (&Category, usize)> {
        self.categories.iter().map(|(c, ids)| (c, ids.len()))
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// The sentence a record was placed in, if any.
    pub fn sentence_of(&self, record: &AnnotationRecord) -> Option<&Sentence> {
        record.anchor.and_then(|a| self.sentences.get(a.sentence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "John said he likes beets.";

    #[test]
    fn test_parse_document() {
        let anns = "# header\n\
                    1\t0,0\tagent\tid=\"w\" nested-source=\"w\"\n\
                    2\t5,9\texpressive-subjectivity\tpolarity=\"writer-negative\" nested-source=\"w\"\n";
        let sentences = "1\t0,25\tstring\tGATE_sentence\n";
        let (doc, stats) = Document::parse("doc1", TEXT, [("gateman", anns), ("gatesentences", sentences)]);

        assert_eq!(stats.records, 3);
        assert_eq!(stats.malformed_lines, 0);
        assert_eq!(doc.get("w").unwrap().category, Category::Agent);
        assert_eq!(doc.get("2").unwrap().head, "said");
        assert_eq!(doc.get("sentence1").unwrap().head, TEXT);
        assert!(!doc.get("w").unwrap().attributes.contains("id"));
        assert_eq!(doc.in_category(&Category::Sentence).count(), 1);
    }

    #[test]
    fn test_unknown_type_is_kept() {
        let (doc, stats) = Document::parse("d", TEXT, [("a", "1\t0,4\tmystery\t\n")]);
        assert_eq!(stats.schema_warnings, 1);
        assert_eq!(doc.get("1").unwrap().category, Category::Other("mystery".to_string()));
    }

    #[test]
    fn test_bad_lines_do_not_abort() {
        let anns = "1\t0,4\tagent\n\
                    oops\n\
                    2\t0,400\tagent\t\n\
                    3\t5,9\tattitude\tattitude-type=\"sentiment-pos\"\n\
                    3\t5,9\tattitude\t\n";
        let (doc, stats) = Document::parse("d", TEXT, [("a", anns)]);
        assert_eq!(stats.malformed_lines, 2);
        assert_eq!(stats.records, 3);
        assert!(doc.get("3").is_some());
    }

    #[test]
    fn test_span_past_text_is_clamped() {
        let sentences = "1\t0,26\tstring\tGATE_sentence\n";
        let anns = "2\t20,40\tagent\t\n";
        let (doc, stats) = Document::parse("d", TEXT, [("gatesentences", sentences), ("gateman", anns)]);

        assert_eq!(stats.malformed_lines, 0);
        let sentence = doc.get("sentence1").unwrap();
        assert_eq!(sentence.span_in_doc, Span::new(0, 25).unwrap());
        assert_eq!(sentence.head, TEXT);
        assert_eq!(doc.get("2").unwrap().head, "eets.");
    }
}
