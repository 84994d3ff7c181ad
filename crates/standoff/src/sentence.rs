use serde::Serialize;
use tracing::warn;

use crate::document::{Category, Document, Sentence, SentenceAnchor};
use crate::span::Span;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LocateStats {
    pub sentences: usize,
    pub located: usize,
    pub unlocated: usize,
    pub overlapping_sentences: usize,
}

/// Finds the sentence containing a document span.
///
/// Sentences are kept sorted by span and the earliest containing sentence
/// wins. A lookup is a binary search for the last sentence starting at or
/// before the span, then a short walk back over sentences still open at the
/// span's start. The walk is only bounded while sentence ends never decrease;
/// nested sentences fall back to a forward scan.
pub struct SentenceLocator {
    // (span, position in Document::sentences), sorted by span
    sorted: Vec<(Span, usize)>,
    nested: bool,
}

impl SentenceLocator {
    pub fn new(sentences: &[Sentence]) -> Self {
        let mut sorted: Vec<(Span, usize)> = sentences.iter().map(|s| (s.span, s.index)).collect();
        sorted.sort();
        let nested = sorted.windows(2).any(|w| w[0].0.end > w[1].0.end);
        Self { sorted, nested }
    }

    pub fn locate(&self, span: Span) -> Option<(usize, Span)> {
        let candidates = &self.sorted[..self.sorted.partition_point(|(s, _)| s.start <= span.start)];
        let found = if self.nested {
            candidates.iter().find(|(s, _)| s.contains(&span))
        } else {
            candidates
                .iter()
                .rev()
                .take_while(|(s, _)| s.end >= span.start)
                .filter(|(s, _)| s.contains(&span))
                .last()
        };
        found.map(|(s, index)| (*index, Span { start: span.start - s.start, end: span.end - s.start }))
    }

    /// Pairs of sentences whose spans overlap.
    pub fn overlaps(&self) -> usize {
        self.sorted.windows(2).filter(|w| w[0].0.overlaps(&w[1].0)).count()
    }
}

/// Build the document's sentence list and anchor every other record to the
/// sentence containing it.
///
/// Records outside every sentence keep `anchor == None`; the record builder
/// later refuses them.
pub fn locate_sentences(doc: &mut Document) -> LocateStats {
    let mut sentences: Vec<Sentence> = doc
        .in_category(&Category::Sentence)
        .map(|r| Sentence {
            index: 0,
            id: r.id.clone(),
            span: r.span_in_doc,
            text: r.head.clone(),
        })
        .collect();
    sentences.sort_by_key(|s| s.span);
    for (index, sentence) in sentences.iter_mut().enumerate() {
        sentence.index = index;
    }

    let locator = SentenceLocator::new(&sentences);
    let mut stats = LocateStats {
        sentences: sentences.len(),
        overlapping_sentences: locator.overlaps(),
        ..LocateStats::default()
    };
    if stats.overlapping_sentences > 0 {
        warn!(doc = %doc.name, pairs = stats.overlapping_sentences, "Sentence annotations overlap");
    }

    for record in doc.records.iter_mut() {
        if record.category == Category::Sentence {
            continue;
        }
        match locator.locate(record.span_in_doc) {
            Some((sentence, span_in_sentence)) => {
                record.anchor = Some(SentenceAnchor { sentence, span_in_sentence });
                stats.located += 1;
            }
            None => {
                record.anchor = None;
                stats.unlocated += 1;
                // The writer agent has no span and is expected to miss.
                if !(record.category == Category::Agent && record.span_in_doc.is_writer_sentinel()) {
                    warn!(
                        doc = %doc.name,
                        record = %record.id,
                        start = record.span_in_doc.start,
                        end = record.span_in_doc.end,
                        "Annotation is not inside any sentence"
                    );
                }
            }
        }
    }

    doc.sentences = sentences;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "John said he likes beets. Mary did not.";

    fn doc() -> Document {
        let anns = "1\t5,9\tattitude\t\n\
                    2\t26,30\tagent\t\n\
                    3\t20,30\tattitude\t\n\
                    4\t0,0\tagent\tid=\"w\"\n";
        let sentences = "2\t26,39\tstring\tGATE_sentence\n\
                         1\t0,25\tstring\tGATE_sentence\n";
        Document::parse("d", TEXT, [("anns", anns), ("sentences", sentences)]).0
    }

    #[test]
    fn test_sentence_relative_spans() {
        let mut doc = doc();
        let stats = locate_sentences(&mut doc);
        assert_eq!(stats.sentences, 2);

        let said = doc.get("1").unwrap();
        let anchor = said.anchor.unwrap();
        assert_eq!(anchor.span_in_sentence, Span::new(5, 9).unwrap());
        assert_eq!(doc.sentence_of(said).unwrap().id, "sentence1");

        let mary = doc.get("2").unwrap();
        assert_eq!(mary.anchor.unwrap().span_in_sentence, Span::new(0, 4).unwrap());
        assert_eq!(doc.sentence_of(mary).unwrap().text, "Mary did not.");
    }

    #[test]
    fn test_sentences_are_ordered_and_disjoint() {
        let mut doc = doc();
        let stats = locate_sentences(&mut doc);
        assert_eq!(stats.overlapping_sentences, 0);
        let sentences = doc.sentences();
        for (i, pair) in sentences.windows(2).enumerate() {
            assert_eq!(pair[0].index, i);
            assert!(pair[0].span.end <= pair[1].span.start);
        }
    }

    #[test]
    fn test_spanning_annotation_is_unlocated() {
        let mut doc = doc();
        let stats = locate_sentences(&mut doc);
        assert!(doc.get("3").unwrap().anchor.is_none());
        assert_eq!(stats.unlocated, 1);
        assert_eq!(stats.located, 3);
        // [0,0) falls inside the first sentence like any other span
        assert!(doc.get("w").unwrap().anchor.is_some());
    }

    #[test]
    fn test_nested_sentences_pick_earliest_container() {
        let text = "a".repeat(40);
        let sentences = "1\t0,30\tstring\tGATE_sentence\n\
                         2\t5,10\tstring\tGATE_sentence\n\
                         3\t12,20\tstring\tGATE_sentence\n";
        let anns = "9\t15,25\tattitude\t\n\
                    8\t6,8\tattitude\t\n";
        let (mut doc, _) = Document::parse("d", &text, [("sentences", sentences), ("anns", anns)]);
        let stats = locate_sentences(&mut doc);

        assert_eq!(stats.unlocated, 0);
        assert_eq!(doc.sentence_of(doc.get("9").unwrap()).unwrap().id, "sentence1");
        assert_eq!(doc.get("9").unwrap().anchor.unwrap().span_in_sentence, Span::new(15, 25).unwrap());
        assert_eq!(doc.sentence_of(doc.get("8").unwrap()).unwrap().id, "sentence1");
    }

    #[test]
    fn test_empty_span_on_boundary_takes_first_sentence() {
        let sentences = "1\t0,25\tstring\tGATE_sentence\n\
                         2\t25,39\tstring\tGATE_sentence\n";
        let (mut doc, _) = Document::parse("d", TEXT, [("sentences", sentences)]);
        locate_sentences(&mut doc);
        let sentences = doc.sentences().to_vec();
        let locator = SentenceLocator::new(&sentences);
        let (index, span) = locator.locate(Span::new(25, 25).unwrap()).unwrap();
        assert_eq!(sentences[index].id, "sentence1");
        assert_eq!(span, Span::new(25, 25).unwrap());
    }

    #[test]
    fn test_relative_span_within_sentence_text() {
        let mut doc = doc();
        locate_sentences(&mut doc);
        for record in doc.records() {
            if let Some(anchor) = record.anchor {
                let sentence = doc.sentence_of(record).unwrap();
                let span = anchor.span_in_sentence;
                assert!(span.start <= span.end);
                assert!(span.end <= sentence.text.chars().count());
            }
        }
    }
}
