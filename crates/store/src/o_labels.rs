use csds::{AnnotationType, CsdsInstance, RecordKey};
use standoff::{CharIndex, Document, Span};

use crate::cache::TokenCache;

/// `O` instances for one document: every space-separated token of a
/// sentence that no labeled head in that sentence covers.
pub fn o_instances(doc: &Document, labeled: &[CsdsInstance], cache: &TokenCache) -> Vec<CsdsInstance> {
    let mut instances = Vec::new();

    for sentence in doc.sentences() {
        let heads: Vec<Span> = labeled
            .iter()
            .filter(|c| c.annotation_type != AnnotationType::Sentence)
            .filter(|c| c.sentence_id.as_deref() == Some(sentence.id.as_str()))
            .map(|c| Span {
                start: c.head_start,
                end: c.head_end,
            })
            .collect();

        let chars = CharIndex::new(&sentence.text);
        for token in cache.token_spans(&sentence.text).iter() {
            if heads.iter().any(|head| head.contains(token)) {
                continue;
            }
            let Some(head) = chars.slice(*token) else {
                continue;
            };

            let id = format!("{}-O-{}", sentence.id, token.start);
            instances.push(CsdsInstance {
                unique_id: RecordKey::new(&doc.name, &id),
                doc_id: doc.name.clone(),
                id,
                sentence_id: Some(sentence.id.clone()),
                text: Some(sentence.text.clone()),
                head_start: token.start,
                head_end: token.end,
                head: head.to_string(),
                annotation_type: AnnotationType::O,
                ..CsdsInstance::default()
            });
        }
    }

    instances
}

#[cfg(test)]
mod tests {
    use super::*;
    use standoff::prepare_document;
    use standoff::reader::DocumentFiles;

    #[test]
    fn test_unlabeled_tokens_become_o() {
        let files = DocumentFiles {
            name: "doc1".to_string(),
            text: "John said he likes beets.\n".to_string(),
            annotations: vec![
                (
                    "gateman".to_string(),
                    "1\t5,9\texpressive-subjectivity\tpolarity=\"negative\"\n\
                     2\t10,18\tattitude\tattitude-type=\"sentiment-pos\"\n"
                        .to_string(),
                ),
                ("gatesentences".to_string(), "1\t0,25\tsentence\t\n".to_string()),
            ],
        };
        let (doc, _, _) = prepare_document(&files);
        let labeled = csds::convert_document(&doc).csds;
        let cache = TokenCache::default();

        let o = o_instances(&doc, &labeled, &cache);
        let heads: Vec<_> = o.iter().map(|c| c.head.as_str()).collect();

        // "said" is covered by the ES, "he likes" by the attitude
        assert_eq!(heads, ["John", "beets."]);
        assert!(o.iter().all(|c| c.annotation_type == AnnotationType::O));
        assert_eq!(o[1].unique_id.as_str(), "doc1&&sentence1-O-19");
        assert_eq!(o[1].marked_text().unwrap(), "John said he likes * beets. *");
    }
}
