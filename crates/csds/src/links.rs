use standoff::{AnnotationRecord, Category, Document};
use tracing::warn;

use crate::error::BuildWarning;
use crate::schema::RecordKey;

/// Resolves id references inside one document's attributes into
/// document-qualified [`RecordKey`]s.
///
/// Ids that do not name a record of the expected category are dropped and
/// reported; the rest of the link list survives.
pub struct LinkResolver<'a> {
    doc: &'a Document,
}

impl<'a> LinkResolver<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self { doc }
    }

    /// Resolve every id of `attribute` on `record` against `expected`.
    pub fn resolve(
        &self,
        record: &AnnotationRecord,
        attribute: &'static str,
        expected: Category,
        warnings: &mut Vec<BuildWarning>,
    ) -> Vec<RecordKey> {
        self.resolve_ids(record, attribute, record.attributes.ids(attribute), &expected, warnings)
    }

    fn resolve_ids(
        &self,
        owner: &AnnotationRecord,
        attribute: &'static str,
        ids: &[String],
        expected: &Category,
        warnings: &mut Vec<BuildWarning>,
    ) -> Vec<RecordKey> {
        let mut keys = Vec::with_capacity(ids.len());
        for id in ids {
            match self.doc.get(id) {
                Some(linked) if linked.category == *expected => {
                    push_unique(&mut keys, RecordKey::new(&self.doc.name, id));
                }
                _ => {
                    warn!(
                        doc = %self.doc.name,
                        record = %owner.id,
                        attribute,
                        id = %id,
                        expected = %expected,
                        "Dropping unresolvable link"
                    );
                    warnings.push(BuildWarning::DanglingLink {
                        attribute,
                        id: id.clone(),
                        expected: expected.to_string(),
                    });
                }
            }
        }
        keys
    }

    pub fn nested_source(&self, record: &AnnotationRecord, warnings: &mut Vec<BuildWarning>) -> Vec<RecordKey> {
        self.resolve(record, "nested-source", Category::Agent, warnings)
    }

    pub fn attitudes(&self, record: &AnnotationRecord, warnings: &mut Vec<BuildWarning>) -> Vec<RecordKey> {
        self.resolve(record, "attitude-link", Category::Attitude, warnings)
    }

    pub fn etargets(&self, record: &AnnotationRecord, warnings: &mut Vec<BuildWarning>) -> Vec<RecordKey> {
        self.resolve(record, "eTarget-link", Category::ETarget, warnings)
    }

    pub fn speech_targets(&self, record: &AnnotationRecord, warnings: &mut Vec<BuildWarning>) -> Vec<RecordKey> {
        self.resolve(record, "target-speech-link", Category::TargetSpeech, warnings)
    }

    /// Targets reached through `targetFrame-link`.
    ///
    /// A target frame is an indirection: its own entity-target and
    /// span-target links are unioned into the result.
    pub fn frame_targets(&self, record: &AnnotationRecord, warnings: &mut Vec<BuildWarning>) -> Vec<RecordKey> {
        let mut keys = Vec::new();
        for frame_id in record.attributes.ids("targetFrame-link") {
            let Some(frame) = self.doc.get(frame_id).filter(|f| f.category == Category::TargetFrame) else {
                warn!(doc = %self.doc.name, record = %record.id, id = %frame_id, "Dropping unresolvable target frame");
                warnings.push(BuildWarning::DanglingLink {
                    attribute: "targetFrame-link",
                    id: frame_id.clone(),
                    expected: Category::TargetFrame.to_string(),
                });
                continue;
            };

            let etarget_attr = if frame.attributes.contains("newETarget-link") {
                "newETarget-link"
            } else {
                "eTarget-link"
            };
            let etargets = self.resolve_ids(
                record,
                etarget_attr,
                frame.attributes.ids(etarget_attr),
                &Category::ETarget,
                warnings,
            );
            let stargets = self.resolve_ids(
                record,
                "sTarget-link",
                frame.attributes.ids("sTarget-link"),
                &Category::STarget,
                warnings,
            );
            for key in etargets.into_iter().chain(stargets) {
                push_unique(&mut keys, key);
            }
        }
        keys
    }

    /// Targets of an attitude or expression: direct `target-link` ids plus
    /// whatever its target frames point at.
    pub fn targets(&self, record: &AnnotationRecord, warnings: &mut Vec<BuildWarning>) -> Vec<RecordKey> {
        let mut keys = self.resolve(record, "target-link", Category::Target, warnings);
        for key in self.frame_targets(record, warnings) {
            push_unique(&mut keys, key);
        }
        keys
    }
}

fn push_unique(keys: &mut Vec<RecordKey>, key: RecordKey) {
    if !keys.contains(&key) {
        keys.push(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use standoff::prepare_document;
    use standoff::reader::DocumentFiles;

    fn doc(anns: &str) -> Document {
        let files = DocumentFiles {
            name: "d1".to_string(),
            text: "John said he likes beets.\n".to_string(),
            annotations: vec![
                ("anns".to_string(), anns.to_string()),
                ("sentences".to_string(), "1\t0,26\tsentence\t\n".to_string()),
            ],
        };
        prepare_document(&files).0
    }

    #[test]
    fn test_missing_etarget_is_dropped() {
        let doc = doc("1\t19,24\teTarget\tid=\"e1\" type=\"entity\"\n\
                       2\t13,24\tsTarget\tid=\"s1\" eTarget-link=\"e1,e9\"\n");
        let mut warnings = Vec::new();
        let keys = LinkResolver::new(&doc).etargets(doc.get("s1").unwrap(), &mut warnings);

        assert_eq!(keys, [RecordKey::new("d1", "e1")]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].is_dangling_link());
    }

    #[test]
    fn test_wrong_category_is_dropped() {
        let doc = doc("1\t0,4\tagent\tid=\"src\"\n\
                       2\t13,24\tsTarget\tid=\"s1\" eTarget-link=\"src\"\n");
        let mut warnings = Vec::new();
        let keys = LinkResolver::new(&doc).etargets(doc.get("s1").unwrap(), &mut warnings);
        assert!(keys.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_target_frame_indirection() {
        let doc = doc("1\t19,24\teTarget\tid=\"e1\" type=\"entity\"\n\
                       2\t13,24\tsTarget\tid=\"s1\" eTarget-link=\"e1\"\n\
                       3\t13,24\ttargetFrame\tid=\"tf1\" newETarget-link=\"e1\" sTarget-link=\"s1\"\n\
                       4\t5,9\tattitude\tid=\"a1\" targetFrame-link=\"tf1\"\n");
        let mut warnings = Vec::new();
        let keys = LinkResolver::new(&doc).targets(doc.get("a1").unwrap(), &mut warnings);

        assert_eq!(keys, [RecordKey::new("d1", "e1"), RecordKey::new("d1", "s1")]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_frame_without_new_etargets_uses_etarget_link() {
        let doc = doc("1\t19,24\teTarget\tid=\"e1\" type=\"entity\"\n\
                       2\t13,24\ttargetFrame\tid=\"tf1\" eTarget-link=\"e1\"\n\
                       3\t5,9\tattitude\tid=\"a1\" targetFrame-link=\"tf1\"\n");
        let mut warnings = Vec::new();
        let keys = LinkResolver::new(&doc).frame_targets(doc.get("a1").unwrap(), &mut warnings);

        assert_eq!(keys, [RecordKey::new("d1", "e1")]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_dangling_target_frame_is_dropped() {
        let doc = doc("1\t0,4\ttarget\tid=\"t1\"\n\
                       2\t5,9\tattitude\tid=\"a1\" target-link=\"t1\" targetFrame-link=\"tf404,t1\"\n");
        let mut warnings = Vec::new();
        let keys = LinkResolver::new(&doc).targets(doc.get("a1").unwrap(), &mut warnings);

        // t1 is a plain target, not a frame, so it only counts through target-link
        assert_eq!(keys, [RecordKey::new("d1", "t1")]);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| matches!(
            w,
            BuildWarning::DanglingLink { attribute: "targetFrame-link", .. }
        )));
    }

    #[test]
    fn test_nested_source_chain_is_document_scoped() {
        let doc = doc("1\t0,0\tagent\tid=\"w\" nested-source=\"w\"\n\
                       2\t0,4\tagent\tid=\"john\" nested-source=\"w,john\"\n");
        let mut warnings = Vec::new();
        let keys = LinkResolver::new(&doc).nested_source(doc.get("john").unwrap(), &mut warnings);
        assert_eq!(keys, [RecordKey::new("d1", "w"), RecordKey::new("d1", "john")]);
    }
}
