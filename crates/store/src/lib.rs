pub mod cache;
pub mod collection;
pub mod error;
pub mod export;
pub mod o_labels;

pub use cache::{CacheStats, TokenCache, space_tokenize};
pub use collection::{AgentCollection, Collection, CsdsCollection, InstanceSource, Keyed, TargetCollection};
pub use error::StoreError;
pub use export::{CorpusExport, ExportedAttitude, ExportedCsds};
pub use o_labels::o_instances;

use csds::{CsdsInstance, DocumentOutput, RecordKey, Target};
use tracing::{debug, warn};

/// Corpus-wide CSDS, target and agent collections.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    csds: CsdsCollection,
    targets: TargetCollection,
    agents: AgentCollection,
}

impl CorpusStore {
    pub fn new(corpus_name: impl Into<String>) -> Self {
        Self {
            csds: CsdsCollection::new(corpus_name),
            targets: TargetCollection::new(),
            agents: AgentCollection::new(),
        }
    }

    pub fn corpus_name(&self) -> &str {
        &self.csds.corpus_name
    }

    /// Store the records of one converted document; returns how many were
    /// rejected as duplicates.
    pub fn add_document(&mut self, output: DocumentOutput) -> usize {
        let mut rejected = 0;
        for agent in output.agents {
            rejected += usize::from(stored(self.agents.add(agent)).is_none());
        }
        for target in output.targets {
            rejected += usize::from(stored(self.targets.add(target)).is_none());
        }
        for instance in output.csds {
            rejected += usize::from(stored(self.csds.add_labeled(instance)).is_none());
        }
        rejected
    }

    pub fn add_o_instances(&mut self, instances: Vec<CsdsInstance>) -> usize {
        instances
            .into_iter()
            .map(|instance| stored(self.csds.add_o(instance)))
            .filter(Option::is_none)
            .count()
    }

    pub fn csds(&self) -> &CsdsCollection {
        &self.csds
    }

    pub fn targets(&self) -> &TargetCollection {
        &self.targets
    }

    pub fn agents(&self) -> &AgentCollection {
        &self.agents
    }

    fn expand_targets(&self, keys: &[RecordKey]) -> Vec<Target> {
        keys.iter().filter_map(|k| self.targets.get(k.as_str())).cloned().collect()
    }

    /// Nested form with link keys expanded one level deep.
    pub fn export(&self) -> CorpusExport {
        let csds_objects = self
            .csds
            .labeled()
            .map(|instance| ExportedCsds {
                target: self.expand_targets(&instance.target_link),
                nested_source: instance
                    .nested_source_link
                    .iter()
                    .filter_map(|k| self.agents.get(k.as_str()))
                    .cloned()
                    .collect(),
                attitude: instance
                    .attitude_link
                    .iter()
                    .filter_map(|k| self.csds.get(k.as_str()))
                    .map(|attitude| ExportedAttitude {
                        target: self.expand_targets(&attitude.target_link),
                        instance: attitude.clone(),
                    })
                    .collect(),
                instance: instance.clone(),
            })
            .collect();

        let export = CorpusExport {
            corpus_name: self.corpus_name().to_string(),
            csds_objects,
            o_objects: self.csds.o_instances().cloned().collect(),
            target_objects: self.targets.iter().map(|t| (t.unique_id.clone(), t.clone())).collect(),
            agent_objects: self.agents.iter().map(|a| (a.unique_id.clone(), a.clone())).collect(),
        };
        debug!(
            corpus = %export.corpus_name,
            csds = export.csds_objects.len(),
            targets = export.target_objects.len(),
            agents = export.agent_objects.len(),
            "Exported corpus"
        );
        export
    }

    /// Rebuild typed collections from an export.
    ///
    /// Embedded sub-records are copies of the top-level maps and are not
    /// read back.
    pub fn from_export(export: CorpusExport) -> Result<Self, StoreError> {
        let mut store = CorpusStore::new(export.corpus_name);
        for agent in export.agent_objects.into_values() {
            store.agents.add(agent)?;
        }
        for target in export.target_objects.into_values() {
            store.targets.add(target)?;
        }
        for exported in export.csds_objects {
            store.csds.add_labeled(exported.instance)?;
        }
        for instance in export.o_objects {
            store.csds.add_o(instance)?;
        }
        Ok(store)
    }
}

fn stored(result: Result<usize, StoreError>) -> Option<usize> {
    match result {
        Ok(idx) => Some(idx),
        Err(e) => {
            warn!(error = %e, "Record not stored");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csds::{AnnotationType, Intensity, Polarity, TargetKind};
    use standoff::prepare_document;
    use standoff::reader::DocumentFiles;

    const ANNS: &str = "1\t0,0\tagent\tid=\"w\" nested-source=\"w\"\n\
                        2\t0,4\tagent\tid=\"john\" nested-source=\"w,john\"\n\
                        3\t19,24\teTarget\tid=\"e1\" type=\"entity\"\n\
                        4\t13,24\tsTarget\tid=\"s1\" eTarget-link=\"e1\"\n\
                        5\t10,24\ttarget\tid=\"t1\"\n\
                        6\t13,18\tattitude\tid=\"a1\" attitude-type=\"sentiment-pos\" intensity=\"high\" target-link=\"t1\"\n\
                        7\t5,9\tdirect-subjective\tid=\"ds1\" attitude-link=\"a1\" nested-source=\"w,john\" intensity=\"medium\"\n\
                        8\t5,9\texpressive-subjectivity\tid=\"es1\" polarity=\"writer-negative\" nested-source=\"w\"\n";

    fn store() -> CorpusStore {
        let files = DocumentFiles {
            name: "doc1".to_string(),
            text: "John said he likes beets.\n".to_string(),
            annotations: vec![
                ("gateman".to_string(), ANNS.to_string()),
                ("gatesentences".to_string(), "1\t0,26\tsentence\t\n".to_string()),
            ],
        };
        let (doc, _, _) = prepare_document(&files);
        let output = csds::convert_document(&doc);
        let labeled = output.csds.clone();

        let mut store = CorpusStore::new("mpqa");
        assert_eq!(store.add_document(output), 0);
        store.add_o_instances(o_instances(&doc, &labeled, &TokenCache::default()));
        store
    }

    #[test]
    fn test_add_document() {
        let store = store();
        assert_eq!(store.agents().len(), 2);
        assert_eq!(store.targets().len(), 3);
        // es1, a1, ds1, sentence
        assert_eq!(store.csds().labeled_count(), 4);
        assert!(store.agents().get("doc1&&w").unwrap().is_writer());
    }

    #[test]
    fn test_export_expands_one_level() {
        let export = store().export();
        let ds = export
            .csds_objects
            .iter()
            .find(|c| c.instance.id == "ds1")
            .unwrap();

        assert_eq!(ds.nested_source.len(), 2);
        assert_eq!(ds.nested_source[1].head, "John");
        assert_eq!(ds.attitude.len(), 1);
        assert_eq!(ds.attitude[0].instance.annotation_type, AnnotationType::Sentiment);
        assert_eq!(ds.attitude[0].target.len(), 1);
        assert_eq!(ds.attitude[0].target[0].head, "he likes beets");
        // attitude keys are not targets
        assert!(ds.target.is_empty());
        assert_eq!(ds.instance.target_link, [RecordKey::new("doc1", "a1")]);

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["csds_objects"][0]["unique_id"], "doc1&&es1");
        assert_eq!(json["target_objects"]["doc1&&e1"]["target_kind"], "eTarget");
    }

    #[test]
    fn test_export_round_trip() {
        let original = store();
        let json = serde_json::to_string(&original.export()).unwrap();
        let export: CorpusExport = serde_json::from_str(&json).unwrap();
        let rebuilt = CorpusStore::from_export(export).unwrap();

        assert_eq!(rebuilt.corpus_name(), "mpqa");
        for instance in original.csds().iter() {
            let back = rebuilt.csds().get(instance.unique_id.as_str()).unwrap();
            assert_eq!(back, instance);
        }
        assert_eq!(rebuilt.csds().o_count(), original.csds().o_count());

        let es = rebuilt.csds().get("doc1&&es1").unwrap();
        assert_eq!(es.polarity, Some(Polarity::Negative));
        let attitude = rebuilt.csds().get("doc1&&a1").unwrap();
        assert_eq!(attitude.intensity, Some(Intensity::High));

        let starget = rebuilt.targets().get("doc1&&s1").unwrap();
        assert!(matches!(&starget.kind, TargetKind::STarget { etarget_link, .. } if etarget_link.len() == 1));
        assert_eq!(rebuilt.agents().get("doc1&&john"), original.agents().get("doc1&&john"));
    }
}
