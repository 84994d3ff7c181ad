use csds::{Agent, AnnotationType, CsdsInstance, RecordKey, Target};
use std::collections::HashMap;
use std::fmt::Write;

use crate::error::StoreError;

/// Records stored in a [`Collection`] are looked up by their corpus-wide key.
pub trait Keyed {
    fn key(&self) -> &RecordKey;
}

impl Keyed for CsdsInstance {
    fn key(&self) -> &RecordKey {
        &self.unique_id
    }
}

impl Keyed for Target {
    fn key(&self) -> &RecordKey {
        &self.unique_id
    }
}

impl Keyed for Agent {
    fn key(&self) -> &RecordKey {
        &self.unique_id
    }
}

/// Insertion-ordered records with a key -> slot index.
///
/// Removal leaves an empty slot behind so positions of later records stay
/// valid; it is meant for occasional cleanup, not heavy churn.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    slots: Vec<Option<T>>,
    index: HashMap<RecordKey, usize>,
}

impl<T: Keyed> Collection<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn add(&mut self, record: T) -> Result<usize, StoreError> {
        if self.index.contains_key(record.key()) {
            return Err(StoreError::DuplicateKey(record.key().clone()));
        }

        let idx = self.slots.len();
        self.index.insert(record.key().clone(), idx);
        self.slots.push(Some(record));
        Ok(idx)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).and_then(|&idx| self.slots[idx].as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        let idx = self.index.remove(key)?;
        self.slots[idx].take()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl<T: Keyed> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub type TargetCollection = Collection<Target>;
pub type AgentCollection = Collection<Agent>;

/// CSDS instances of a corpus, split into instances backed by a real
/// annotation and `O` instances for un-annotated tokens.
#[derive(Debug, Clone, Default)]
pub struct CsdsCollection {
    pub corpus_name: String,
    labeled: Collection<CsdsInstance>,
    o: Collection<CsdsInstance>,
}

impl CsdsCollection {
    pub fn new(corpus_name: impl Into<String>) -> Self {
        Self {
            corpus_name: corpus_name.into(),
            ..Self::default()
        }
    }

    pub fn add_labeled(&mut self, instance: CsdsInstance) -> Result<usize, StoreError> {
        self.labeled.add(instance)
    }

    pub fn add_o(&mut self, instance: CsdsInstance) -> Result<usize, StoreError> {
        if instance.annotation_type != AnnotationType::O {
            return Err(StoreError::NotAnOInstance(instance.unique_id));
        }
        self.o.add(instance)
    }

    /// Labeled instances are searched first.
    pub fn get(&self, key: &str) -> Option<&CsdsInstance> {
        self.labeled.get(key).or_else(|| self.o.get(key))
    }

    pub fn remove(&mut self, key: &str) -> Option<CsdsInstance> {
        self.labeled.remove(key).or_else(|| self.o.remove(key))
    }

    pub fn labeled(&self) -> impl Iterator<Item = &CsdsInstance> {
        self.labeled.iter()
    }

    pub fn o_instances(&self) -> impl Iterator<Item = &CsdsInstance> {
        self.o.iter()
    }

    /// All labeled instances, then all `O` instances.
    pub fn iter(&self) -> impl Iterator<Item = &CsdsInstance> {
        self.labeled.iter().chain(self.o.iter())
    }

    pub fn labeled_count(&self) -> usize {
        self.labeled.len()
    }

    pub fn o_count(&self) -> usize {
        self.o.len()
    }

    pub fn info_short(&self) -> String {
        format!(
            "<CSDS collection from \"{}\": {} labeled instances, {} O instances>",
            self.corpus_name,
            self.labeled_count(),
            self.o_count()
        )
    }

    pub fn info_long(&self) -> String {
        let mut message = format!(
            "<CSDS collection from \"{}\": {} labeled instances:\n",
            self.corpus_name,
            self.labeled_count()
        );
        for instance in self.labeled() {
            let _ = writeln!(message, "   {}", instance.info_short());
        }
        message.push_str(">\n");
        message
    }
}

/// Read-only view handed to training and tokenization code.
pub trait InstanceSource {
    fn labeled_instances(&self) -> impl Iterator<Item = &CsdsInstance>;

    fn o_instances(&self) -> impl Iterator<Item = &CsdsInstance>;

    fn labeled_count(&self) -> usize;
}

impl InstanceSource for CsdsCollection {
    fn labeled_instances(&self) -> impl Iterator<Item = &CsdsInstance> {
        self.labeled()
    }

    fn o_instances(&self) -> impl Iterator<Item = &CsdsInstance> {
        CsdsCollection::o_instances(self)
    }

    fn labeled_count(&self) -> usize {
        CsdsCollection::labeled_count(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(id: &str, annotation_type: AnnotationType) -> CsdsInstance {
        CsdsInstance {
            unique_id: RecordKey::new("doc1", id),
            doc_id: "doc1".to_string(),
            id: id.to_string(),
            annotation_type,
            ..CsdsInstance::default()
        }
    }

    #[test]
    fn test_add_get_remove() {
        let mut collection = Collection::new();
        assert_eq!(collection.add(instance("a", AnnotationType::Sentiment)), Ok(0));
        assert_eq!(collection.add(instance("b", AnnotationType::Arguing)), Ok(1));
        assert!(matches!(
            collection.add(instance("a", AnnotationType::Arguing)),
            Err(StoreError::DuplicateKey(_))
        ));

        assert_eq!(collection.get("doc1&&b").unwrap().annotation_type, AnnotationType::Arguing);
        assert!(collection.remove("doc1&&a").is_some());
        assert!(collection.get("doc1&&a").is_none());
        assert!(collection.remove("doc1&&a").is_none());
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), ["b"]);
        // b keeps its slot
        assert!(collection.get("doc1&&b").is_some());
    }

    #[test]
    fn test_labeled_before_o() {
        let mut collection = CsdsCollection::new("mpqa");
        collection.add_o(instance("o1", AnnotationType::O)).unwrap();
        collection.add_labeled(instance("a", AnnotationType::Sentiment)).unwrap();
        collection.add_o(instance("o2", AnnotationType::O)).unwrap();
        collection.add_labeled(instance("b", AnnotationType::Agreement)).unwrap();

        let order: Vec<_> = collection.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, ["a", "b", "o1", "o2"]);
        assert_eq!(collection.labeled_count(), 2);
        assert_eq!(collection.o_count(), 2);
        assert!(collection.get("doc1&&o2").is_some());
    }

    #[test]
    fn test_o_partition_only_takes_o() {
        let mut collection = CsdsCollection::new("mpqa");
        assert!(matches!(
            collection.add_o(instance("a", AnnotationType::Sentiment)),
            Err(StoreError::NotAnOInstance(_))
        ));
    }

    #[test]
    fn test_info() {
        let mut collection = CsdsCollection::new("mpqa");
        collection.add_labeled(instance("a", AnnotationType::Sentiment)).unwrap();
        assert_eq!(
            collection.info_short(),
            "<CSDS collection from \"mpqa\": 1 labeled instances, 0 O instances>"
        );
        assert_eq!(collection.info_long().lines().count(), 3);
    }
}
