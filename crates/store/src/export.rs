use csds::{Agent, CsdsInstance, RecordKey, Target};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nested, dereferenced form of a whole corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusExport {
    pub corpus_name: String,
    pub csds_objects: Vec<ExportedCsds>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub o_objects: Vec<CsdsInstance>,
    pub target_objects: BTreeMap<RecordKey, Target>,
    pub agent_objects: BTreeMap<RecordKey, Agent>,
}

/// A labeled instance with its links expanded into the linked records.
///
/// The key lists stay in `instance`, so keys that point at nothing
/// expandable (a direct-subjective's attitude keys in `target_link`) are
/// not lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedCsds {
    #[serde(flatten)]
    pub instance: CsdsInstance,
    pub target: Vec<Target>,
    pub nested_source: Vec<Agent>,
    pub attitude: Vec<ExportedAttitude>,
}

/// Attitudes embed their own targets and nothing deeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedAttitude {
    #[serde(flatten)]
    pub instance: CsdsInstance,
    pub target: Vec<Target>,
}
