pub mod builder;
pub mod error;
pub mod links;
pub mod normalizer;
pub mod schema;

pub use builder::RecordBuilder;
pub use error::{BuildError, BuildWarning};
pub use links::LinkResolver;
pub use normalizer::TypeMapper;
pub use schema::{
    Agent, AnnotationType, BuiltRecord, CsdsInstance, Intensity, NO_SPAN, Polarity, RecordKey, Target, TargetKind,
};

use serde::Serialize;
use standoff::{Category, Document};
use tracing::{debug, warn};

/// Order in which categories are built; agents and targets come before the
/// records that link to them.
pub const BUILD_ORDER: &[Category] = &[
    Category::Agent,
    Category::ExpressiveSubjectivity,
    Category::Attitude,
    Category::Target,
    Category::TargetSpeech,
    Category::TargetFrame,
    Category::STarget,
    Category::ETarget,
    Category::DirectSubjective,
    Category::ObjectiveSpeechEvent,
    Category::Sentence,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub csds: usize,
    pub targets: usize,
    pub agents: usize,
    pub malformed: usize,
    pub unanchored: usize,
    pub warnings: usize,
    pub dangling_links: usize,
}

impl BuildStats {
    pub fn built(&self) -> usize {
        self.csds + self.targets + self.agents
    }

    pub fn skipped(&self) -> usize {
        self.malformed + self.unanchored
    }
}

/// Typed records of one document.
#[derive(Debug, Default)]
pub struct DocumentOutput {
    pub csds: Vec<CsdsInstance>,
    pub targets: Vec<Target>,
    pub agents: Vec<Agent>,
    pub warnings: Vec<BuildWarning>,
    pub stats: BuildStats,
}

/// Build every record of a prepared document.
///
/// A record the builder refuses is logged and skipped; the rest of the
/// document is still converted.
pub fn convert_document(doc: &Document) -> DocumentOutput {
    let builder = RecordBuilder::new(doc);
    let mut output = DocumentOutput::default();

    for category in BUILD_ORDER {
        for record in doc.in_category(category) {
            let mut warnings = Vec::new();
            match builder.build(record, &mut warnings) {
                Ok(Some(BuiltRecord::Csds(csds))) => {
                    output.stats.csds += 1;
                    output.csds.push(csds);
                }
                Ok(Some(BuiltRecord::Target(target))) => {
                    output.stats.targets += 1;
                    output.targets.push(target);
                }
                Ok(Some(BuiltRecord::Agent(agent))) => {
                    output.stats.agents += 1;
                    output.agents.push(agent);
                }
                Ok(None) => {}
                Err(e) if e.is_unanchored() => {
                    output.stats.unanchored += 1;
                    warn!(doc = %doc.name, record = %record.id, category = %category, "Skipping record outside every sentence");
                }
                Err(e) => {
                    output.stats.malformed += 1;
                    warn!(doc = %doc.name, record = %record.id, category = %category, error = %e, "Skipping malformed record");
                }
            }

            for warning in &warnings {
                if warning.is_dangling_link() {
                    output.stats.dangling_links += 1;
                } else {
                    warn!(doc = %doc.name, record = %record.id, warning = %warning, "Suspicious attribute");
                }
            }
            output.stats.warnings += warnings.len();
            output.warnings.extend(warnings);
        }
    }

    debug!(
        doc = %doc.name,
        csds = output.stats.csds,
        targets = output.stats.targets,
        agents = output.stats.agents,
        skipped = output.stats.skipped(),
        "Built document records"
    );
    output
}
