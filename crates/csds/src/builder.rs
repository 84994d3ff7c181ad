use standoff::{AnnotationRecord, Category, Document, Sentence, Span};
use tracing::debug;

use crate::error::{BuildError, BuildWarning};
use crate::links::LinkResolver;
use crate::normalizer::{TypeMapper, expressive_polarity, parse_flag, parse_intensity};
use crate::schema::{
    Agent, AnnotationType, BuiltRecord, CsdsInstance, Intensity, NO_SPAN, Polarity, RecordKey, Target, TargetKind,
};

/// Turns the annotation records of one document into typed records.
pub struct RecordBuilder<'a> {
    doc: &'a Document,
    links: LinkResolver<'a>,
    types: TypeMapper,
}

/// Sentence context of an anchored record.
struct Anchored<'s> {
    sentence: &'s Sentence,
    span: Span,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            links: LinkResolver::new(doc),
            types: TypeMapper::new(),
        }
    }

    /// Build one record.
    ///
    /// `Ok(None)` means the category produces no record of its own
    /// (unknown annotation types). Warnings are appended for records that
    /// were built despite a suspicious attribute.
    pub fn build(
        &self,
        record: &AnnotationRecord,
        warnings: &mut Vec<BuildWarning>,
    ) -> Result<Option<BuiltRecord>, BuildError> {
        let built = match &record.category {
            Category::Agent => BuiltRecord::Agent(self.agent(record, warnings)?),
            Category::ExpressiveSubjectivity => BuiltRecord::Csds(self.expressive(record, warnings)?),
            Category::Attitude => BuiltRecord::Csds(self.attitude(record, warnings)?),
            Category::DirectSubjective => BuiltRecord::Csds(self.direct_subjective(record, warnings)?),
            Category::ObjectiveSpeechEvent => BuiltRecord::Csds(self.speech_event(record, warnings)?),
            Category::Sentence => BuiltRecord::Csds(self.sentence(record)),
            Category::Target | Category::TargetSpeech => BuiltRecord::Target(self.target(record, TargetKind::Target)?),
            Category::TargetFrame => BuiltRecord::Target(self.target(record, TargetKind::TargetFrame)?),
            Category::STarget => BuiltRecord::Target(self.starget(record, warnings)?),
            Category::ETarget => BuiltRecord::Target(self.etarget(record)?),
            Category::Other(anno_type) => {
                debug!(doc = %self.doc.name, record = %record.id, anno_type = %anno_type, "No builder for annotation type");
                return Ok(None);
            }
        };
        Ok(Some(built))
    }

    fn key(&self, record: &AnnotationRecord) -> RecordKey {
        RecordKey::new(&self.doc.name, &record.id)
    }

    fn anchored(&self, record: &AnnotationRecord) -> Result<Anchored<'a>, BuildError> {
        let anchor = record.anchor.ok_or(BuildError::Unanchored)?;
        let sentence = self.doc.sentences().get(anchor.sentence).ok_or(BuildError::Unanchored)?;
        Ok(Anchored {
            sentence,
            span: anchor.span_in_sentence,
        })
    }

    fn csds(&self, record: &AnnotationRecord, annotation_type: AnnotationType) -> Result<CsdsInstance, BuildError> {
        let Anchored { sentence, span } = self.anchored(record)?;
        Ok(CsdsInstance {
            unique_id: self.key(record),
            doc_id: self.doc.name.clone(),
            id: record.id.clone(),
            sentence_id: Some(sentence.id.clone()),
            text: Some(sentence.text.clone()),
            head_start: span.start,
            head_end: span.end,
            head: record.head.clone(),
            annotation_type,
            ..CsdsInstance::default()
        })
    }

    fn intensity(
        &self,
        record: &AnnotationRecord,
        attribute: &'static str,
        warnings: &mut Vec<BuildWarning>,
    ) -> Option<Intensity> {
        let raw = record.attributes.str(attribute)?;
        parse_intensity(attribute, raw)
            .map_err(|w| warnings.push(w))
            .ok()
    }

    fn implicit(&self, record: &AnnotationRecord) -> Result<Option<bool>, BuildError> {
        record
            .attributes
            .str("implicit")
            .map(|raw| parse_flag("implicit", raw))
            .transpose()
    }

    /// The writer agent has no span; every other agent needs a sentence.
    fn agent(&self, record: &AnnotationRecord, warnings: &mut Vec<BuildWarning>) -> Result<Agent, BuildError> {
        let (sentence_id, text, head_start, head_end) = if record.span_in_doc.is_writer_sentinel() {
            (None, None, NO_SPAN, NO_SPAN)
        } else {
            let Anchored { sentence, span } = self.anchored(record)?;
            (
                Some(sentence.id.clone()),
                Some(sentence.text.clone()),
                span.start as i64,
                span.end as i64,
            )
        };

        Ok(Agent {
            unique_id: self.key(record),
            doc_id: self.doc.name.clone(),
            id: record.id.clone(),
            sentence_id,
            text,
            head_start,
            head_end,
            head: record.head.clone(),
            agent_uncertain: record.attributes.str("agent-uncertain").map(str::to_string),
            nested_source: self.links.nested_source(record, warnings),
        })
    }

    fn expressive(&self, record: &AnnotationRecord, warnings: &mut Vec<BuildWarning>) -> Result<CsdsInstance, BuildError> {
        let mut csds = self.csds(record, AnnotationType::ExpressiveSubjectivity)?;

        let raw_polarity = record
            .attributes
            .str("polarity")
            .or_else(|| record.attributes.str("ese-type"));
        csds.polarity = raw_polarity.and_then(|raw| match expressive_polarity(raw) {
            Ok(polarity) => Some(polarity),
            Err(w) => {
                warnings.push(w);
                None
            }
        });
        csds.intensity = self.intensity(record, "intensity", warnings);
        csds.target_link = self.links.targets(record, warnings);
        csds.nested_source_link = self.links.nested_source(record, warnings);
        Ok(csds)
    }

    fn attitude(&self, record: &AnnotationRecord, warnings: &mut Vec<BuildWarning>) -> Result<CsdsInstance, BuildError> {
        let (annotation_type, polarity) = match record.attributes.str("attitude-type") {
            Some(raw) => self.types.attitude_type(raw)?,
            None => (AnnotationType::Unknown, None),
        };

        let mut csds = self.csds(record, annotation_type)?;
        csds.polarity = polarity;
        csds.intensity = self.intensity(record, "intensity", warnings);
        csds.target_link = self.links.targets(record, warnings);
        Ok(csds)
    }

    fn direct_subjective(
        &self,
        record: &AnnotationRecord,
        warnings: &mut Vec<BuildWarning>,
    ) -> Result<CsdsInstance, BuildError> {
        let mut csds = self.csds(record, AnnotationType::Unknown)?;

        csds.polarity = record
            .attributes
            .str("polarity")
            .and_then(|raw| match raw.parse::<Polarity>() {
                Ok(polarity) => Some(polarity),
                Err(()) => {
                    warnings.push(BuildWarning::AmbiguousPolarity(raw.to_string()));
                    None
                }
            });
        csds.intensity = self.intensity(record, "intensity", warnings);
        csds.expression_intensity = self.intensity(record, "expression-intensity", warnings);
        csds.implicit = self.implicit(record)?;
        csds.attitude_link = self.links.attitudes(record, warnings);
        csds.target_link = csds.attitude_link.clone();
        csds.nested_source_link = self.links.nested_source(record, warnings);
        Ok(csds)
    }

    fn speech_event(&self, record: &AnnotationRecord, warnings: &mut Vec<BuildWarning>) -> Result<CsdsInstance, BuildError> {
        let mut csds = self.csds(record, AnnotationType::ObjectiveSpeechEvent)?;
        csds.implicit = self.implicit(record)?;
        csds.target_link = self.links.speech_targets(record, warnings);
        csds.nested_source_link = self.links.nested_source(record, warnings);
        Ok(csds)
    }

    /// Sentences span the document, so their head is document-relative.
    fn sentence(&self, record: &AnnotationRecord) -> CsdsInstance {
        CsdsInstance {
            unique_id: self.key(record),
            doc_id: self.doc.name.clone(),
            id: record.id.clone(),
            sentence_id: Some(record.id.clone()),
            text: None,
            head_start: record.span_in_doc.start,
            head_end: record.span_in_doc.end,
            head: record.head.clone(),
            annotation_type: AnnotationType::Sentence,
            ..CsdsInstance::default()
        }
    }

    fn target(&self, record: &AnnotationRecord, kind: TargetKind) -> Result<Target, BuildError> {
        let Anchored { sentence, span } = self.anchored(record)?;
        Ok(Target {
            unique_id: self.key(record),
            doc_id: self.doc.name.clone(),
            id: record.id.clone(),
            sentence_id: Some(sentence.id.clone()),
            text: sentence.text.clone(),
            head_start: span.start,
            head_end: span.end,
            head: record.head.clone(),
            annotation_type: record.category.to_string(),
            kind,
        })
    }

    fn starget(&self, record: &AnnotationRecord, warnings: &mut Vec<BuildWarning>) -> Result<Target, BuildError> {
        let kind = TargetKind::STarget {
            target_uncertain: record.attributes.str("target-uncertain").map(str::to_string),
            etarget_link: self.links.etargets(record, warnings),
        };
        self.target(record, kind)
    }

    fn etarget(&self, record: &AnnotationRecord) -> Result<Target, BuildError> {
        let etarget_type = record
            .attributes
            .str("type")
            .ok_or(BuildError::MissingAttribute("type"))?
            .to_string();
        let flag = |attribute: &'static str| {
            record
                .attributes
                .str(attribute)
                .map(|raw| parse_flag(attribute, raw))
                .transpose()
                .map(Option::unwrap_or_default)
        };

        let kind = TargetKind::ETarget {
            etarget_type,
            is_negated: flag("isNegated")?,
            is_referred_in_span: flag("isReferredInSpan")?,
        };
        self.target(record, kind)
    }
}
