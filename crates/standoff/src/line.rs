use crate::attributes::{Attributes, parse_attributes};
use crate::error::LineError;
use crate::span::Span;

/// GATE structural annotations that carry no annotation content.
const STRUCTURAL_TYPES: &[&str] = &["inside", "split"];

/// One parsed stand-off line, before any document context is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationLine {
    pub line_id: String,
    pub span: Span,
    pub anno_type: String,
    pub attributes: Attributes,
}

/// Parse one line of an annotation file.
///
/// Accepts `id \t start,end \t type \t attrs` as well as the older
/// `id \t start,end \t string \t GATE_type \t attrs` form. Returns `Ok(None)`
/// for blank lines, comments and structural annotations.
pub fn parse_line(raw: &str) -> Result<Option<AnnotationLine>, LineError> {
    let line = raw.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 3 {
        return Err(LineError::FieldCount(fields.len()));
    }

    let has_data_type = fields.len() >= 4 && fields[2].trim() == "string";
    let (anno_type, attrs, expected_max) = if has_data_type {
        (fields[3], fields.get(4).copied().unwrap_or(""), 5)
    } else {
        (fields[2], fields.get(3).copied().unwrap_or(""), 4)
    };
    if fields.len() > expected_max {
        return Err(LineError::FieldCount(fields.len()));
    }

    let anno_type = anno_type.trim();
    let anno_type = anno_type.strip_prefix("GATE_").unwrap_or(anno_type);
    if STRUCTURAL_TYPES.contains(&anno_type) {
        return Ok(None);
    }

    Ok(Some(AnnotationLine {
        line_id: fields[0].trim().to_string(),
        span: parse_span(fields[1])?,
        anno_type: anno_type.to_string(),
        attributes: parse_attributes(attrs)?,
    }))
}

fn parse_span(raw: &str) -> Result<Span, LineError> {
    let bad = || LineError::BadSpan(raw.trim().to_string());
    let (start, end) = raw.trim().split_once(',').ok_or_else(bad)?;
    let start: usize = start.trim().parse().map_err(|_| bad())?;
    let end: usize = end.trim().parse().map_err(|_| bad())?;
    Span::new(start, end).ok_or_else(bad)
}
