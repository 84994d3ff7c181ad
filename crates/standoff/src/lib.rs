pub mod attributes;
pub mod document;
pub mod error;
pub mod line;
pub mod reader;
pub mod sentence;
pub mod span;

pub use attributes::{AttrValue, Attributes, MULTI_VALUED, format_attributes, parse_attributes};
pub use document::{AnnotationRecord, Category, Document, ParseStats, Sentence, SentenceAnchor};
pub use error::LineError;
pub use line::{AnnotationLine, parse_line};
pub use reader::{CorpusLayout, DocumentFiles, FileReader};
pub use sentence::{LocateStats, SentenceLocator, locate_sentences};
pub use span::{CharIndex, Span};

use anyhow::Result;

/// Parse a document's annotation files and anchor records to sentences.
pub fn prepare_document(files: &DocumentFiles) -> (Document, ParseStats, LocateStats) {
    let (mut doc, parse_stats) = Document::parse(&files.name, &files.text, files.sources());
    let locate_stats = locate_sentences(&mut doc);
    (doc, parse_stats, locate_stats)
}

/// Read and prepare one document of a corpus.
pub async fn load_document(reader: &FileReader, name: &str) -> Result<(Document, ParseStats, LocateStats)> {
    let files = reader.read_document(name).await?;
    Ok(prepare_document(&files))
}
