use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Where a corpus keeps its document texts and annotation files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusLayout {
    /// Directory (under the corpus root) holding raw document texts.
    pub docs_dir: String,
    /// Directory holding one sub-directory of annotation files per document.
    pub annotations_dir: String,
    pub annotation_files: Vec<String>,
    pub sentence_files: Vec<String>,
    pub doclist_file: String,
}

impl Default for CorpusLayout {
    fn default() -> Self {
        Self {
            docs_dir: "docs".to_string(),
            annotations_dir: "man_anns".to_string(),
            annotation_files: vec!["gateman.mpqa.lre.2.0".to_string()],
            sentence_files: vec!["gatesentences.mpqa.2.0".to_string()],
            doclist_file: "doclist.2.0".to_string(),
        }
    }
}

/// Raw inputs of one document.
#[derive(Debug, Clone)]
pub struct DocumentFiles {
    pub name: String,
    pub text: String,
    /// `(file name, content)` for every annotation and sentence file.
    pub annotations: Vec<(String, String)>,
}

impl DocumentFiles {
    pub fn sources(&self) -> impl Iterator<Item = (&str, &str)> {
        self.annotations.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }
}

pub struct FileReader {
    root: PathBuf,
    layout: CorpusLayout,
}

impl FileReader {
    pub fn new(root: impl Into<PathBuf>, layout: CorpusLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a document's text and all of its annotation files.
    ///
    /// Any missing file is an error: a document without its annotations
    /// cannot be converted.
    pub async fn read_document(&self, name: &str) -> Result<DocumentFiles> {
        let text_path = self.root.join(&self.layout.docs_dir).join(name);
        let text = fs::read_to_string(&text_path)
            .await
            .context(format!("Failed to read document text: {:?}", text_path))?;

        let ann_dir = self.root.join(&self.layout.annotations_dir).join(name);
        let mut annotations = Vec::new();
        for file in self.layout.annotation_files.iter().chain(&self.layout.sentence_files) {
            let path = ann_dir.join(file);
            let content = fs::read_to_string(&path)
                .await
                .context(format!("Failed to read annotation file: {:?}", path))?;
            annotations.push((file.clone(), content));
        }

        Ok(DocumentFiles {
            name: name.to_string(),
            text,
            annotations,
        })
    }

    /// Document names in processing order.
    ///
    /// Uses the doclist file when present, otherwise every file under the
    /// document directory sorted by relative path.
    pub async fn read_doclist(&self) -> Result<Vec<String>> {
        let doclist_path = self.root.join(&self.layout.doclist_file);
        if fs::try_exists(&doclist_path).await.unwrap_or(false) {
            let content = fs::read_to_string(&doclist_path)
                .await
                .context(format!("Failed to read doclist: {:?}", doclist_path))?;
            return Ok(parse_doclist(&content));
        }

        let docs_dir = self.root.join(&self.layout.docs_dir);
        tracing::info!(path = ?docs_dir, "No doclist found, discovering documents");
        self.discover_documents(&docs_dir)
    }

    fn discover_documents(&self, docs_dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(docs_dir).sort_by_file_name() {
            let entry = entry.context(format!("Failed to walk {:?}", docs_dir))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(docs_dir)
                .context("Walked outside the document directory")?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            names.push(name);
        }
        names.sort();
        Ok(names)
    }
}

pub fn parse_doclist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
