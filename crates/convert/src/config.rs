use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use standoff::CorpusLayout;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    pub corpus_name: String,
    pub corpus_root: PathBuf,
    pub flavor: CorpusFlavor,
    pub layout: CorpusLayout,
    pub o_instances: OInstanceConfig,
    /// Discard a document once it produces more warnings than this.
    #[serde(default)]
    pub warning_budget: Option<usize>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CorpusFlavor {
    Mpqa2,
    Mpqa3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OInstanceConfig {
    pub enabled: bool,
    pub cache_entries: usize,
}

impl CorpusFlavor {
    /// On-disk layout of the release.
    pub fn layout(self) -> CorpusLayout {
        match self {
            CorpusFlavor::Mpqa2 => CorpusLayout::default(),
            CorpusFlavor::Mpqa3 => CorpusLayout {
                annotation_files: vec!["gateman.mpqa.lre.3.0".to_string()],
                doclist_file: "doclist".to_string(),
                ..CorpusLayout::default()
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CorpusFlavor::Mpqa2 => "mpqa2",
            CorpusFlavor::Mpqa3 => "mpqa3",
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::mpqa2("database.mpqa.2.0")
    }
}

impl ConvertConfig {
    pub fn mpqa2(root: impl Into<PathBuf>) -> Self {
        Self {
            corpus_name: "MPQA2.0".to_string(),
            corpus_root: root.into(),
            flavor: CorpusFlavor::Mpqa2,
            layout: CorpusFlavor::Mpqa2.layout(),
            o_instances: OInstanceConfig {
                enabled: false,
                cache_entries: 10000,
            },
            warning_budget: None,
        }
    }

    pub fn mpqa3(root: impl Into<PathBuf>) -> Self {
        Self {
            corpus_name: "MPQA3.0".to_string(),
            flavor: CorpusFlavor::Mpqa3,
            layout: CorpusFlavor::Mpqa3.layout(),
            ..Self::mpqa2(root)
        }
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read config: {:?}", path))?;
        serde_json::from_str(&content).context(format!("Failed to parse config: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let v2 = ConvertConfig::mpqa2("/data/mpqa2");
        assert_eq!(v2.layout.annotation_files, ["gateman.mpqa.lre.2.0"]);
        assert_eq!(v2.layout.doclist_file, "doclist.2.0");

        let v3 = ConvertConfig::mpqa3("/data/mpqa3");
        assert_eq!(v3.flavor, CorpusFlavor::Mpqa3);
        assert_eq!(v3.corpus_root, PathBuf::from("/data/mpqa3"));
        assert_eq!(v3.layout.sentence_files, ["gatesentences.mpqa.2.0"]);
        assert!(!v3.o_instances.enabled);
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("convert.json");
        let mut config = ConvertConfig::mpqa3("corpus");
        config.warning_budget = Some(25);
        tokio::fs::write(&path, serde_json::to_string(&config).unwrap())
            .await
            .unwrap();

        let loaded = ConvertConfig::from_file(&path).await.unwrap();
        assert_eq!(loaded.flavor, CorpusFlavor::Mpqa3);
        assert_eq!(loaded.warning_budget, Some(25));
        assert_eq!(loaded.layout, config.layout);
    }

    #[tokio::test]
    async fn test_from_file_reports_path() {
        let err = ConvertConfig::from_file(Path::new("/nonexistent/convert.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("convert.json"));
    }
}
