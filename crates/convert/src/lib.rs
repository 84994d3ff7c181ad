pub mod config;
pub mod report;

pub use config::{ConvertConfig, CorpusFlavor, OInstanceConfig};
pub use report::{ConversionReport, DocumentStats};

use anyhow::{Context, Result};
use standoff::{DocumentFiles, FileReader, prepare_document};
use std::path::Path;
use std::time::Instant;
use store::{CorpusExport, CorpusStore, TokenCache, o_instances};
use tracing::{debug, info, warn};

/// Convert every document of a corpus into one store.
///
/// Bad lines and records are logged and counted; only I/O failures
/// (doclist, document text, annotation files) abort the run.
pub async fn convert_corpus(config: &ConvertConfig, cache: &TokenCache) -> Result<(CorpusStore, ConversionReport)> {
    let start = Instant::now();
    let reader = FileReader::new(&config.corpus_root, config.layout.clone());
    let doclist = reader.read_doclist().await?;
    info!(
        corpus = %config.corpus_name,
        flavor = config.flavor.as_str(),
        documents = doclist.len(),
        "Converting corpus"
    );

    let mut store = CorpusStore::new(&config.corpus_name);
    let mut report = ConversionReport::default();
    for name in &doclist {
        let files = reader.read_document(name).await?;
        convert_files(&files, config, cache, &mut store, &mut report);
    }

    report.record_elapsed(start.elapsed());
    report.log_summary(&config.corpus_name);
    Ok((store, report))
}

/// Convert one document that is already in memory.
pub fn convert_files(
    files: &DocumentFiles,
    config: &ConvertConfig,
    cache: &TokenCache,
    store: &mut CorpusStore,
    report: &mut ConversionReport,
) {
    let (doc, parse, locate) = prepare_document(files);
    let output = csds::convert_document(&doc);
    let stats = DocumentStats {
        parse,
        locate,
        build: output.stats,
    };

    if let Some(budget) = config.warning_budget {
        if stats.warnings() > budget {
            warn!(doc = %doc.name, warnings = stats.warnings(), budget, "Skipping document over its warning budget");
            report.record_skipped();
            return;
        }
    }

    let o = if config.o_instances.enabled {
        o_instances(&doc, &output.csds, cache)
    } else {
        Vec::new()
    };
    let o_count = o.len();

    report.duplicate_records += store.add_document(output);
    report.duplicate_records += store.add_o_instances(o);
    report.o_instances += o_count;
    report.record_document(&stats);
    debug!(doc = %doc.name, records = stats.build.built(), o_instances = o_count, "Converted document");
}

pub async fn write_export(path: &Path, export: &CorpusExport) -> Result<()> {
    let json = serde_json::to_string_pretty(export).context("Failed to serialize export")?;
    tokio::fs::write(path, json)
        .await
        .context(format!("Failed to write export: {:?}", path))?;
    info!(path = ?path, csds = export.csds_objects.len(), "Export written");
    Ok(())
}

pub async fn read_export(path: &Path) -> Result<CorpusExport> {
    let content = tokio::fs::read_to_string(path)
        .await
        .context(format!("Failed to read export: {:?}", path))?;
    serde_json::from_str(&content).context(format!("Failed to parse export: {:?}", path))
}
