use csds::BuildStats;
use serde::Serialize;
use standoff::{LocateStats, ParseStats};
use std::time::Duration;
use tracing::info;

/// Counters for one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionReport {
    pub documents_processed: usize,
    /// Documents discarded for exceeding the warning budget.
    pub documents_skipped: usize,

    // Parsing
    pub lines: usize,
    pub malformed_lines: usize,
    pub schema_warnings: usize,
    pub unlocated_records: usize,

    // Building
    pub csds_built: usize,
    pub targets_built: usize,
    pub agents_built: usize,
    pub o_instances: usize,
    pub malformed_records: usize,
    pub unanchored_records: usize,
    pub build_warnings: usize,
    pub dropped_links: usize,
    pub duplicate_records: usize,

    pub elapsed_ms: u64,
}

/// Per-document counters collected before the document is stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentStats {
    pub parse: ParseStats,
    pub locate: LocateStats,
    pub build: BuildStats,
}

impl DocumentStats {
    /// Everything that was logged as a warning for this document.
    pub fn warnings(&self) -> usize {
        self.parse.malformed_lines + self.parse.schema_warnings + self.build.skipped() + self.build.warnings
    }
}

impl ConversionReport {
    pub fn record_document(&mut self, stats: &DocumentStats) {
        self.documents_processed += 1;
        self.lines += stats.parse.lines;
        self.malformed_lines += stats.parse.malformed_lines;
        self.schema_warnings += stats.parse.schema_warnings;
        self.unlocated_records += stats.locate.unlocated;
        self.csds_built += stats.build.csds;
        self.targets_built += stats.build.targets;
        self.agents_built += stats.build.agents;
        self.malformed_records += stats.build.malformed;
        self.unanchored_records += stats.build.unanchored;
        self.build_warnings += stats.build.warnings;
        self.dropped_links += stats.build.dangling_links;
    }

    pub fn record_skipped(&mut self) {
        self.documents_skipped += 1;
    }

    pub fn record_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_ms = elapsed.as_millis() as u64;
    }

    pub fn records_skipped(&self) -> usize {
        self.malformed_records + self.unanchored_records
    }

    pub fn log_summary(&self, corpus: &str) {
        info!(
            corpus,
            documents = self.documents_processed,
            skipped_documents = self.documents_skipped,
            csds = self.csds_built,
            targets = self.targets_built,
            agents = self.agents_built,
            o_instances = self.o_instances,
            skipped_records = self.records_skipped(),
            malformed_lines = self.malformed_lines,
            warnings = self.build_warnings + self.schema_warnings,
            elapsed_ms = self.elapsed_ms,
            "Conversion finished"
        );
    }
}
