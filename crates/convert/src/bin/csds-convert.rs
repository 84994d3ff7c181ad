use anyhow::{Context, Result};
use clap::Parser;
use convert::{ConvertConfig, CorpusFlavor, convert_corpus, write_export};
use std::path::PathBuf;
use store::TokenCache;
use tracing_subscriber::EnvFilter;

/// Convert a stand-off annotated corpus into a CSDS export.
#[derive(Parser, Debug)]
#[command(name = "csds-convert")]
struct Args {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Corpus root directory
    #[arg(long, env = "CSDS_CORPUS_ROOT")]
    root: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = CorpusFlavor::Mpqa2)]
    flavor: CorpusFlavor,

    #[arg(long)]
    name: Option<String>,

    /// Also emit O instances for un-annotated tokens
    #[arg(long)]
    o_instances: bool,

    #[arg(long)]
    warning_budget: Option<usize>,

    #[arg(long, short, default_value = "csds.json")]
    output: PathBuf,

    /// Write the conversion counters here as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let mut config = match &args.config {
        Some(path) => ConvertConfig::from_file(path).await?,
        None => match args.flavor {
            CorpusFlavor::Mpqa2 => ConvertConfig::mpqa2("database.mpqa.2.0"),
            CorpusFlavor::Mpqa3 => ConvertConfig::mpqa3("database.mpqa.3.0"),
        },
    };
    if let Some(root) = args.root {
        config.corpus_root = root;
    }
    if let Some(name) = args.name {
        config.corpus_name = name;
    }
    if args.o_instances {
        config.o_instances.enabled = true;
    }
    if args.warning_budget.is_some() {
        config.warning_budget = args.warning_budget;
    }

    let cache = TokenCache::new(config.o_instances.cache_entries);
    let (store, report) = convert_corpus(&config, &cache).await?;
    write_export(&args.output, &store.export()).await?;

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(path, json)
            .await
            .context(format!("Failed to write report: {:?}", path))?;
    }

    Ok(())
}
