use std::sync::Arc;

use anyhow::{Context, Result};
use hypergraph_pipeline::{ai, load_schema, IngestReport, Ingestor, IngestorConfig};
use tracing::info;

use crate::config::CliConfig;

/// Which subcommand triggered the ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestKind {
    Init,
    Update,
}

impl IngestKind {
    fn label(self) -> &'static str {
        match self {
            IngestKind::Init => "init",
            IngestKind::Update => "update",
        }
    }
}

pub async fn execute(config: CliConfig, kind: IngestKind) -> Result<()> {
    let report = run(&config, kind).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Ingest the configured profile directory into the graph
pub async fn run(config: &CliConfig, kind: IngestKind) -> Result<IngestReport> {
    let settings = &config.settings;
    let root = config.profile_root();
    info!(
        command = kind.label(),
        profile = %settings.ingest.profile_name,
        root = %root.display(),
        "Starting ingestion"
    );

    let schema = load_schema(settings.ingest.schema_path.as_deref()).context("Failed to load graph schema")?;
    let store = config.open_store()?;
    let ingestor = Ingestor::new(
        Arc::new(store),
        ai::build_backend(&settings.ai.provider, &settings.ai.model),
        IngestorConfig {
            id_strategy: settings.ingest.id_strategy,
            bulk: settings.storage.bulk_ingest,
            schema,
        },
    );

    let report = ingestor
        .ingest_directory(&root)
        .await
        .with_context(|| format!("Failed to ingest {}", root.display()))?;

    match kind {
        IngestKind::Init => info!(nodes = report.nodes, "Graph initialized"),
        IngestKind::Update => info!(nodes = report.nodes, "Graph updated"),
    }
    Ok(report)
}
