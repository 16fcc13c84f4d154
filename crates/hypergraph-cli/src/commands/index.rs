use anyhow::{Context, Result};
use hypergraph_core::GraphStore;
use tracing::info;

use crate::config::CliConfig;

/// Rebuild the full-text index from the current node table
pub async fn execute(config: CliConfig) -> Result<()> {
    let store = config.open_store()?;
    store
        .finalize_full_text_index()
        .await
        .context("Failed to rebuild the text index")?;

    let stats = store.stats().await?;
    info!(rows = ?stats.text_index_rows, "Text index rebuilt");
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
