use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::CliConfig;

/// Snapshot the graph database with `VACUUM INTO`
///
/// A missing source database is not an error: there is nothing to export.
/// A destination resolving to the source database is refused.
pub async fn execute(config: CliConfig, output: Option<PathBuf>) -> Result<()> {
    let source = config.db_path().to_path_buf();
    if !source.exists() {
        warn!(source = %source.display(), "Graph database not found, nothing to export");
        return Ok(());
    }

    let dest = output.unwrap_or_else(|| config.settings.export.output.clone());
    let store = config.open_store()?;
    store
        .export_snapshot(dest.clone())
        .await
        .with_context(|| format!("Failed to export to {}", dest.display()))?;

    info!(source = %source.display(), dest = %dest.display(), "Export complete");
    Ok(())
}
