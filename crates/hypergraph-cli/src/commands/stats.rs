use anyhow::Result;
use hypergraph_core::GraphStore;

use crate::config::CliConfig;

pub async fn execute(config: CliConfig) -> Result<()> {
    let store = config.open_store()?;
    let stats = store.stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
