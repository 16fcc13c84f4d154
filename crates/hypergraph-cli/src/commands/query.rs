use anyhow::{Context, Result};
use hypergraph_core::{GraphStore, NeighborRanking, QueryOptions, QueryResult};
use tracing::debug;

use crate::config::CliConfig;

/// Query arguments as parsed from the command line
#[derive(Debug, Clone)]
pub struct QueryArgs {
    pub term: String,
    pub limit: Option<usize>,
    pub expand: bool,
    pub budget: usize,
    pub ranking: NeighborRanking,
}

impl QueryArgs {
    pub fn options(&self) -> QueryOptions {
        let mut options = QueryOptions::new(self.term.clone()).with_ranking(self.ranking);
        if let Some(limit) = self.limit {
            options = options.with_limit(limit);
        }
        if self.expand {
            options = options.expand(self.budget);
        }
        options
    }
}

pub async fn execute(config: CliConfig, args: QueryArgs) -> Result<()> {
    let result = run(&config, &args).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub async fn run(config: &CliConfig, args: &QueryArgs) -> Result<QueryResult> {
    let store = config.open_store()?;
    let options = args.options();
    debug!(?options, "Running query");

    let result = store
        .query(options)
        .await
        .with_context(|| format!("Query failed for term {:?}", args.term))?;
    debug!(nodes = result.nodes.len(), edges = result.edges.len(), "Query finished");
    Ok(result)
}
