use anyhow::Result;
use clap::Parser;
use tracing::debug;

use hypergraph_cli::{
    cli::{Cli, Commands},
    commands::{self, ingest::IngestKind, query::QueryArgs},
    config::CliConfig,
    logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config, cli.db_path, cli.bulk)?;
    logging::init_logging(cli.log_level, cli.verbose, &config.settings.logging.level);
    debug!(db_path = %config.db_path().display(), "Configuration loaded");

    match cli.command {
        Commands::Init => commands::ingest::execute(config, IngestKind::Init).await?,
        Commands::Update => commands::ingest::execute(config, IngestKind::Update).await?,
        Commands::RebuildIndex => commands::index::execute(config).await?,
        Commands::Query {
            term,
            limit,
            expand,
            budget,
            ranking,
        } => {
            let args = QueryArgs {
                term,
                limit,
                expand,
                budget,
                ranking,
            };
            commands::query::execute(config, args).await?
        }
        Commands::Export { output } => commands::export::execute(config, output).await?,
        Commands::Stats => commands::stats::execute(config).await?,
    }

    Ok(())
}
