use clap::{Parser, Subcommand, ValueEnum};
use hypergraph_core::NeighborRanking;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "hgraph")]
#[command(about = "hgraph - build and query a document hypergraph")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses RUST_LOG, then the config file value
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/hypergraph/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Graph database path (overrides config and HYPERGRAPH_DB_PATH)
    #[arg(long = "db", global = true)]
    pub db_path: Option<PathBuf>,

    /// Bulk ingest mode: relaxed durability, text index rebuilt at the end
    #[arg(long, global = true)]
    pub bulk: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the graph from the configured profile directory
    Init,

    /// Re-ingest the profile directory into an existing graph
    Update,

    /// Rebuild the full-text index from the node table
    RebuildIndex,

    /// Search nodes and optionally expand to their neighbors
    Query {
        /// Search term (empty lists nodes by id)
        term: String,

        /// Maximum number of matching nodes (default: 10)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Include edges touching the matched nodes
        #[arg(short = 'e', long)]
        expand: bool,

        /// Maximum number of neighbor edges
        #[arg(short = 'b', long, default_value_t = 10)]
        budget: usize,

        /// Neighbor edge ranking (degree, none)
        #[arg(short = 'r', long, default_value_t = NeighborRanking::Degree)]
        ranking: NeighborRanking,
    },

    /// Write a consistent snapshot of the graph database
    Export {
        /// Destination file (defaults to config export.output)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show row counts
    Stats,
}
