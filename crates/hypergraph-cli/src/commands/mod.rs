pub mod export;
pub mod index;
pub mod ingest;
pub mod query;
pub mod stats;
