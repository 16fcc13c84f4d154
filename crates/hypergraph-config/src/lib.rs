//! # Hypergraph Configuration
//!
//! Layered configuration for the hypergraph tools: built-in defaults, then an
//! optional TOML file, then environment variables.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hypergraph_config::ConfigLoader;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().load()?;
//!     println!("ingesting {}", config.ingest.profile_root().display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod loader;

pub use config::*;
pub use error::{ConfigError, ConfigResult};
pub use loader::*;
