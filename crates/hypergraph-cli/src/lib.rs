//! hgraph CLI library
//!
//! Exposes argument parsing, configuration, logging setup and the
//! subcommand implementations so they can be exercised from tests.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
