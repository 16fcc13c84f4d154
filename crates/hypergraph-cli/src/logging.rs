use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Pick the filter: explicit flag, then `RUST_LOG`, then the config value
pub fn build_filter(flag: Option<LogLevel>, verbose: bool, config_level: &str) -> EnvFilter {
    let flag = flag.or(verbose.then_some(LogLevel::Debug));
    if let Some(level) = flag {
        return EnvFilter::default().add_directive(LevelFilter::from(level).into());
    }

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber; logs go to stderr so stdout stays parseable
pub fn init_logging(flag: Option<LogLevel>, verbose: bool, config_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(flag, verbose, config_level))
        .with_writer(std::io::stderr)
        .init();
}
