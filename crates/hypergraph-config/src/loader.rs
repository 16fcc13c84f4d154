//! Configuration loading
//!
//! Precedence, lowest first: defaults, TOML file, environment variables.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{HypergraphConfig, IdStrategy};
use crate::error::{ConfigError, ConfigResult};

/// SQLite file holding the hypergraph
pub const ENV_DB_PATH: &str = "HYPERGRAPH_DB_PATH";
/// AI provider name
pub const ENV_AI_PROVIDER: &str = "AI_PROVIDER";
/// AI model name
pub const ENV_AI_MODEL: &str = "AI_MODEL";
/// Base markdown folder
pub const ENV_MARKDOWN_ROOT: &str = "MARKDOWN_ROOT";
/// Profile folder under the markdown root
pub const ENV_PROFILE_NAME: &str = "PROFILE_NAME";
/// Bulk ingest switch (`1`, `true`, `yes`, `on` / `0`, `false`, `no`, `off`)
pub const ENV_BULK_INGEST: &str = "HYPERGRAPH_BULK_INGEST";
/// Fallback id derivation (`filename` or `content_hash`)
pub const ENV_ID_STRATEGY: &str = "HYPERGRAPH_ID_STRATEGY";

/// Builder for loading a [`HypergraphConfig`]
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    use_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader reading the default config file (if present) and the environment
    pub fn new() -> Self {
        Self {
            file: None,
            use_env: true,
        }
    }

    /// Read this file instead of the default location; it must exist
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Skip environment overrides
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// `<config dir>/hypergraph/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hypergraph").join("config.toml"))
    }

    /// Load and validate the configuration
    pub fn load(&self) -> ConfigResult<HypergraphConfig> {
        let mut config = match &self.file {
            Some(path) => Self::load_file(path)?,
            None => match Self::default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::load_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    HypergraphConfig::default()
                }
            },
        };

        if self.use_env {
            apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn load_file(path: &Path) -> ConfigResult<HypergraphConfig> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: HypergraphConfig = toml::from_str(&text)?;
        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

/// Apply overrides from `lookup` (environment variable name → value)
///
/// Unset and empty values leave the current setting alone, except
/// `AI_MODEL` where an empty value clears the model.
pub fn apply_overrides<F>(config: &mut HypergraphConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(path) = non_empty(ENV_DB_PATH) {
        config.storage.db_path = PathBuf::from(path);
    }
    if let Some(value) = non_empty(ENV_BULK_INGEST) {
        config.storage.bulk_ingest = parse_bool(ENV_BULK_INGEST, &value)?;
    }
    if let Some(provider) = non_empty(ENV_AI_PROVIDER) {
        config.ai.provider = provider.trim().to_string();
    }
    if let Some(model) = lookup(ENV_AI_MODEL) {
        config.ai.model = model.trim().to_string();
    }
    if let Some(root) = non_empty(ENV_MARKDOWN_ROOT) {
        config.ingest.markdown_root = PathBuf::from(root);
    }
    if let Some(profile) = non_empty(ENV_PROFILE_NAME) {
        config.ingest.profile_name = profile.trim().to_string();
    }
    if let Some(strategy) = non_empty(ENV_ID_STRATEGY) {
        config.ingest.id_strategy = strategy.parse::<IdStrategy>()?;
    }

    Ok(())
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid(format!(
            "{} must be a boolean, got {:?}",
            key, other
        ))),
    }
}
