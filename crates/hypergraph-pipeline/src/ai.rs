//! AI backend capability
//!
//! Ingestion receives a backend by injection. No provider is wired to a real
//! service yet: `none` refuses every call and the named providers report
//! that they are not implemented.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("No AI backend configured, set AI_PROVIDER and AI_MODEL")]
    NotConfigured,

    #[error("{provider} backend is not implemented (model {model:?})")]
    NotImplemented { provider: AiProvider, model: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AiProvider {
    #[default]
    None,
    OpenAi,
    Gemini,
    Ollama,
}

impl AiProvider {
    /// Case-insensitive lookup; empty means `None`, unknown names fall back to `None`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "" | "none" => AiProvider::None,
            "openai" => AiProvider::OpenAi,
            "gemini" => AiProvider::Gemini,
            "ollama" => AiProvider::Ollama,
            _ => {
                warn!(provider = name, "Unknown AI provider, using none");
                AiProvider::None
            }
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AiProvider::None => "none",
            AiProvider::OpenAi => "openai",
            AiProvider::Gemini => "gemini",
            AiProvider::Ollama => "ollama",
        };
        f.write_str(name)
    }
}

/// Text completion backend
#[async_trait]
pub trait AiBackend: Send + Sync {
    fn provider(&self) -> AiProvider;

    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

/// Backend used when no provider is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBackend;

#[async_trait]
impl AiBackend for NoopBackend {
    fn provider(&self) -> AiProvider {
        AiProvider::None
    }

    async fn complete(&self, _prompt: &str) -> Result<String, AiError> {
        Err(AiError::NotConfigured)
    }
}

/// Placeholder for a named provider
#[derive(Debug, Clone)]
pub struct StubBackend {
    provider: AiProvider,
    model: String,
}

impl StubBackend {
    pub fn new(provider: AiProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AiBackend for StubBackend {
    fn provider(&self) -> AiProvider {
        self.provider
    }

    async fn complete(&self, _prompt: &str) -> Result<String, AiError> {
        Err(AiError::NotImplemented {
            provider: self.provider,
            model: self.model.clone(),
        })
    }
}

/// Backend for a provider name and model
pub fn build_backend(provider: &str, model: &str) -> Arc<dyn AiBackend> {
    let provider = AiProvider::from_name(provider);
    info!(%provider, model, "Building AI backend");

    match provider {
        AiProvider::None => Arc::new(NoopBackend),
        named => Arc::new(StubBackend::new(named, model)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names() {
        assert_eq!(AiProvider::from_name("OpenAI"), AiProvider::OpenAi);
        assert_eq!(AiProvider::from_name(" gemini "), AiProvider::Gemini);
        assert_eq!(AiProvider::from_name("OLLAMA"), AiProvider::Ollama);
        assert_eq!(AiProvider::from_name(""), AiProvider::None);
        assert_eq!(AiProvider::from_name("skynet"), AiProvider::None);
    }

    #[tokio::test]
    async fn test_none_backend_refuses() {
        let backend = build_backend("none", "");
        assert_eq!(backend.provider(), AiProvider::None);
        assert_eq!(backend.complete("hi").await, Err(AiError::NotConfigured));
    }

    #[tokio::test]
    async fn test_named_backends_are_stubs() {
        for name in ["openai", "gemini", "ollama"] {
            let backend = build_backend(name, "some-model");
            assert_eq!(backend.provider().to_string(), name);
            assert!(matches!(
                backend.complete("hi").await,
                Err(AiError::NotImplemented { ref model, .. }) if model == "some-model"
            ));
        }
    }
}
