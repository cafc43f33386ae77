//! Backend Router - Holds the configured advanced and simple backends

use std::sync::Arc;

use serde::Serialize;

use crate::providers::*;
use crate::types::*;

/// The backends available to the response cascade
///
/// Either slot may be empty; an empty slot means the matching stage is
/// skipped without a network call.
#[derive(Clone, Default)]
pub struct BackendRouter {
    advanced: Option<Arc<dyn LLMProvider>>,
    simple: Option<Arc<dyn LLMProvider>>,
}

/// Which backends are configured, for health and status output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub advanced: Option<ProviderKind>,
    pub simple: Option<ProviderKind>,
}

impl BackendStatus {
    pub fn is_offline(&self) -> bool {
        self.advanced.is_none() && self.simple.is_none()
    }
}

impl BackendRouter {
    /// Router with no backends: every request resolves locally
    pub fn offline() -> Self {
        Self::default()
    }

    /// Create a router from environment variables
    ///
    /// - `AGENT_LLM_BASE_URL` + `AGENT_LLM_API_KEY` enable the advanced
    ///   (tool-calling) backend; `AGENT_LLM_MODEL` picks the model.
    /// - `HUGGINGFACE_API_KEY` enables the simple backend;
    ///   `HUGGINGFACE_MODEL` picks the model.
    pub fn from_env() -> Self {
        // Try to load .env file (ignore errors)
        let _ = dotenvy::dotenv();

        let advanced = OpenAICompatProvider::from_env().map(|p| Arc::new(p) as Arc<dyn LLMProvider>);
        if advanced.is_none() {
            tracing::info!("Advanced backend credentials not found, tool agent disabled");
        }

        let simple = HuggingFaceProvider::from_env().map(|p| Arc::new(p) as Arc<dyn LLMProvider>);
        if simple.is_none() {
            tracing::info!("HUGGINGFACE_API_KEY not found, plain model disabled");
        }

        Self { advanced, simple }
    }

    /// Tool-capable backend, if configured
    pub fn advanced(&self) -> Option<&Arc<dyn LLMProvider>> {
        self.advanced.as_ref()
    }

    /// Plain text backend, if configured
    pub fn simple(&self) -> Option<&Arc<dyn LLMProvider>> {
        self.simple.as_ref()
    }

    pub fn status(&self) -> BackendStatus {
        BackendStatus {
            advanced: self.advanced.as_ref().map(|p| p.kind()),
            simple: self.simple.as_ref().map(|p| p.kind()),
        }
    }
}

impl std::fmt::Debug for BackendRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRouter")
            .field("advanced", &self.advanced.as_ref().map(|p| p.name()))
            .field("simple", &self.simple.as_ref().map(|p| p.name()))
            .finish()
    }
}

/// Builder for a backend router with explicit configuration
#[derive(Default)]
pub struct BackendRouterBuilder {
    advanced: Option<Arc<dyn LLMProvider>>,
    simple: Option<Arc<dyn LLMProvider>>,
}

impl BackendRouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_openai_compat(self, config: OpenAICompatConfig) -> Self {
        self.with_advanced(Arc::new(OpenAICompatProvider::new(config)))
    }

    pub fn with_huggingface(self, config: HuggingFaceConfig) -> Self {
        self.with_simple(Arc::new(HuggingFaceProvider::new(config)))
    }

    /// Install any provider in the advanced slot
    ///
    /// Providers that cannot run tools are refused; the slot stays empty.
    pub fn with_advanced(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        if provider.supports_tools() {
            self.advanced = Some(provider);
        } else {
            tracing::warn!(
                provider = provider.name(),
                "Provider does not support tool calls, advanced backend left unset"
            );
        }
        self
    }

    pub fn with_simple(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.simple = Some(provider);
        self
    }

    pub fn build(self) -> BackendRouter {
        BackendRouter {
            advanced: self.advanced,
            simple: self.simple,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hf_config() -> HuggingFaceConfig {
        HuggingFaceConfig {
            base_url: "http://localhost:9".to_string(),
            api_key: "hf_test".to_string(),
            model: "test/model".to_string(),
        }
    }

    #[test]
    fn test_offline_router_has_no_backends() {
        let router = BackendRouter::offline();
        assert!(router.advanced().is_none());
        assert!(router.simple().is_none());
        assert!(router.status().is_offline());
    }

    #[test]
    fn test_builder_installs_backends() {
        let router = BackendRouterBuilder::new()
            .with_openai_compat(OpenAICompatConfig {
                base_url: "http://localhost:9/v1".to_string(),
                api_key: "sk-test".to_string(),
                model: "gpt-4o-mini".to_string(),
            })
            .with_huggingface(hf_config())
            .build();

        let status = router.status();
        assert_eq!(status.advanced, Some(ProviderKind::OpenAICompat));
        assert_eq!(status.simple, Some(ProviderKind::HuggingFace));
    }

    #[test]
    fn test_text_only_provider_refused_for_advanced_slot() {
        let router = BackendRouterBuilder::new()
            .with_advanced(Arc::new(HuggingFaceProvider::new(hf_config())))
            .build();
        assert!(router.advanced().is_none());
    }
}
