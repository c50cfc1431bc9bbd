// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for gemchat.
//!
//! Implements [`ProviderAdapter`] over the `streamGenerateContent` SSE
//! endpoint. Sessions carry the system instruction and sampling settings;
//! each send posts the whole reshaped history.

pub mod client;
pub mod sse;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use gemchat_config::model::GeminiConfig;
use gemchat_core::types::SamplingConfig;
use gemchat_core::{
    AdapterType, ChatError, Fragment, HealthStatus, PluginAdapter, ProviderAdapter,
    ProviderMessage, ProviderSession, TextStream,
};
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::{ApiSafetySetting, Content, GenerateContentRequest, GenerationConfig, Part};

/// Environment variable consulted when `gemini.api_key` is unset.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiProvider {
    client: Arc<GeminiClient>,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig) -> Result<Self, ChatError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GeminiClient::new(
            &api_key,
            config.model.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        info!(model = %config.model, "Gemini provider initialized");
        Ok(Self::with_client(client))
    }

    /// Wraps an existing client.
    pub fn with_client(client: GeminiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ChatError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn create_session(
        &self,
        system_instruction: Option<String>,
        sampling: SamplingConfig,
    ) -> Result<Box<dyn ProviderSession>, ChatError> {
        Ok(Box::new(GeminiSession {
            client: Arc::clone(&self.client),
            system_instruction,
            sampling,
        }))
    }
}

/// A chat session bound to one instruction and sampling configuration.
pub struct GeminiSession {
    client: Arc<GeminiClient>,
    system_instruction: Option<String>,
    sampling: SamplingConfig,
}

#[async_trait]
impl ProviderSession for GeminiSession {
    async fn send(&self, messages: Vec<ProviderMessage>) -> Result<TextStream, ChatError> {
        let request = build_request(&messages, self.system_instruction.as_deref(), &self.sampling);
        debug!(
            model = %self.client.model(),
            message_count = request.contents.len(),
            "sending streaming request"
        );
        self.client.stream_generate_content(&request).await
    }
}

/// Maps provider messages and session settings to the wire request.
pub fn build_request(
    messages: &[ProviderMessage],
    system_instruction: Option<&str>,
    sampling: &SamplingConfig,
) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: messages
            .iter()
            .map(|m| Content {
                role: Some(m.role.to_string()),
                parts: m.parts.iter().map(fragment_to_part).collect(),
            })
            .collect(),
        system_instruction: system_instruction
            .filter(|s| !s.is_empty())
            .map(|s| Content {
                role: None,
                parts: vec![Part::text(s)],
            }),
        generation_config: GenerationConfig {
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_output_tokens: sampling.max_output_tokens,
        },
        safety_settings: sampling
            .safety_settings
            .iter()
            .map(|s| ApiSafetySetting {
                category: s.category.to_string(),
                threshold: s.threshold.to_string(),
            })
            .collect(),
    }
}

fn fragment_to_part(fragment: &Fragment) -> Part {
    match fragment {
        Fragment::Text(text) => Part::text(text.clone()),
        Fragment::Image { data, mime_type } => Part::inline(mime_type.clone(), BASE64.encode(data)),
        Fragment::ExtractedDoc { filename, text } => {
            Part::text(format!("[Document: {filename}]\n{text}"))
        }
    }
}

/// Resolves the API key from config, falling back to `GEMINI_API_KEY`.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, ChatError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            ChatError::Config(format!(
                "Gemini API key not found. Set gemini.api_key in config or {API_KEY_ENV} environment variable."
            ))
        })
}
