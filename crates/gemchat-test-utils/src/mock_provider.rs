// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with scripted replies and
//! records every request it receives.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use gemchat_core::types::SamplingConfig;
use gemchat_core::{
    AdapterType, ChatError, HealthStatus, PluginAdapter, ProviderAdapter, ProviderMessage,
    ProviderSession, TextStream,
};

/// What the mock does for one `send` call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Stream these deltas, then finish.
    Chunks(Vec<String>),
    /// Refuse the request with a provider error.
    Fail(String),
    /// Stream these deltas, then fail.
    FailAfter(Vec<String>, String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Chunks(vec![text.into()])
    }
}

/// One recorded `send` call with its session settings.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system_instruction: Option<String>,
    pub sampling: SamplingConfig,
    pub messages: Vec<ProviderMessage>,
}

/// A mock LLM provider that returns pre-configured replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
#[derive(Clone, Default)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider pre-loaded with whole-text responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self::with_replies(responses.into_iter().map(MockReply::text).collect())
    }

    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            requests: Arc::default(),
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn push_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Every request sent so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
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
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn create_session(
        &self,
        system_instruction: Option<String>,
        sampling: SamplingConfig,
    ) -> Result<Box<dyn ProviderSession>, ChatError> {
        Ok(Box::new(MockSession {
            provider: self.clone(),
            system_instruction,
            sampling,
        }))
    }
}

struct MockSession {
    provider: MockProvider,
    system_instruction: Option<String>,
    sampling: SamplingConfig,
}

#[async_trait]
impl ProviderSession for MockSession {
    async fn send(&self, messages: Vec<ProviderMessage>) -> Result<TextStream, ChatError> {
        self.provider.requests.lock().await.push(RecordedRequest {
            system_instruction: self.system_instruction.clone(),
            sampling: self.sampling.clone(),
            messages,
        });
        let reply = self
            .provider
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::text("mock response"));

        let items: Vec<Result<String, ChatError>> = match reply {
            MockReply::Chunks(chunks) => chunks.into_iter().map(Ok).collect(),
            MockReply::Fail(message) => {
                return Err(ChatError::Provider {
                    message,
                    source: None,
                });
            }
            MockReply::FailAfter(chunks, message) => chunks
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(ChatError::Provider {
                    message,
                    source: None,
                })))
                .collect(),
        };
        Ok(Box::pin(stream::iter(items)))
    }
}
