// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the hosted LLM.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::ChatError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderMessage, SamplingConfig};

/// A stream of text deltas produced by the model.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// Adapter for the remote model.
///
/// The model is a black box: a session is created with a system instruction
/// and sampling parameters, then fed the full reshaped history per turn.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Creates a chat session bound to the given instruction and sampling parameters.
    async fn create_session(
        &self,
        system_instruction: Option<String>,
        sampling: SamplingConfig,
    ) -> Result<Box<dyn ProviderSession>, ChatError>;
}

/// A configured chat session on the provider.
#[async_trait]
pub trait ProviderSession: Send + Sync {
    /// Sends the full message list and returns the streamed response text.
    async fn send(&self, messages: Vec<ProviderMessage>) -> Result<TextStream, ChatError>;
}
