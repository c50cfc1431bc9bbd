// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared wiring used by every front end: config, store, provider, extractor.

use std::sync::Arc;

use gemchat_config::model::ChatConfig;
use gemchat_core::{
    ChatError, ConversationStore, Fragment, MessageContent, ProviderAdapter, SessionContext,
};
use gemchat_extract::AttachmentExtractor;
use tracing::info;

use crate::params::EntryParams;
use crate::session::{Conversation, ConversationSettings};

/// An uploaded file before extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

/// Process-wide collaborators for opening conversations.
#[derive(Clone)]
pub struct ChatRuntime {
    config: Arc<ChatConfig>,
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn ProviderAdapter>,
    extractor: Arc<AttachmentExtractor>,
}

impl ChatRuntime {
    pub fn new(
        config: ChatConfig,
        store: Arc<dyn ConversationStore>,
        provider: Arc<dyn ProviderAdapter>,
    ) -> Self {
        let extractor = Arc::new(AttachmentExtractor::new(&config.extract));
        Self {
            config: Arc::new(config),
            store,
            provider,
            extractor,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn provider(&self) -> &Arc<dyn ProviderAdapter> {
        &self.provider
    }

    /// Resolves entry parameters against the loaded configuration.
    pub fn session_context(&self, params: &EntryParams) -> Result<SessionContext, ChatError> {
        params.resolve(&self.config.prompts, &self.config.storage)
    }

    /// Opens a conversation; history is loaded on first use.
    pub fn conversation(&self, ctx: SessionContext) -> Conversation {
        Conversation::new(
            ctx,
            ConversationSettings::from_config(&self.config),
            Arc::clone(&self.store),
            Arc::clone(&self.provider),
        )
    }

    /// Clears a user's history without starting a conversation.
    pub async fn clear(&self, ctx: &SessionContext) {
        self.store.clear_all(&ctx.store_id, &ctx.username).await;
        info!(username = %ctx.username, "history cleared on request");
    }

    /// Combines typed text and uploads into one turn's content.
    ///
    /// Text comes first, then one fragment per upload in upload order.
    pub fn build_input(&self, text: &str, uploads: &[Upload]) -> MessageContent {
        if uploads.is_empty() {
            return MessageContent::Text(text.to_string());
        }
        let mut fragments = Vec::with_capacity(uploads.len() + 1);
        if !text.trim().is_empty() {
            fragments.push(Fragment::Text(text.to_string()));
        }
        fragments.extend(uploads.iter().map(|u| {
            self.extractor
                .extract(&u.filename, u.mime_type.as_deref(), &u.data)
        }));
        MessageContent::Fragments(fragments)
    }
}
