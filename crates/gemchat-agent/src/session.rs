// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One user's conversation: in-memory display history, store writes, and
//! the reshape -> provider -> persist turn loop.

use std::sync::Arc;

use futures::StreamExt;
use gemchat_config::model::ChatConfig;
use gemchat_context::{HistoryReshaper, ReshapedRequest};
use gemchat_core::history::flatten_request;
use gemchat_core::types::SamplingConfig;
use gemchat_core::{
    ChatError, ConversationStore, Message, MessageContent, ProviderAdapter, Role, SessionContext,
};
use tracing::{debug, info, warn};

/// States of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// Waiting for input.
    Idle,
    /// Reshaping history and opening the provider call.
    Processing,
    /// Consuming the streamed response.
    Responding,
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationState::Idle => write!(f, "idle"),
            ConversationState::Processing => write!(f, "processing"),
            ConversationState::Responding => write!(f, "responding"),
        }
    }
}

/// Per-conversation settings taken from [`ChatConfig`].
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    pub reshaper: HistoryReshaper,
    pub sampling: SamplingConfig,
    pub greet_on_empty: bool,
}

impl ConversationSettings {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            reshaper: HistoryReshaper::from_config(&config.history),
            sampling: config.gemini.sampling(),
            greet_on_empty: config.history.greet_on_empty,
        }
    }
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            reshaper: HistoryReshaper::default(),
            sampling: SamplingConfig::default(),
            greet_on_empty: true,
        }
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Full response text.
    pub response: String,
    /// False when the store write failed; the turn is still in memory.
    pub persisted: bool,
}

/// A single user's chat session.
pub struct Conversation {
    ctx: SessionContext,
    settings: ConversationSettings,
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn ProviderAdapter>,
    state: ConversationState,
    messages: Vec<Message>,
    loaded: bool,
}

impl Conversation {
    pub fn new(
        ctx: SessionContext,
        settings: ConversationSettings,
        store: Arc<dyn ConversationStore>,
        provider: Arc<dyn ProviderAdapter>,
    ) -> Self {
        Self {
            ctx,
            settings,
            store,
            provider,
            state: ConversationState::Idle,
            messages: Vec::new(),
            loaded: false,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Display history, including the synthesized system message if a prompt is set.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True once at least one user or assistant message exists.
    pub fn has_turns(&self) -> bool {
        self.messages.iter().any(|m| m.role != Role::System)
    }

    /// Builds the in-memory history from the store. Runs once per conversation.
    ///
    /// Store failures degrade to an empty history.
    pub async fn load(&mut self) {
        if self.loaded {
            return;
        }
        if let Err(e) = self.store.initialize(&self.ctx.store_id).await {
            warn!(store = %self.ctx.store_id, error = %e, "store initialization failed");
        }
        self.messages = self.system_messages();
        self.messages
            .extend(self.store.retrieve_all(&self.ctx.store_id).await);
        self.loaded = true;
        info!(
            username = %self.ctx.username,
            prompt = self.ctx.prompt_name.as_deref().unwrap_or("none"),
            message_count = self.messages.len(),
            "conversation loaded"
        );
    }

    fn system_messages(&self) -> Vec<Message> {
        self.ctx
            .system_prompt
            .iter()
            .map(|p| Message::system(p.clone()))
            .collect()
    }

    /// Asks the model for an opening message when the history is empty.
    ///
    /// Returns `Ok(None)` when no greeting applies: greetings disabled, no
    /// system prompt, or prior turns exist. The reply is persisted with an
    /// empty request so only the assistant side is shown later.
    pub async fn greet<F>(&mut self, on_chunk: F) -> Result<Option<TurnOutcome>, ChatError>
    where
        F: FnMut(&str) + Send,
    {
        self.load().await;
        if !self.settings.greet_on_empty || self.has_turns() {
            return Ok(None);
        }
        let Some(request) = self
            .settings
            .reshaper
            .build_greeting(self.ctx.system_prompt.as_deref())
        else {
            return Ok(None);
        };

        let response = self.run(request, on_chunk).await?;
        self.messages.push(Message::assistant(response.clone()));
        let persisted = self.persist(&MessageContent::Text(String::new()), &response).await;
        debug!(username = %self.ctx.username, "greeting delivered");
        Ok(Some(TurnOutcome {
            response,
            persisted,
        }))
    }

    /// Sends one user turn and streams the reply through `on_chunk`.
    ///
    /// On a provider error nothing is added to the history or the store.
    pub async fn send<F>(&mut self, input: MessageContent, on_chunk: F) -> Result<TurnOutcome, ChatError>
    where
        F: FnMut(&str) + Send,
    {
        if is_empty_input(&input) {
            return Err(ChatError::Config("message is empty".into()));
        }
        self.load().await;

        let request = self.settings.reshaper.build_request(
            &self.messages,
            &input,
            self.ctx.system_prompt.as_deref(),
        );
        let response = self.run(request, on_chunk).await?;

        self.messages.push(Message::user(input.clone()));
        self.messages.push(Message::assistant(response.clone()));
        let persisted = self.persist(&input, &response).await;
        Ok(TurnOutcome {
            response,
            persisted,
        })
    }

    /// Deletes this user's turns and resets the in-memory history.
    pub async fn clear(&mut self) {
        // Loading first also creates the table, so turns after a clear persist.
        self.load().await;
        self.store
            .clear_all(&self.ctx.store_id, &self.ctx.username)
            .await;
        self.messages = self.system_messages();
    }

    async fn run<F>(&mut self, request: ReshapedRequest, on_chunk: F) -> Result<String, ChatError>
    where
        F: FnMut(&str) + Send,
    {
        self.state = ConversationState::Processing;
        let result = self.stream_response(request, on_chunk).await;
        self.state = ConversationState::Idle;
        if let Err(ref e) = result {
            warn!(username = %self.ctx.username, error = %e, "turn failed, nothing recorded");
        }
        result
    }

    async fn stream_response<F>(
        &mut self,
        request: ReshapedRequest,
        mut on_chunk: F,
    ) -> Result<String, ChatError>
    where
        F: FnMut(&str) + Send,
    {
        debug!(
            username = %self.ctx.username,
            message_count = request.messages.len(),
            state = %self.state,
            "calling provider"
        );
        let session = self
            .provider
            .create_session(request.system_instruction, self.settings.sampling.clone())
            .await?;
        let mut stream = session.send(request.messages).await?;

        self.state = ConversationState::Responding;
        let mut response = String::new();
        while let Some(delta) = stream.next().await {
            let delta = delta?;
            on_chunk(&delta);
            response.push_str(&delta);
        }
        Ok(response)
    }

    async fn persist(&self, request: &MessageContent, response: &str) -> bool {
        match self
            .store
            .append(&self.ctx.store_id, &self.ctx.username, request, response)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(store = %self.ctx.store_id, error = %e, "turn not persisted");
                false
            }
        }
    }
}

fn is_empty_input(input: &MessageContent) -> bool {
    match input {
        MessageContent::Text(text) => text.trim().is_empty(),
        MessageContent::Fragments(fragments) => {
            fragments.iter().all(|f| !f.is_attachment()) && flatten_request(input).trim().is_empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemchat_core::Fragment;

    #[test]
    fn state_display() {
        assert_eq!(ConversationState::Idle.to_string(), "idle");
        assert_eq!(ConversationState::Responding.to_string(), "responding");
    }

    #[test]
    fn empty_input_detection() {
        assert!(is_empty_input(&"   ".into()));
        assert!(is_empty_input(&MessageContent::Fragments(vec![])));
        assert!(!is_empty_input(&"hi".into()));
        assert!(!is_empty_input(&MessageContent::Fragments(vec![Fragment::Image {
            data: vec![1],
            mime_type: "image/png".into(),
        }])));
    }
}
