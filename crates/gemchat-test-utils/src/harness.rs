// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a chat runtime over a temp-dir SQLite store and
//! a [`MockProvider`].

use std::sync::Arc;

use gemchat_agent::{ChatRuntime, Conversation, EntryParams, TurnOutcome};
use gemchat_config::ChatConfig;
use gemchat_config::model::{HistoryConfig, StorageConfig, SystemPromptMode};
use gemchat_core::{ChatError, ConversationStore, StoreId};
use gemchat_storage::SqliteConversationStore;

use crate::mock_provider::{MockProvider, MockReply};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    mode: SystemPromptMode,
    greet_on_empty: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            mode: SystemPromptMode::default(),
            greet_on_empty: true,
        }
    }

    /// Set whole-text mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.replies = responses.into_iter().map(MockReply::text).collect();
        self
    }

    pub fn with_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies = replies;
        self
    }

    pub fn with_prompt_mode(mut self, mode: SystemPromptMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn without_greeting(mut self) -> Self {
        self.greet_on_empty = false;
        self
    }

    /// Build the harness, creating the temp data directory.
    pub fn build(self) -> Result<TestHarness, ChatError> {
        let temp_dir = tempfile::TempDir::new().map_err(ChatError::storage)?;
        let config = ChatConfig {
            storage: StorageConfig {
                data_dir: temp_dir.path().to_path_buf(),
                ..StorageConfig::default()
            },
            history: HistoryConfig {
                system_prompt_mode: self.mode,
                greet_on_empty: self.greet_on_empty,
            },
            ..ChatConfig::default()
        };

        let store = Arc::new(SqliteConversationStore::new(config.storage.clone()));
        let mock_provider = Arc::new(MockProvider::with_replies(self.replies));
        let runtime = ChatRuntime::new(config, store.clone(), mock_provider.clone());

        Ok(TestHarness {
            runtime,
            mock_provider,
            store,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock provider and temp storage.
pub struct TestHarness {
    pub runtime: ChatRuntime,
    pub mock_provider: Arc<MockProvider>,
    pub store: Arc<SqliteConversationStore>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Opens a conversation for `username` with an optional prompt preset.
    pub fn conversation(&self, username: &str, pname: Option<&str>) -> Result<Conversation, ChatError> {
        let mut params = EntryParams::for_user(username);
        if let Some(pname) = pname {
            params = params.with_prompt(pname);
        }
        let ctx = self.runtime.session_context(&params)?;
        Ok(self.runtime.conversation(ctx))
    }

    /// Sends one text turn for `username` in a fresh conversation.
    pub async fn send_message(&self, username: &str, text: &str) -> Result<TurnOutcome, ChatError> {
        let mut conversation = self.conversation(username, None)?;
        conversation.send(text.into(), |_| {}).await
    }

    pub fn store_for(&self, username: &str) -> Result<StoreId, ChatError> {
        self.store.store_for(username)
    }

    /// Number of persisted turns in `username`'s store.
    pub async fn turn_count(&self, username: &str) -> Result<usize, ChatError> {
        let id = self.store_for(username)?;
        Ok(self.store.list_turns(&id).await?.len())
    }
}
