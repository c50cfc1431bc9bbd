// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for per-user conversation stores.

use async_trait::async_trait;

use crate::error::ChatError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Message, MessageContent, StoreId, Turn};

/// Adapter for the append-only conversation log.
///
/// Read paths degrade instead of failing: an empty or unreadable store is
/// "no history". Only writes and renames surface errors to the caller.
#[async_trait]
pub trait ConversationStore: PluginAdapter {
    /// Creates the turn table if absent. Safe to call on every session start.
    async fn initialize(&self, store: &StoreId) -> Result<(), ChatError>;

    /// Appends one turn. Non-text request fragments are not persisted.
    async fn append(
        &self,
        store: &StoreId,
        username: &str,
        request: &MessageContent,
        response: &str,
    ) -> Result<(), ChatError>;

    /// Returns the whole log as display messages in chronological order.
    async fn retrieve_all(&self, store: &StoreId) -> Vec<Message>;

    /// Returns the raw turns in chronological order.
    async fn list_turns(&self, store: &StoreId) -> Result<Vec<Turn>, ChatError>;

    /// Deletes every turn for `username`. Failures are logged, not returned.
    async fn clear_all(&self, store: &StoreId, username: &str);

    /// Renames the backing store.
    async fn rename(&self, from: &StoreId, to: &StoreId) -> Result<(), ChatError>;
}
