// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ConversationStore trait.

use std::io;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use gemchat_config::model::StorageConfig;
use gemchat_core::history::{expand_turns, flatten_request};
use gemchat_core::{
    AdapterType, ChatError, ConversationStore, HealthStatus, Message, MessageContent,
    PluginAdapter, StoreId, Turn,
};

use crate::database::{ConnectOptions, with_database};
use crate::queries;

/// SQLite-backed conversation store.
///
/// Holds no connection between calls. Each operation opens the store file
/// named by its [`StoreId`], does its work, and closes it again.
pub struct SqliteConversationStore {
    config: StorageConfig,
}

impl SqliteConversationStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Resolves the store for `username` under the configured data directory.
    pub fn store_for(&self, username: &str) -> Result<StoreId, ChatError> {
        StoreId::for_user(&self.config.data_dir, username, &self.config.extension)
    }

    /// Number of stored turns for `username`; zero when the store file is absent.
    pub async fn count_turns(&self, store: &StoreId, username: &str) -> Result<usize, ChatError> {
        if !tokio::fs::try_exists(store.path())
            .await
            .map_err(ChatError::storage)?
        {
            return Ok(0);
        }
        let user = username.to_string();
        let count = with_database(store.path(), self.options(), move |conn| {
            queries::turns::count_turns_for_user(conn, &user)
        })
        .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Moves `from`'s history to `to`: renames the store file, then rewrites
    /// the owner of every row so clearing under the new name removes it.
    ///
    /// If the rewrite fails the file is moved back.
    pub async fn rename_user(&self, from: &str, to: &str) -> Result<usize, ChatError> {
        let from_id = self.store_for(from)?;
        let to_id = self.store_for(to)?;
        self.rename(&from_id, &to_id).await?;

        let owner = to.to_string();
        let result = with_database(to_id.path(), self.options(), move |conn| {
            queries::turns::reassign_turns(conn, &owner)
        })
        .await;
        match result {
            Ok(moved) => {
                info!(from, to, moved, "history reassigned");
                Ok(moved)
            }
            Err(e) => {
                if let Err(undo) = tokio::fs::rename(to_id.path(), from_id.path()).await {
                    warn!(from, to, error = %undo, "could not restore store after failed reassign");
                }
                Err(e)
            }
        }
    }

    fn options(&self) -> ConnectOptions {
        ConnectOptions::from(&self.config)
    }
}

#[async_trait]
impl PluginAdapter for SqliteConversationStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatError> {
        match tokio::fs::create_dir_all(&self.config.data_dir).await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "data directory {} unavailable: {e}",
                self.config.data_dir.display()
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), ChatError> {
        // No connection outlives a single operation.
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn initialize(&self, store: &StoreId) -> Result<(), ChatError> {
        if let Some(parent) = store.path().parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ChatError::storage)?;
        }
        with_database(store.path(), self.options(), |conn| {
            queries::turns::create_table(conn)
        })
        .await?;
        debug!(store = %store, "conversation store initialized");
        Ok(())
    }

    async fn append(
        &self,
        store: &StoreId,
        username: &str,
        request: &MessageContent,
        response: &str,
    ) -> Result<(), ChatError> {
        let username = username.to_string();
        let request = flatten_request(request);
        let response = response.to_string();
        let id = with_database(store.path(), self.options(), move |conn| {
            queries::turns::insert_turn(conn, &username, &request, &response)
        })
        .await?;
        debug!(store = %store, turn_id = id, "turn appended");
        Ok(())
    }

    async fn retrieve_all(&self, store: &StoreId) -> Vec<Message> {
        match self.list_turns(store).await {
            Ok(turns) => expand_turns(&turns),
            Err(e) => {
                warn!(store = %store, error = %e, "history unavailable, starting empty");
                Vec::new()
            }
        }
    }

    async fn list_turns(&self, store: &StoreId) -> Result<Vec<Turn>, ChatError> {
        // Reading must not create the file as a side effect.
        if !tokio::fs::try_exists(store.path())
            .await
            .map_err(ChatError::storage)?
        {
            return Ok(Vec::new());
        }
        with_database(store.path(), self.options(), |conn| {
            queries::turns::list_turns(conn)
        })
        .await
    }

    async fn clear_all(&self, store: &StoreId, username: &str) {
        match tokio::fs::try_exists(store.path()).await {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                warn!(store = %store, error = %e, "could not stat store, nothing cleared");
                return;
            }
        }
        let user = username.to_string();
        let result = with_database(store.path(), self.options(), move |conn| {
            queries::turns::delete_turns_for_user(conn, &user)
        })
        .await;
        match result {
            Ok(removed) => info!(store = %store, username, removed, "history cleared"),
            Err(e) => warn!(store = %store, username, error = %e, "failed to clear history"),
        }
    }

    async fn rename(&self, from: &StoreId, to: &StoreId) -> Result<(), ChatError> {
        if !tokio::fs::try_exists(from.path())
            .await
            .map_err(ChatError::storage)?
        {
            return Err(ChatError::storage(io::Error::new(
                io::ErrorKind::NotFound,
                format!("store {from} does not exist"),
            )));
        }
        if tokio::fs::try_exists(to.path())
            .await
            .map_err(ChatError::storage)?
        {
            return Err(ChatError::storage(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("store {to} already exists"),
            )));
        }
        tokio::fs::rename(from.path(), to.path())
            .await
            .map_err(ChatError::storage)?;
        info!(from = %from, to = %to, "store renamed");
        Ok(())
    }
}
