// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gemchat history`, `gemchat clear` and `gemchat rename`.
//!
//! These work on the store files directly and never contact the model.

use colored::Colorize;
use gemchat_config::ChatConfig;
use gemchat_core::{ChatError, ConversationStore, Turn};
use gemchat_storage::SqliteConversationStore;

/// Prints every stored turn for `username`, oldest first.
pub async fn print_history(config: &ChatConfig, username: &str) -> Result<(), ChatError> {
    let store = SqliteConversationStore::new(config.storage.clone());
    let id = store.store_for(username)?;
    let turns = store.list_turns(&id).await?;
    if turns.is_empty() {
        println!("{}", format!("no history for {username}").dimmed());
        return Ok(());
    }
    for turn in &turns {
        print_turn(turn);
    }
    Ok(())
}

fn print_turn(turn: &Turn) {
    println!("{}", turn.timestamp.dimmed());
    if !turn.request.is_empty() {
        println!("{} {}", "user:".cyan().bold(), turn.request);
    }
    if !turn.response.is_empty() {
        println!("{} {}", "assistant:".green().bold(), turn.response);
    }
    println!();
}

/// Deletes all turns for `username`.
pub async fn clear_history(config: &ChatConfig, username: &str) -> Result<(), ChatError> {
    let removed = clear_turns(config, username).await?;
    println!("cleared {removed} turn(s) for {username}");
    Ok(())
}

/// Returns how many of `username`'s turns were removed.
///
/// Fails if any remain afterwards, since the store itself only logs a failed delete.
pub(crate) async fn clear_turns(config: &ChatConfig, username: &str) -> Result<usize, ChatError> {
    let store = SqliteConversationStore::new(config.storage.clone());
    let id = store.store_for(username)?;
    let before = store.count_turns(&id, username).await?;
    store.clear_all(&id, username).await;
    let left = store.count_turns(&id, username).await?;
    if left > 0 {
        return Err(ChatError::Internal(format!(
            "{left} turn(s) for {username} could not be deleted"
        )));
    }
    Ok(before)
}

/// Moves `from`'s history to `to`. Fails if `to` already has one.
pub async fn rename_history(config: &ChatConfig, from: &str, to: &str) -> Result<(), ChatError> {
    let store = SqliteConversationStore::new(config.storage.clone());
    let moved = store.rename_user(from, to).await?;
    println!("moved {moved} turn(s) from {from} to {to}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemchat_config::model::StorageConfig;
    use gemchat_core::MessageContent;

    fn config_in(dir: &std::path::Path) -> ChatConfig {
        ChatConfig {
            storage: StorageConfig {
                data_dir: dir.to_path_buf(),
                ..StorageConfig::default()
            },
            ..ChatConfig::default()
        }
    }

    #[tokio::test]
    async fn clear_reports_removed_turns() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let store = SqliteConversationStore::new(config.storage.clone());
        let id = store.store_for("alice").unwrap();
        store.initialize(&id).await.unwrap();
        store
            .append(&id, "alice", &MessageContent::Text("hi".into()), "hello")
            .await
            .unwrap();

        assert_eq!(clear_turns(&config, "alice").await.unwrap(), 1);
        assert!(store.list_turns(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_of_unknown_user_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        assert_eq!(clear_turns(&config, "nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rename_moves_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let store = SqliteConversationStore::new(config.storage.clone());
        let id = store.store_for("alice").unwrap();
        store.initialize(&id).await.unwrap();

        store
            .append(&id, "alice", &MessageContent::Text("hi".into()), "hello")
            .await
            .unwrap();

        rename_history(&config, "alice", "alicia").await.unwrap();
        assert!(!id.path().exists());
        assert!(store.store_for("alicia").unwrap().path().exists());
        assert_eq!(clear_turns(&config, "alicia").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rename_rejects_bad_username() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let err = rename_history(&config, "alice", "../evil").await.unwrap_err();
        assert!(matches!(err, ChatError::Config(_)));
    }
}
