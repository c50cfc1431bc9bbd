// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry parameters (`username`, `pname`, `clearall`) and their resolution
//! into a [`SessionContext`].

use gemchat_config::model::{PromptsConfig, StorageConfig};
use gemchat_core::{ChatError, SessionContext, StoreId};
use serde::{Deserialize, Deserializer};

/// Parameters a client supplies when opening a chat, as in a URL query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryParams {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub pname: Option<String>,
    /// Presence alone sets the flag; `clearall=false` or `clearall=0` clears it.
    #[serde(default, deserialize_with = "presence_flag")]
    pub clearall: bool,
}

impl EntryParams {
    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn with_prompt(mut self, pname: impl Into<String>) -> Self {
        self.pname = Some(pname.into());
        self
    }

    /// Resolves the store location and system prompt.
    ///
    /// A missing or blank username is a [`ChatError::Config`]; the caller
    /// must stop and show it.
    pub fn resolve(
        &self,
        prompts: &PromptsConfig,
        storage: &StorageConfig,
    ) -> Result<SessionContext, ChatError> {
        let username = self
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ChatError::Config("a username is required to start a chat".into()))?;
        let store_id = StoreId::for_user(&storage.data_dir, username, &storage.extension)?;
        let prompt_name = self
            .pname
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        let system_prompt = prompts.resolve(prompt_name.as_deref());

        Ok(SessionContext {
            username: username.to_string(),
            store_id,
            prompt_name,
            system_prompt,
            clear_all: self.clearall,
        })
    }
}

fn presence_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(match value {
        None => false,
        Some(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"),
    })
}
