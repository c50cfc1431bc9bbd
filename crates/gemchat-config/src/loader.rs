// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./gemchat.toml` > `~/.config/gemchat/gemchat.toml` > `/etc/gemchat/gemchat.toml`
//! with environment variable overrides via `GEMCHAT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ChatConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/gemchat/gemchat.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "gemchat.toml";

/// Top-level sections, used to turn `GEMCHAT_SECTION_KEY` into `section.key`.
const SECTIONS: &[&str] = &[
    "app", "gemini", "storage", "prompts", "history", "extract", "gateway",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/gemchat/gemchat.toml` (system-wide)
/// 3. `~/.config/gemchat/gemchat.toml` (user XDG config)
/// 4. `./gemchat.toml` (local directory)
/// 5. `GEMCHAT_*` environment variables
pub fn load_config() -> Result<ChatConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ChatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ChatConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gemchat").join(LOCAL_CONFIG_FILE))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `GEMCHAT_GEMINI_API_KEY` maps to `gemini.api_key`, not `gemini.api.key`.
fn env_provider() -> Env {
    Env::prefixed("GEMCHAT_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
