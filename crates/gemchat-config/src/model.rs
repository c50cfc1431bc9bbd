// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for gemchat.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::path::PathBuf;

use gemchat_core::types::{HarmBlockThreshold, HarmCategory, SafetySetting, SamplingConfig};
use serde::{Deserialize, Serialize};

/// Top-level gemchat configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Conversation store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Named system prompt presets.
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// How history and the system prompt are sent to the model.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Attachment extraction settings.
    #[serde(default)]
    pub extract: ExtractConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name used in the shell banner and health output.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "gemchat".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` falls back to the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL, without the `/models/...` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature (0.0 - 2.0).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling cutoff (0.0 - 1.0).
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum tokens generated per response.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Content-safety thresholds.
    #[serde(default)]
    pub safety: SafetyConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            safety: SafetyConfig::default(),
        }
    }
}

impl GeminiConfig {
    /// Builds the provider sampling parameters from this section.
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            temperature: self.temperature,
            top_p: self.top_p,
            max_output_tokens: self.max_output_tokens,
            safety_settings: self.safety.settings(),
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_temperature() -> f32 {
    1.0
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_request_timeout_secs() -> u64 {
    300
}

/// Per-category safety thresholds. Every category is `OFF` by default.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SafetyConfig {
    #[serde(default = "default_threshold")]
    pub hate_speech: HarmBlockThreshold,

    #[serde(default = "default_threshold")]
    pub dangerous_content: HarmBlockThreshold,

    #[serde(default = "default_threshold")]
    pub sexually_explicit: HarmBlockThreshold,

    #[serde(default = "default_threshold")]
    pub harassment: HarmBlockThreshold,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            hate_speech: default_threshold(),
            dangerous_content: default_threshold(),
            sexually_explicit: default_threshold(),
            harassment: default_threshold(),
        }
    }
}

impl SafetyConfig {
    /// Returns the four settings in wire order.
    pub fn settings(&self) -> Vec<SafetySetting> {
        vec![
            SafetySetting {
                category: HarmCategory::HateSpeech,
                threshold: self.hate_speech,
            },
            SafetySetting {
                category: HarmCategory::DangerousContent,
                threshold: self.dangerous_content,
            },
            SafetySetting {
                category: HarmCategory::SexuallyExplicit,
                threshold: self.sexually_explicit,
            },
            SafetySetting {
                category: HarmCategory::Harassment,
                threshold: self.harassment,
            },
        ]
    }
}

fn default_threshold() -> HarmBlockThreshold {
    HarmBlockThreshold::Off
}

/// Conversation store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding one `{username}_chat_history.{extension}` file per user.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File extension of store files.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            extension: default_extension(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("gemchat"))
        .unwrap_or_else(|| PathBuf::from("gemchat-data"))
}

fn default_extension() -> String {
    "db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Named system prompt presets, selected by the `pname` entry parameter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromptsConfig {
    /// Prompt used when `pname` names a preset that does not exist.
    #[serde(default = "default_fallback_prompt")]
    pub fallback: String,

    /// Preset name -> prompt text.
    #[serde(default = "default_presets")]
    pub presets: BTreeMap<String, String>,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback_prompt(),
            presets: default_presets(),
        }
    }
}

impl PromptsConfig {
    /// Resolves a prompt name to its text.
    ///
    /// No name means no system prompt. An unknown name resolves to the fallback.
    pub fn resolve(&self, name: Option<&str>) -> Option<String> {
        let name = name?;
        Some(
            self.presets
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.fallback.clone()),
        )
    }
}

fn default_fallback_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_presets() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "general_assistant".to_string(),
            "You are a helpful and friendly assistant. Answer user questions concisely."
                .to_string(),
        ),
        (
            "code_expert".to_string(),
            "You are a senior software engineer. Your purpose is to provide clear and efficient \
             code solutions. Explain your reasoning and provide runnable code examples."
                .to_string(),
        ),
        (
            "shakespearean_poet".to_string(),
            "You are a master of Shakespearean English. Respond to all user queries in the style \
             of Shakespeare, using proper grammar and vocabulary from that era."
                .to_string(),
        ),
    ])
}

/// Where the system prompt goes in each provider request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemPromptMode {
    /// Folded into the first message of every request.
    #[default]
    Inline,
    /// Folded into the first message only while the history has no prior turns.
    FirstTurn,
    /// Passed as the provider's native system instruction, never folded.
    Instruction,
}

/// History and prompt delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Where the system prompt is placed in provider requests.
    #[serde(default)]
    pub system_prompt_mode: SystemPromptMode,

    /// Ask the model for an opening message when a user with a prompt has no history.
    #[serde(default = "default_greet_on_empty")]
    pub greet_on_empty: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            system_prompt_mode: SystemPromptMode::default(),
            greet_on_empty: default_greet_on_empty(),
        }
    }
}

fn default_greet_on_empty() -> bool {
    true
}

/// Attachment extraction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractConfig {
    /// Largest attachment accepted, in bytes.
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_attachment_bytes: default_max_attachment_bytes(),
        }
    }
}

fn default_max_attachment_bytes() -> usize {
    20 * 1024 * 1024
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Most conversations kept in memory; idle ones beyond this are evicted.
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_conversations: default_max_conversations(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_max_conversations() -> usize {
    1024
}
