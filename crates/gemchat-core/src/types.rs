// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the gemchat workspace.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ChatError;

/// Maximum accepted username length.
const MAX_USERNAME_LEN: usize = 64;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
    Extractor,
}

// --- Conversation content ---

/// Role of a display message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Role of a message on the provider wire. The provider has no system role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    User,
    Model,
}

impl From<Role> for ProviderRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Assistant => ProviderRole::Model,
            Role::User | Role::System => ProviderRole::User,
        }
    }
}

impl From<ProviderRole> for Role {
    fn from(role: ProviderRole) -> Self {
        match role {
            ProviderRole::Model => Role::Assistant,
            ProviderRole::User => Role::User,
        }
    }
}

/// One atomic piece of message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Plain text typed by the user or produced by the model.
    Text(String),
    /// A decoded image, kept as the original encoded bytes.
    Image { data: Vec<u8>, mime_type: String },
    /// Text pulled out of an attached document (PDF, DOCX, plain text).
    ExtractedDoc { filename: String, text: String },
}

impl Fragment {
    /// Returns the text carried by this fragment, if it carries any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Fragment::Text(text) => Some(text),
            Fragment::ExtractedDoc { text, .. } => Some(text),
            Fragment::Image { .. } => None,
        }
    }

    /// True for fragments that came from an uploaded file.
    pub fn is_attachment(&self) -> bool {
        !matches!(self, Fragment::Text(_))
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Fragment::Text(text.to_string())
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Fragment::Text(text)
    }
}

/// Message content: either a bare string or an ordered list of fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Fragments(Vec<Fragment>),
}

impl MessageContent {
    /// Normalizes the content into a fragment list (a bare string becomes a singleton).
    pub fn to_fragments(&self) -> Vec<Fragment> {
        match self {
            MessageContent::Text(text) => vec![Fragment::Text(text.clone())],
            MessageContent::Fragments(fragments) => fragments.clone(),
        }
    }

    /// Consuming variant of [`MessageContent::to_fragments`].
    pub fn into_fragments(self) -> Vec<Fragment> {
        match self {
            MessageContent::Text(text) => vec![Fragment::Text(text)],
            MessageContent::Fragments(fragments) => fragments,
        }
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<Vec<Fragment>> for MessageContent {
    fn from(fragments: Vec<Fragment>) -> Self {
        MessageContent::Fragments(fragments)
    }
}

/// An in-memory chat entry used for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::System, content)
    }
}

/// A wire-shaped message sent to the remote model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMessage {
    pub role: ProviderRole,
    pub parts: Vec<Fragment>,
}

/// One persisted request/response pair for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: i64,
    pub username: String,
    pub request: String,
    pub response: String,
    /// ISO 8601 timestamp assigned by the store at insert time.
    pub timestamp: String,
}

// --- Provider sampling ---

/// Content-safety categories the provider can filter on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    #[strum(serialize = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[strum(serialize = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
    #[strum(serialize = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[strum(serialize = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
}

/// Blocking threshold for a safety category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    Off,
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

/// A single (category, threshold) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Sampling parameters handed to the provider when a session is created.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub safety_settings: Vec<SafetySetting>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            max_output_tokens: 8192,
            safety_settings: [
                HarmCategory::HateSpeech,
                HarmCategory::DangerousContent,
                HarmCategory::SexuallyExplicit,
                HarmCategory::Harassment,
            ]
            .into_iter()
            .map(|category| SafetySetting {
                category,
                threshold: HarmBlockThreshold::Off,
            })
            .collect(),
        }
    }
}

// --- Session identity ---

/// Location of one user's conversation store on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreId(PathBuf);

impl StoreId {
    /// Wraps an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Resolves `{dir}/{username}_chat_history.{extension}` after validating the username.
    pub fn for_user(dir: &Path, username: &str, extension: &str) -> Result<Self, ChatError> {
        validate_username(username)?;
        Ok(Self(dir.join(format!("{username}_chat_history.{extension}"))))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Checks that a username is safe to embed in a file name.
pub fn validate_username(username: &str) -> Result<(), ChatError> {
    if username.is_empty() {
        return Err(ChatError::Config("username must not be empty".into()));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(ChatError::Config(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if username.starts_with('.') {
        return Err(ChatError::Config("username must not start with `.`".into()));
    }
    if let Some(bad) = username
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(ChatError::Config(format!(
            "username contains invalid character `{bad}`"
        )));
    }
    Ok(())
}

/// Per-request session context. Replaces process-wide username/database globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub username: String,
    pub store_id: StoreId,
    /// Name of the selected prompt preset, if any.
    pub prompt_name: Option<String>,
    /// Resolved system prompt text for `prompt_name`.
    pub system_prompt: Option<String>,
    /// When set, the request only clears the user's history.
    pub clear_all: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_mapping_collapses_system_to_user() {
        assert_eq!(ProviderRole::from(Role::Assistant), ProviderRole::Model);
        assert_eq!(ProviderRole::from(Role::User), ProviderRole::User);
        assert_eq!(ProviderRole::from(Role::System), ProviderRole::User);
        assert_eq!(Role::from(ProviderRole::Model), Role::Assistant);
    }

    #[test]
    fn roles_display_lowercase() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!(ProviderRole::Model.to_string(), "model");
        assert_eq!(Role::from_str("system").unwrap(), Role::System);
    }

    #[test]
    fn harm_category_uses_wire_names() {
        assert_eq!(
            HarmCategory::DangerousContent.to_string(),
            "HARM_CATEGORY_DANGEROUS_CONTENT"
        );
        assert_eq!(HarmBlockThreshold::Off.to_string(), "OFF");
        assert_eq!(
            HarmBlockThreshold::from_str("BLOCK_ONLY_HIGH").unwrap(),
            HarmBlockThreshold::BlockOnlyHigh
        );
    }

    #[test]
    fn default_sampling_disables_all_four_categories() {
        let sampling = SamplingConfig::default();
        assert_eq!(sampling.safety_settings.len(), 4);
        assert!(sampling
            .safety_settings
            .iter()
            .all(|s| s.threshold == HarmBlockThreshold::Off));
    }

    #[test]
    fn bare_text_normalizes_to_singleton() {
        let content = MessageContent::from("hi");
        assert_eq!(content.to_fragments(), vec![Fragment::Text("hi".into())]);
    }

    #[test]
    fn image_fragment_has_no_text() {
        let image = Fragment::Image {
            data: vec![1, 2, 3],
            mime_type: "image/png".into(),
        };
        assert_eq!(image.text(), None);
        assert!(image.is_attachment());
        let doc = Fragment::ExtractedDoc {
            filename: "a.pdf".into(),
            text: "body".into(),
        };
        assert_eq!(doc.text(), Some("body"));
    }

    #[test]
    fn store_id_for_user_builds_file_name() {
        let id = StoreId::for_user(Path::new("/data"), "alice", "db").unwrap();
        assert_eq!(id.path(), Path::new("/data/alice_chat_history.db"));
    }

    #[test]
    fn username_rejects_path_traversal() {
        assert!(validate_username("../etc").is_err());
        assert!(validate_username("a/b").is_err());
        assert!(validate_username(".hidden").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());
        assert!(validate_username("bob.smith-2_x").is_ok());
    }
}
