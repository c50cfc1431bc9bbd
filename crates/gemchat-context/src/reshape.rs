// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure mapping between display messages and provider messages.
//!
//! The provider has no system role, so the system prompt travels as the
//! first fragment of the first message instead.

use gemchat_core::{Fragment, Message, MessageContent, ProviderMessage, ProviderRole, Role};

/// Maps display messages to provider messages, folding in `system_prompt`.
///
/// System-role messages are dropped. A non-empty prompt becomes the first
/// part of the first resulting message, whatever that message's role. An
/// empty input yields an empty output even with a prompt; use
/// [`greeting_messages`] for that case.
pub fn to_provider_messages(messages: &[Message], system_prompt: Option<&str>) -> Vec<ProviderMessage> {
    let mut out: Vec<ProviderMessage> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| ProviderMessage {
            role: ProviderRole::from(m.role),
            parts: m.content.to_fragments(),
        })
        .collect();

    if let Some(prompt) = non_empty(system_prompt)
        && let Some(first) = out.first_mut()
    {
        first.parts.insert(0, Fragment::Text(prompt.to_string()));
    }
    out
}

/// The opening request for an empty history: one user message holding only the prompt.
pub fn greeting_messages(system_prompt: Option<&str>) -> Vec<ProviderMessage> {
    match non_empty(system_prompt) {
        Some(prompt) => vec![ProviderMessage {
            role: ProviderRole::User,
            parts: vec![Fragment::Text(prompt.to_string())],
        }],
        None => Vec::new(),
    }
}

/// Text to render for a message: the bare text, or the first text fragment.
///
/// Returns `None` for image-only content; callers skip rendering it.
pub fn extract_display_text(message: &Message) -> Option<&str> {
    match &message.content {
        MessageContent::Text(text) => Some(text.as_str()),
        MessageContent::Fragments(fragments) => fragments.iter().find_map(Fragment::text),
    }
}

/// Inverse role mapping (model -> assistant), keeping parts as-is.
pub fn to_display_messages(messages: &[ProviderMessage]) -> Vec<Message> {
    messages
        .iter()
        .map(|m| Message {
            role: Role::from(m.role),
            content: MessageContent::Fragments(m.parts.clone()),
        })
        .collect()
}

pub(crate) fn non_empty(prompt: Option<&str>) -> Option<&str> {
    prompt.filter(|p| !p.trim().is_empty())
}
