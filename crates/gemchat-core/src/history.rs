// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure conversions between persisted turns and display messages.
//!
//! Storage is lossy for non-text content: a request stored from a fragment
//! list keeps only its text fragments, joined by single spaces.

use crate::types::{Fragment, Message, MessageContent, Turn};

/// Flattens request content to the string persisted in the `request` column.
pub fn flatten_request(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Fragments(fragments) => join_text(fragments),
    }
}

/// Space-joins every text fragment, dropping images.
pub fn join_text(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .filter_map(Fragment::text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Expands turns into (user, assistant) message pairs, skipping empty sides.
pub fn expand_turns(turns: &[Turn]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(turns.len() * 2);
    for turn in turns {
        if !turn.request.is_empty() {
            messages.push(Message::user(turn.request.clone()));
        }
        if !turn.response.is_empty() {
            messages.push(Message::assistant(turn.response.clone()));
        }
    }
    messages
}
