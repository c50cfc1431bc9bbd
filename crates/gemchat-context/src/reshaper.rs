// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request assembly under a configured system prompt delivery mode.

use gemchat_config::model::{HistoryConfig, SystemPromptMode};
use gemchat_core::{Message, MessageContent, ProviderMessage, Role};
use tracing::debug;

use crate::reshape::{greeting_messages, non_empty, to_provider_messages};

/// A request ready for a provider session.
#[derive(Debug, Clone, PartialEq)]
pub struct ReshapedRequest {
    pub messages: Vec<ProviderMessage>,
    /// Set only in [`SystemPromptMode::Instruction`].
    pub system_instruction: Option<String>,
}

/// Builds provider requests from history plus new input.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryReshaper {
    mode: SystemPromptMode,
}

impl HistoryReshaper {
    pub fn new(mode: SystemPromptMode) -> Self {
        Self { mode }
    }

    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(config.system_prompt_mode)
    }

    pub fn mode(&self) -> SystemPromptMode {
        self.mode
    }

    /// Appends `input` as a user message to `history` and reshapes the lot.
    pub fn build_request(
        &self,
        history: &[Message],
        input: &MessageContent,
        system_prompt: Option<&str>,
    ) -> ReshapedRequest {
        let mut all = Vec::with_capacity(history.len() + 1);
        all.extend_from_slice(history);
        all.push(Message::user(input.clone()));

        let prompt = non_empty(system_prompt);
        let has_prior_turns = history.iter().any(|m| m.role != Role::System);
        let (fold, system_instruction) = match self.mode {
            SystemPromptMode::Inline => (prompt, None),
            SystemPromptMode::FirstTurn if has_prior_turns => (None, None),
            SystemPromptMode::FirstTurn => (prompt, None),
            SystemPromptMode::Instruction => (None, prompt.map(str::to_string)),
        };

        let messages = to_provider_messages(&all, fold);
        debug!(
            mode = ?self.mode,
            history_len = history.len(),
            message_count = messages.len(),
            folded = fold.is_some(),
            "request reshaped"
        );
        ReshapedRequest {
            messages,
            system_instruction,
        }
    }

    /// The opening request for a user with no history.
    ///
    /// The prompt is always sent as the lone user message so the model has
    /// something to answer, whatever the mode.
    pub fn build_greeting(&self, system_prompt: Option<&str>) -> Option<ReshapedRequest> {
        let messages = greeting_messages(system_prompt);
        if messages.is_empty() {
            return None;
        }
        Some(ReshapedRequest {
            messages,
            system_instruction: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemchat_core::{Fragment, ProviderRole};

    fn history(turns: usize) -> Vec<Message> {
        let mut messages = vec![Message::system("Be kind.")];
        for i in 0..turns {
            messages.push(Message::user(format!("q{i}")));
            messages.push(Message::assistant(format!("a{i}")));
        }
        messages
    }

    fn prompt_count(request: &ReshapedRequest) -> usize {
        request
            .messages
            .iter()
            .flat_map(|m| &m.parts)
            .filter(|p| **p == Fragment::Text("Be kind.".into()))
            .count()
    }

    #[test]
    fn inline_folds_on_every_request() {
        let reshaper = HistoryReshaper::new(SystemPromptMode::Inline);
        for turns in [0, 5] {
            let req = reshaper.build_request(&history(turns), &"next".into(), Some("Be kind."));
            assert_eq!(prompt_count(&req), 1);
            assert_eq!(req.messages[0].parts[0], Fragment::Text("Be kind.".into()));
            assert!(req.system_instruction.is_none());
        }
    }

    #[test]
    fn new_input_is_last_user_message() {
        let reshaper = HistoryReshaper::default();
        let req = reshaper.build_request(&history(2), &"next".into(), None);
        let last = req.messages.last().unwrap();
        assert_eq!(last.role, ProviderRole::User);
        assert_eq!(last.parts, vec![Fragment::Text("next".into())]);
        assert_eq!(req.messages.len(), 5);
    }

    #[test]
    fn first_turn_folds_only_without_prior_turns() {
        let reshaper = HistoryReshaper::new(SystemPromptMode::FirstTurn);
        let fresh = reshaper.build_request(&history(0), &"hi".into(), Some("Be kind."));
        assert_eq!(prompt_count(&fresh), 1);
        let later = reshaper.build_request(&history(3), &"hi".into(), Some("Be kind."));
        assert_eq!(prompt_count(&later), 0);
    }

    #[test]
    fn instruction_mode_never_folds() {
        let reshaper = HistoryReshaper::new(SystemPromptMode::Instruction);
        let req = reshaper.build_request(&history(1), &"hi".into(), Some("Be kind."));
        assert_eq!(prompt_count(&req), 0);
        assert_eq!(req.system_instruction.as_deref(), Some("Be kind."));
    }

    #[test]
    fn greeting_requires_a_prompt() {
        let reshaper = HistoryReshaper::default();
        assert!(reshaper.build_greeting(None).is_none());
        let greeting = reshaper.build_greeting(Some("Be kind.")).unwrap();
        assert_eq!(greeting.messages.len(), 1);
        assert_eq!(prompt_count(&greeting), 1);
    }

    #[test]
    fn from_config_uses_configured_mode() {
        let config = HistoryConfig {
            system_prompt_mode: SystemPromptMode::Instruction,
            ..HistoryConfig::default()
        };
        assert_eq!(
            HistoryReshaper::from_config(&config).mode(),
            SystemPromptMode::Instruction
        );
    }
}
