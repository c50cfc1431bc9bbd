// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for history reshaping.

use gemchat_config::model::SystemPromptMode;
use gemchat_context::{HistoryReshaper, to_display_messages, to_provider_messages};
use gemchat_core::{Fragment, Message, MessageContent, Role};
use proptest::prelude::*;

const PROMPT: &str = "<<system prompt marker>>";

fn fragment() -> impl Strategy<Value = Fragment> {
    prop_oneof![
        "[a-z ]{0,12}".prop_map(Fragment::Text),
        proptest::collection::vec(any::<u8>(), 1..8).prop_map(|data| Fragment::Image {
            data,
            mime_type: "image/png".into(),
        }),
        ("[a-z]{1,6}", "[a-z ]{0,12}").prop_map(|(name, text)| Fragment::ExtractedDoc {
            filename: format!("{name}.txt"),
            text,
        }),
    ]
}

fn content() -> impl Strategy<Value = MessageContent> {
    prop_oneof![
        "[a-z ]{0,16}".prop_map(MessageContent::Text),
        proptest::collection::vec(fragment(), 0..4).prop_map(MessageContent::Fragments),
    ]
}

fn message() -> impl Strategy<Value = Message> {
    (
        prop_oneof![Just(Role::User), Just(Role::Assistant), Just(Role::System)],
        content(),
    )
        .prop_map(|(role, content)| Message { role, content })
}

fn prompt_occurrences(messages: &[gemchat_core::ProviderMessage]) -> usize {
    messages
        .iter()
        .flat_map(|m| &m.parts)
        .filter(|p| p.text() == Some(PROMPT))
        .count()
}

proptest! {
    #[test]
    fn prompt_appears_once_as_first_fragment(history in proptest::collection::vec(message(), 0..12)) {
        let out = to_provider_messages(&history, Some(PROMPT));
        if out.is_empty() {
            prop_assert!(history.iter().all(|m| m.role == Role::System));
        } else {
            prop_assert_eq!(prompt_occurrences(&out), 1);
            prop_assert_eq!(out[0].parts[0].text(), Some(PROMPT));
        }
    }

    #[test]
    fn inline_request_always_carries_prompt_once(
        history in proptest::collection::vec(message(), 0..12),
        input in content(),
    ) {
        let request = HistoryReshaper::new(SystemPromptMode::Inline)
            .build_request(&history, &input, Some(PROMPT));
        prop_assert_eq!(prompt_occurrences(&request.messages), 1);
        prop_assert_eq!(request.messages[0].parts[0].text(), Some(PROMPT));
    }

    #[test]
    fn role_mapping_is_idempotent(history in proptest::collection::vec(message(), 0..12)) {
        let once = to_provider_messages(&history, None);
        let twice = to_provider_messages(&to_display_messages(&once), None);
        prop_assert_eq!(&once, &twice);

        let expected: Vec<Role> = history
            .iter()
            .map(|m| m.role)
            .filter(|r| *r != Role::System)
            .collect();
        let restored: Vec<Role> = to_display_messages(&once).iter().map(|m| m.role).collect();
        prop_assert_eq!(expected, restored);
    }

    #[test]
    fn message_count_excludes_only_system(history in proptest::collection::vec(message(), 0..12)) {
        let out = to_provider_messages(&history, Some(PROMPT));
        let non_system = history.iter().filter(|m| m.role != Role::System).count();
        prop_assert_eq!(out.len(), non_system);
    }
}
