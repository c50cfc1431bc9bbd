// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for gemchat.
//!
//! This crate provides the conversation types (turns, messages, fragments),
//! the error taxonomy, the pure turn-to-message mapping, and the adapter
//! traits implemented by the storage, provider and extraction crates.

pub mod error;
pub mod history;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ChatError;
pub use types::{
    AdapterType, Fragment, HealthStatus, Message, MessageContent, ProviderMessage, ProviderRole,
    Role, SessionContext, StoreId, Turn,
};

pub use traits::{
    ConversationStore, Extractor, PluginAdapter, ProviderAdapter, ProviderSession, TextStream,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_error_has_all_variants() {
        let _config = ChatError::Config("test".into());
        let _storage = ChatError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = ChatError::Provider {
            message: "test".into(),
            source: None,
        };
        let _extraction = ChatError::Extraction {
            filename: "a.pdf".into(),
            message: "broken xref".into(),
        };
        let _timeout = ChatError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = ChatError::Internal("test".into());
    }

    #[test]
    fn only_config_errors_are_fatal() {
        assert!(ChatError::Config("no username".into()).is_fatal());
        assert!(!ChatError::storage(std::io::Error::other("disk full")).is_fatal());
        assert!(!ChatError::Provider {
            message: "503".into(),
            source: None
        }
        .is_fatal());
    }

    #[test]
    fn extraction_error_names_the_file() {
        let err = ChatError::Extraction {
            filename: "report.docx".into(),
            message: "missing word/document.xml".into(),
        };
        assert_eq!(
            err.to_string(),
            "could not read report.docx: missing word/document.xml"
        );
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_provider_session<T: ProviderSession>() {}
        fn _assert_conversation_store<T: ConversationStore>() {}
        fn _assert_extractor<T: Extractor>() {}
    }
}
