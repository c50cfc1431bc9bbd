// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Async adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod extractor;
pub mod provider;
pub mod storage;

pub use adapter::PluginAdapter;
pub use extractor::Extractor;
pub use provider::{ProviderAdapter, ProviderSession, TextStream};
pub use storage::ConversationStore;
