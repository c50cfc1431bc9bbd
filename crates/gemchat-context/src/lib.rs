// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History reshaping for gemchat.
//!
//! Turns the display-side message list (user/assistant/system roles) into
//! the provider's user/model message list and decides where the system
//! prompt travels.

pub mod reshape;
pub mod reshaper;

pub use reshape::{
    extract_display_text, greeting_messages, to_display_messages, to_provider_messages,
};
pub use reshaper::{HistoryReshaper, ReshapedRequest};
