// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation loop for gemchat.
//!
//! Resolves entry parameters into a session context, keeps one user's
//! display history in memory, and drives each turn: reshape, call the
//! provider, stream the reply, persist the turn.

pub mod params;
pub mod runtime;
pub mod session;

pub use params::EntryParams;
pub use runtime::{ChatRuntime, Upload};
pub use session::{Conversation, ConversationSettings, ConversationState, TurnOutcome};
