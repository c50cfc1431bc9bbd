// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for gemchat conversation logs.
//!
//! One store file per user, one append-only `chat_log` table per store,
//! and a fresh `tokio-rusqlite` connection for every operation.

pub mod adapter;
pub mod database;
pub mod queries;

pub use adapter::SqliteConversationStore;
pub use database::{ConnectOptions, Database, with_database};
