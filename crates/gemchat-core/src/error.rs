// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for gemchat.

use thiserror::Error;

/// The primary error type used across all gemchat adapter traits and core operations.
///
/// Each variant maps to one recovery policy:
/// - [`ChatError::Config`] halts the current session with a visible message.
/// - [`ChatError::Storage`] is logged and the operation degrades (empty history, skipped persist).
/// - [`ChatError::Provider`] and [`ChatError::Timeout`] are shown inline and the turn is dropped.
/// - [`ChatError::Extraction`] is replaced by a placeholder fragment for that one file.
///
/// Nothing in the workspace retries automatically on any of them.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Configuration errors (missing entry parameter, invalid TOML, bad username).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, write, read, rename).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LLM provider errors (transport failure, API error body, malformed stream).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Attachment parsing failed for a single file.
    #[error("could not read {filename}: {message}")]
    Extraction { filename: String, message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Wraps any error as a storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ChatError::Storage { source: err.into() }
    }

    /// Returns true for errors that must stop the session instead of degrading.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ChatError::Config(_))
    }
}
