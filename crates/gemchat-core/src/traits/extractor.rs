// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extractor trait for turning uploaded file bytes into message fragments.

use crate::error::ChatError;
use crate::types::Fragment;

/// Converts one attachment into a fragment.
///
/// Implementations are synchronous; callers run them on a blocking thread
/// when the input may be large.
pub trait Extractor: Send + Sync {
    /// Returns true if this extractor handles the given MIME type.
    fn accepts(&self, mime_type: &str) -> bool;

    /// Extracts a fragment from the raw bytes.
    fn extract(&self, filename: &str, data: &[u8]) -> Result<Fragment, ChatError>;
}
