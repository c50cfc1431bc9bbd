// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain text-like attachments.

use gemchat_core::{ChatError, Extractor, Fragment};

pub struct TextExtractor;

impl Extractor for TextExtractor {
    fn accepts(&self, mime_type: &str) -> bool {
        mime_type.starts_with("text/") || matches!(mime_type, "application/json" | "application/xml")
    }

    fn extract(&self, filename: &str, data: &[u8]) -> Result<Fragment, ChatError> {
        let text = String::from_utf8_lossy(data).into_owned();
        Ok(Fragment::ExtractedDoc {
            filename: filename.to_string(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_utf8_is_replaced() {
        let fragment = TextExtractor.extract("notes.txt", b"caf\xE9").unwrap();
        assert_eq!(fragment.text(), Some("caf\u{FFFD}"));
    }

    #[test]
    fn accepts_text_family() {
        assert!(TextExtractor.accepts("text/markdown"));
        assert!(TextExtractor.accepts("application/json"));
        assert!(!TextExtractor.accepts("application/pdf"));
    }
}
