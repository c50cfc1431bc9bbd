// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment extraction for gemchat.
//!
//! Uploaded bytes become a [`Fragment`]: images stay binary, documents become
//! extracted text. A file that cannot be read never fails the turn; it is
//! replaced by a placeholder text fragment naming the file and the reason.

pub mod docx;
pub mod images;
pub mod kind;
pub mod pdf;
pub mod text;

use gemchat_config::model::ExtractConfig;
use gemchat_core::{ChatError, Extractor, Fragment};
use tracing::{debug, warn};

pub use kind::detect_mime;

/// Dispatches uploads to the first extractor accepting their MIME type.
pub struct AttachmentExtractor {
    extractors: Vec<Box<dyn Extractor>>,
    max_bytes: usize,
}

impl AttachmentExtractor {
    /// Builds the default extractor chain: image, PDF, DOCX, text.
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            extractors: vec![
                Box::new(images::ImageExtractor),
                Box::new(pdf::PdfExtractor),
                Box::new(docx::DocxExtractor),
                Box::new(text::TextExtractor),
            ],
            max_bytes: config.max_attachment_bytes,
        }
    }

    /// Extracts one file, substituting a placeholder on failure.
    pub fn extract(&self, filename: &str, declared_mime: Option<&str>, data: &[u8]) -> Fragment {
        match self.try_extract(filename, declared_mime, data) {
            Ok(fragment) => fragment,
            Err(e) => {
                warn!(filename, error = %e, "attachment replaced by placeholder");
                placeholder(&e)
            }
        }
    }

    /// Extracts one file, returning the error instead of a placeholder.
    pub fn try_extract(
        &self,
        filename: &str,
        declared_mime: Option<&str>,
        data: &[u8],
    ) -> Result<Fragment, ChatError> {
        if data.len() > self.max_bytes {
            return Err(ChatError::Extraction {
                filename: filename.to_string(),
                message: format!("file is {} bytes, limit is {}", data.len(), self.max_bytes),
            });
        }
        let mime = detect_mime(filename, declared_mime, data);
        let extractor = self
            .extractors
            .iter()
            .find(|e| e.accepts(&mime))
            .ok_or_else(|| ChatError::Extraction {
                filename: filename.to_string(),
                message: format!("unsupported file type {mime}"),
            })?;
        debug!(filename, mime = %mime, bytes = data.len(), "extracting attachment");
        extractor.extract(filename, data)
    }
}

/// The text fragment shown in place of an unreadable file.
pub fn placeholder(error: &ChatError) -> Fragment {
    let reason = match error {
        ChatError::Extraction { filename, message } => format!("Could not read {filename}: {message}"),
        other => other.to_string(),
    };
    Fragment::Text(format!("[{reason}]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> AttachmentExtractor {
        AttachmentExtractor::new(&ExtractConfig::default())
    }

    #[test]
    fn text_file_becomes_document() {
        let fragment = extractor().extract("notes.md", None, b"# Title\nbody");
        assert_eq!(
            fragment,
            Fragment::ExtractedDoc {
                filename: "notes.md".into(),
                text: "# Title\nbody".into()
            }
        );
    }

    #[test]
    fn unsupported_type_yields_placeholder() {
        let fragment = extractor().extract("tool.exe", None, &[0x4D, 0x5A, 0x90, 0x00, 0xFF]);
        let Fragment::Text(text) = fragment else {
            panic!("expected placeholder text");
        };
        assert!(text.starts_with("[Could not read tool.exe:"), "got: {text}");
        assert!(text.ends_with(']'));
    }

    #[test]
    fn broken_image_yields_placeholder() {
        let fragment = extractor().extract("cat.png", None, b"\x89PNG\r\n\x1a\ntruncated");
        assert!(matches!(fragment, Fragment::Text(ref t) if t.contains("cat.png")));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let small = AttachmentExtractor::new(&ExtractConfig {
            max_attachment_bytes: 4,
        });
        let err = small.try_extract("big.txt", None, b"12345").unwrap_err();
        assert!(err.to_string().contains("limit is 4"), "got: {err}");
    }

    #[test]
    fn declared_mime_routes_extensionless_upload() {
        let fragment = extractor()
            .try_extract("blob", Some("text/csv"), b"a,b\n1,2")
            .unwrap();
        assert_eq!(fragment.text(), Some("a,b\n1,2"));
    }
}
