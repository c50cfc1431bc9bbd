// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PDF text layer extraction.

use std::panic::{AssertUnwindSafe, catch_unwind};

use gemchat_core::{ChatError, Extractor, Fragment};

use crate::kind::PDF_MIME;

pub struct PdfExtractor;

impl Extractor for PdfExtractor {
    fn accepts(&self, mime_type: &str) -> bool {
        mime_type == PDF_MIME
    }

    fn extract(&self, filename: &str, data: &[u8]) -> Result<Fragment, ChatError> {
        let fail = |message: String| ChatError::Extraction {
            filename: filename.to_string(),
            message,
        };
        // pdf-extract panics on some malformed inputs.
        let text = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(data)))
            .map_err(|_| fail("malformed PDF".into()))?
            .map_err(|e| fail(e.to_string()))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(fail("no text layer found".into()));
        }
        Ok(Fragment::ExtractedDoc {
            filename: filename.to_string(),
            text: text.to_string(),
        })
    }
}
