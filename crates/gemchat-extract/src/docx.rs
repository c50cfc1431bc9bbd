// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DOCX paragraph text from `word/document.xml`.

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use gemchat_core::{ChatError, Extractor, Fragment};
use regex::{Captures, Regex};

use crate::kind::DOCX_MIME;

const DOCUMENT_PART: &str = "word/document.xml";

static PARAGRAPH_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</w:p>|<w:br\s*/>|<w:cr\s*/>").expect("static regex"));
static TAB: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<w:tab\s*/>").expect("static regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|lt|gt|quot|apos|amp);").expect("static regex")
});

pub struct DocxExtractor;

impl Extractor for DocxExtractor {
    fn accepts(&self, mime_type: &str) -> bool {
        mime_type == DOCX_MIME
    }

    fn extract(&self, filename: &str, data: &[u8]) -> Result<Fragment, ChatError> {
        let fail = |message: String| ChatError::Extraction {
            filename: filename.to_string(),
            message,
        };
        let mut archive =
            zip::ZipArchive::new(Cursor::new(data)).map_err(|e| fail(e.to_string()))?;
        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| fail(format!("{DOCUMENT_PART}: {e}")))?
            .read_to_string(&mut xml)
            .map_err(|e| fail(e.to_string()))?;

        let text = document_text(&xml);
        if text.is_empty() {
            return Err(fail("document contains no text".into()));
        }
        Ok(Fragment::ExtractedDoc {
            filename: filename.to_string(),
            text,
        })
    }
}

/// Reduces WordprocessingML to plain text, one line per paragraph.
pub fn document_text(xml: &str) -> String {
    let with_breaks = PARAGRAPH_END.replace_all(xml, "\n");
    let with_tabs = TAB.replace_all(&with_breaks, "\t");
    let stripped = TAG.replace_all(&with_tabs, "");
    unescape_xml(&stripped)
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Decodes the predefined entities and numeric character references in one
/// pass. Invalid code points are left as written.
fn unescape_xml(s: &str) -> String {
    ENTITY
        .replace_all(s, |caps: &Captures| {
            let decoded = match &caps[1] {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                reference => char_reference(reference),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn char_reference(reference: &str) -> Option<char> {
    let code = match reference.strip_prefix("#x") {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => reference.strip_prefix('#')?.parse().ok()?,
    };
    char::from_u32(code)
}
