// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MIME type detection for uploaded files.
//!
//! Order: the declared type, then the file extension, then magic bytes.

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Best-effort MIME type for an attachment.
pub fn detect_mime(filename: &str, declared: Option<&str>, data: &[u8]) -> String {
    if let Some(declared) = declared.map(str::trim).filter(|m| is_informative(m)) {
        return declared.to_ascii_lowercase();
    }
    if let Some(mime) = mime_from_extension(filename) {
        return mime.to_string();
    }
    mime_from_magic(data).to_string()
}

fn is_informative(mime: &str) -> bool {
    !mime.is_empty() && !mime.eq_ignore_ascii_case(OCTET_STREAM)
}

/// MIME type registered for the file's extension, if any.
pub fn mime_from_extension(filename: &str) -> Option<&'static str> {
    mime_guess::from_path(filename).first_raw()
}

/// Sniffs the MIME type from leading bytes.
pub fn mime_from_magic(data: &[u8]) -> &'static str {
    if data.starts_with(b"%PDF-") {
        return PDF_MIME;
    }
    if data.starts_with(b"PK\x03\x04") {
        return DOCX_MIME;
    }
    if let Ok(format) = image::guess_format(data) {
        return format.to_mime_type();
    }
    if std::str::from_utf8(data).is_ok() {
        return "text/plain";
    }
    OCTET_STREAM
}
