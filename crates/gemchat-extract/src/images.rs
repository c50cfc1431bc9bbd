// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image attachments are validated by decoding, then forwarded as-is.

use gemchat_core::{ChatError, Extractor, Fragment};
use image::ImageFormat;

const SUPPORTED: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

pub struct ImageExtractor;

impl Extractor for ImageExtractor {
    fn accepts(&self, mime_type: &str) -> bool {
        ImageFormat::from_mime_type(mime_type).is_some_and(|f| SUPPORTED.contains(&f))
    }

    fn extract(&self, filename: &str, data: &[u8]) -> Result<Fragment, ChatError> {
        let fail = |message: String| ChatError::Extraction {
            filename: filename.to_string(),
            message,
        };
        let format = image::guess_format(data).map_err(|e| fail(e.to_string()))?;
        if !SUPPORTED.contains(&format) {
            return Err(fail(format!("unsupported image format {format:?}")));
        }
        let decoded =
            image::load_from_memory_with_format(data, format).map_err(|e| fail(e.to_string()))?;
        tracing::debug!(
            filename,
            width = decoded.width(),
            height = decoded.height(),
            "image attachment decoded"
        );
        Ok(Fragment::Image {
            data: data.to_vec(),
            mime_type: format.to_mime_type().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(2, 2, Rgb([255, 0, 0]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn accepts_common_image_types() {
        assert!(ImageExtractor.accepts("image/png"));
        assert!(ImageExtractor.accepts("image/jpeg"));
        assert!(!ImageExtractor.accepts("image/tiff"));
        assert!(!ImageExtractor.accepts("application/pdf"));
    }

    #[test]
    fn valid_png_is_kept_verbatim() {
        let png = tiny_png();
        let fragment = ImageExtractor.extract("dot.png", &png).unwrap();
        assert_eq!(
            fragment,
            Fragment::Image {
                data: png,
                mime_type: "image/png".into()
            }
        );
    }

    #[test]
    fn truncated_png_fails() {
        let mut png = tiny_png();
        png.truncate(20);
        let err = ImageExtractor.extract("broken.png", &png).unwrap_err();
        assert!(matches!(err, ChatError::Extraction { ref filename, .. } if filename == "broken.png"));
    }
}
