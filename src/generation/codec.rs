use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use std::io::Cursor;

use crate::{
    error::{NanoError, Result},
    models::InlineImage,
};

pub const TRANSPORT_MIME: &str = "image/jpeg";

/// Clamp an arbitrary integer into a valid JPEG quality factor.
pub fn clamp_quality(quality: i64) -> u8 {
    quality.clamp(1, 100) as u8
}

/// Re-encode any decodable image as JPEG and wrap it for inline transport.
pub fn encode(raw: &[u8], quality: u8) -> Result<InlineImage> {
    let decoded = image::load_from_memory(raw)
        .map_err(|e| NanoError::EncodingError(format!("not a decodable image: {}", e)))?;

    let rgb = decoded.to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, clamp_quality(quality as i64));
    encoder
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| NanoError::EncodingError(format!("JPEG encode failed: {}", e)))?;

    Ok(InlineImage::new(TRANSPORT_MIME, STANDARD.encode(buf.into_inner())))
}

/// Encode every upload once; the set is shared by all units of the batch.
pub fn encode_all(uploads: &[(String, Vec<u8>)], quality: u8) -> Result<Vec<InlineImage>> {
    uploads
        .iter()
        .map(|(name, raw)| {
            encode(raw, quality).map_err(|e| match e {
                NanoError::EncodingError(msg) => {
                    NanoError::EncodingError(format!("{}: {}", name, msg))
                }
                other => other,
            })
        })
        .collect()
}
