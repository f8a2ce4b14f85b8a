//! Photo payload handling.
//!
//! Requests carry photos as base64, bare or wrapped in a data URL. The bytes
//! are decoded, the format sniffed from magic bytes, and the file written
//! under the photo directory; the care log stores only the relative path.
//! A canonical data URL is rebuilt for the vision call so the raw bytes never
//! have to be re-read on the background path.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use uuid::Uuid;

use crate::error::SprigError;

const MAX_PHOTO_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug)]
pub struct StoredPhoto {
    /// File name under the photo directory, stored on the care log.
    pub path: String,
    /// data:<mime>;base64,<payload> — handed to the vision capability.
    pub data_url: String,
    pub mime: &'static str,
}

fn photo_err(msg: impl Into<String>) -> SprigError {
    SprigError::PhotoProcessing(msg.into())
}

fn sniff(bytes: &[u8]) -> Option<(&'static str, &'static str)> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some(("image/png", "png"))
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(("image/jpeg", "jpg"))
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(("image/webp", "webp"))
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some(("image/gif", "gif"))
    } else {
        None
    }
}

/// Strip a `data:...;base64,` header if present, returning the raw base64.
fn strip_data_url(payload: &str) -> Result<&str, SprigError> {
    let payload = payload.trim();
    if let Some(rest) = payload.strip_prefix("data:") {
        let (header, body) = rest
            .split_once(',')
            .ok_or_else(|| photo_err("malformed data URL"))?;
        if !header.ends_with(";base64") {
            return Err(photo_err("data URL is not base64-encoded"));
        }
        Ok(body)
    } else {
        Ok(payload)
    }
}

/// Decode, sniff, and persist a photo payload.
pub fn store_photo(payload: &str, photo_dir: &Path) -> Result<StoredPhoto, SprigError> {
    let b64 = strip_data_url(payload)?;
    if b64.is_empty() {
        return Err(photo_err("empty photo payload"));
    }

    let bytes = STANDARD
        .decode(b64.as_bytes())
        .map_err(|e| photo_err(format!("base64 decode failed: {e}")))?;
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(photo_err("photo exceeds maximum size"));
    }

    let (mime, ext) = sniff(&bytes).ok_or_else(|| photo_err("unrecognized image format"))?;

    std::fs::create_dir_all(photo_dir)
        .map_err(|e| photo_err(format!("photo dir: {e}")))?;
    let name = format!("{}.{ext}", Uuid::new_v4());
    std::fs::write(photo_dir.join(&name), &bytes)
        .map_err(|e| photo_err(format!("photo write failed: {e}")))?;

    let data_url = format!("data:{mime};base64,{}", STANDARD.encode(&bytes));
    Ok(StoredPhoto { path: name, data_url, mime })
}
