//! Request payload decoding

use super::error::{AppError, AppResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const DATA_URL_MARKER: &str = "base64,";

/// Decode plain base64 or a `data:...;base64,` URL into image bytes
pub fn decode_image_base64(input: &str) -> AppResult<Vec<u8>> {
    let cleaned: String = strip_data_url(input)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|_| AppError::validation("invalid base64"))?;

    if bytes.is_empty() {
        return Err(AppError::validation(
            "imageBase64 decoded to empty buffer",
        ));
    }
    Ok(bytes)
}

/// Everything after the first `base64,` (case-insensitive), or the input itself
fn strip_data_url(input: &str) -> &str {
    match input.to_ascii_lowercase().find(DATA_URL_MARKER) {
        Some(idx) => &input[idx + DATA_URL_MARKER.len()..],
        None => input,
    }
}

/// Encode a finished payload for simulate responses
pub fn encode_payload(payload: &[u8]) -> String {
    STANDARD.encode(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_base64() {
        assert_eq!(decode_image_base64("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_data_url() {
        assert_eq!(
            decode_image_base64("data:image/png;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
        assert_eq!(
            decode_image_base64("data:image/png;BASE64,aGVsbG8=").unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_whitespace_ignored() {
        assert_eq!(decode_image_base64("  aGVs\nbG8=\r\n").unwrap(), b"hello");
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            decode_image_base64("not base64!!"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_after_decode() {
        assert!(matches!(
            decode_image_base64("data:image/png;base64,"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_round_trip_payload() {
        let payload = [0x1B, 0x40, 0x1D, 0x56, 0x00];
        assert_eq!(
            decode_image_base64(&encode_payload(&payload)).unwrap(),
            payload
        );
    }
}
