//! Zstd adapter for the high-bit stream
//!
//! The packed high nibbles are highly repetitive (a scene rarely spans more
//! than a couple of quantization bands), so a fast general-purpose coder at
//! a low level captures nearly all of the win. Level 1 keeps the encode
//! well under the per-frame budget of a real-time stream.

use crate::error::{Error, Result};

/// Zstd compression level for the high stream
const ZSTD_LEVEL: i32 = 1;

/// Losslessly compress the high-nibble stream.
///
/// Returns an empty buffer on an internal coder failure; the session treats
/// that as a fatal encode error and emits a frame whose decode fails
/// cleanly.
pub fn compress(uncompressed: &[u8]) -> Vec<u8> {
    match zstd::bulk::compress(uncompressed, ZSTD_LEVEL) {
        Ok(compressed) => compressed,
        Err(e) => {
            tracing::warn!("zstd compression failed: {}", e);
            Vec::new()
        }
    }
}

/// Decompress a high-nibble payload, requiring the exact uncompressed size
/// declared in the frame header.
pub fn decompress(compressed: &[u8], uncompressed_bytes: usize) -> Result<Vec<u8>> {
    let uncompressed = zstd::bulk::decompress(compressed, uncompressed_bytes)
        .map_err(|e| Error::corrupted(format!("high stream decode failed: {}", e)))?;
    if uncompressed.len() != uncompressed_bytes {
        return Err(Error::corrupted(format!(
            "high stream decoded to {} bytes, expected {}",
            uncompressed.len(),
            uncompressed_bytes
        )));
    }
    Ok(uncompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 9) as u8).collect();
        let compressed = compress(&data);
        assert!(!compressed.is_empty());
        assert!(compressed.len() < data.len());

        let restored = decompress(&compressed, data.len()).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn test_wrong_expected_length_fails() {
        let data = vec![3u8; 128];
        let compressed = compress(&data);
        assert!(decompress(&compressed, 64).is_err());
    }

    #[test]
    fn test_garbage_fails() {
        let garbage = vec![0xAB; 64];
        assert!(matches!(
            decompress(&garbage, 128),
            Err(Error::Corrupted(_))
        ));
    }
}
