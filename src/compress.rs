//! Compression boundary for project archives
//!
//! Archives are compressed JSON text. The exporter and importer only see the
//! [`Compressor`] trait; [`BrotliCompressor`] is the implementation the CLI
//! uses and [`Uncompressed`] passes text through untouched.

use std::io::Cursor;
use thiserror::Error;

/// Default brotli quality (0-11)
pub const DEFAULT_QUALITY: u32 = 9;

/// Default brotli window size (log2)
pub const DEFAULT_LG_WINDOW_SIZE: u32 = 22;

/// Error type for the compression boundary
#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("compression failed: {0}")]
    Compress(#[source] std::io::Error),
    #[error("decompression failed: {0}")]
    Decompress(#[source] std::io::Error),
    #[error("decompressed archive is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Turns archive text into bytes and back.
///
/// A returned error is the rejected operation; implementations must not
/// panic on malformed input.
pub trait Compressor {
    fn compress(&self, text: &str) -> Result<Vec<u8>, CompressionError>;
    fn decompress(&self, bytes: &[u8]) -> Result<String, CompressionError>;
}

/// Brotli compression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrotliCompressor {
    pub quality: u32,
    pub lg_window_size: u32,
}

impl Default for BrotliCompressor {
    fn default() -> Self {
        Self { quality: DEFAULT_QUALITY, lg_window_size: DEFAULT_LG_WINDOW_SIZE }
    }
}

impl BrotliCompressor {
    pub fn with_quality(quality: u32) -> Self {
        Self { quality: quality.min(11), ..Default::default() }
    }
}

impl Compressor for BrotliCompressor {
    fn compress(&self, text: &str) -> Result<Vec<u8>, CompressionError> {
        let mut compressed = Vec::new();
        brotli::BrotliCompress(
            &mut Cursor::new(text.as_bytes()),
            &mut compressed,
            &brotli::enc::BrotliEncoderParams {
                quality: self.quality.min(11) as i32,
                lgwin: self.lg_window_size.clamp(10, 24) as i32,
                ..Default::default()
            },
        )
        .map_err(CompressionError::Compress)?;
        Ok(compressed)
    }

    fn decompress(&self, bytes: &[u8]) -> Result<String, CompressionError> {
        let mut decompressed = Vec::new();
        brotli::BrotliDecompress(&mut Cursor::new(bytes), &mut decompressed)
            .map_err(CompressionError::Decompress)?;
        Ok(String::from_utf8(decompressed)?)
    }
}

/// Stores archive text as plain UTF-8
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Uncompressed;

impl Compressor for Uncompressed {
    fn compress(&self, text: &str) -> Result<Vec<u8>, CompressionError> {
        Ok(text.as_bytes().to_vec())
    }

    fn decompress(&self, bytes: &[u8]) -> Result<String, CompressionError> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brotli_roundtrip() {
        let text = r#"{"meta":{"name":"pack"},"source":"{}"}"#.repeat(20);
        let compressor = BrotliCompressor::default();
        let bytes = compressor.compress(&text).unwrap();
        assert!(bytes.len() < text.len());
        assert_eq!(compressor.decompress(&bytes).unwrap(), text);
    }

    #[test]
    fn test_brotli_rejects_truncated_stream() {
        let compressor = BrotliCompressor::default();
        let text: String = (0..2000).map(|i| char::from(b'a' + (i * 7 % 26) as u8)).collect();
        let bytes = compressor.compress(&text).unwrap();
        assert!(compressor.decompress(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(BrotliCompressor::with_quality(40).quality, 11);
        let bytes = BrotliCompressor { quality: 99, lg_window_size: 99 }.compress("abc").unwrap();
        assert_eq!(BrotliCompressor::default().decompress(&bytes).unwrap(), "abc");
    }

    #[test]
    fn test_uncompressed() {
        assert_eq!(Uncompressed.compress("héllo").unwrap(), "héllo".as_bytes());
        assert!(matches!(Uncompressed.decompress(&[0xc3]), Err(CompressionError::Utf8(_))));
    }
}
