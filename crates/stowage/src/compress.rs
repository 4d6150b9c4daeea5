//! Transparent compression codecs.
//!
//! Compression is opt-in per object at write time. A compressed object
//! carries the reserved metadata attribute `Compressor` naming the codec;
//! decompression on the read path is driven entirely by that stored tag,
//! never by caller intent.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;

use bytes::Bytes;

use crate::config::BucketConfig;
use crate::error::{Result, StowageError};

/// Reserved metadata attribute marking an object as compressed.
pub const COMPRESSOR_META_KEY: &str = "Compressor";
/// Codec name recorded by `put_and_compress`.
pub const SNAPPY: &str = "snappy";
/// Codec name for the gzip codec.
pub const GZIP: &str = "gzip";

/// A block-compression codec.
pub trait Codec: Send + Sync {
    /// Codec name as stored in the `Compressor` metadata attribute.
    fn name(&self) -> &'static str;

    /// Token written into `Content-Encoding` on the automatic Put path.
    fn content_encoding(&self) -> &'static str;

    /// Compress data.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress data.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Snappy codec using the raw block format.
pub struct SnappyCodec;

impl Codec for SnappyCodec {
    fn name(&self) -> &'static str {
        SNAPPY
    }

    fn content_encoding(&self) -> &'static str {
        SNAPPY
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        snap::raw::Encoder::new()
            .compress_vec(data)
            .map_err(|e| StowageError::Compression(e.to_string()))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        decompress_snappy(data)
    }
}

/// Gzip codec with the default compression level.
pub struct GzipCodec;

impl Codec for GzipCodec {
    fn name(&self) -> &'static str {
        GZIP
    }

    fn content_encoding(&self) -> &'static str {
        GZIP
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .and_then(|()| encoder.finish())
            .map_err(|e| StowageError::Compression(e.to_string()))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        flate2::read::GzDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|e| StowageError::Decompression(e.to_string()))?;
        Ok(out)
    }
}

/// Snappy raw-block encode.
pub fn compress_snappy(data: &[u8]) -> Result<Vec<u8>> {
    SnappyCodec.compress(data)
}

/// Snappy decode with a framed-format fallback.
///
/// Some producers write the frame format under the same metadata tag. When
/// the raw-block decoder reports a corrupt stream, the same buffered bytes
/// get one attempt with the frame-tolerant reader before the error is
/// surfaced.
pub fn decompress_snappy(data: &[u8]) -> Result<Vec<u8>> {
    match snap::raw::Decoder::new().decompress_vec(data) {
        Ok(out) => Ok(out),
        Err(raw_err) => {
            let mut out = Vec::new();
            match snap::read::FrameDecoder::new(data).read_to_end(&mut out) {
                Ok(_) => Ok(out),
                Err(_) => Err(StowageError::Decompression(raw_err.to_string())),
            }
        }
    }
}

/// Decompress a payload according to its stored `Compressor` tag.
///
/// No tag means the object was stored uncompressed and the raw bytes pass
/// through unchanged. A tag naming an unknown codec is a hard failure; no
/// decompression is attempted.
pub fn decompress_tagged(tag: Option<&str>, raw: Bytes) -> Result<Bytes> {
    match tag {
        None => Ok(raw),
        Some(name) if name == SNAPPY => Ok(Bytes::from(decompress_snappy(&raw)?)),
        Some(other) => Err(StowageError::UnsupportedCodec(other.to_string())),
    }
}

/// Immutable table of named codecs, built once at client construction.
pub struct CodecRegistry {
    codecs: HashMap<&'static str, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// Registry holding the built-in codecs (gzip, snappy).
    #[must_use]
    pub fn builtin() -> Self {
        let mut codecs: HashMap<&'static str, Arc<dyn Codec>> = HashMap::new();
        codecs.insert(GZIP, Arc::new(GzipCodec));
        codecs.insert(SNAPPY, Arc::new(SnappyCodec));
        Self { codecs }
    }

    /// Look up a codec by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Codec>> {
        self.codecs.get(name).cloned()
    }
}

/// Resolve the configured Put-path codec for a bucket.
///
/// An unknown codec name is a deployment mistake but not fatal: the client
/// logs a warning and stores objects uncompressed.
pub(crate) fn resolve_codec(cfg: &BucketConfig, codecs: &CodecRegistry) -> Option<Arc<dyn Codec>> {
    if !cfg.enable_compressor {
        return None;
    }
    match codecs.get(&cfg.compress_type) {
        Some(codec) => Some(codec),
        None => {
            tracing::warn!(codec = %cfg.compress_type, "unknown compression codec, storing uncompressed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snappy_roundtrip() {
        let original = b"snappy-contentsnappy-contentsnappy-content".repeat(10);

        let compressed = compress_snappy(&original).unwrap();
        assert!(compressed.len() < original.len());

        let decompressed = decompress_snappy(&compressed).unwrap();
        assert_eq!(original.as_slice(), decompressed.as_slice());
    }

    #[test]
    fn test_snappy_frame_fallback() {
        // Frame-format data is not valid raw-block data; the fallback
        // decoder must still recover it.
        let original = b"framed payload framed payload framed payload";
        let mut framed = Vec::new();
        {
            let mut encoder = snap::write::FrameEncoder::new(&mut framed);
            encoder.write_all(original).unwrap();
        }

        let decompressed = decompress_snappy(&framed).unwrap();
        assert_eq!(original.as_slice(), decompressed.as_slice());
    }

    #[test]
    fn test_snappy_garbage_fails() {
        let result = decompress_snappy(b"\xff\xff\xff not snappy at all");
        assert!(matches!(result, Err(StowageError::Decompression(_))));
    }

    #[test]
    fn test_gzip_roundtrip() {
        let codec = GzipCodec;
        let original = b"hello world, this is a test of compression!".repeat(100);

        let compressed = codec.compress(&original).unwrap();
        let decompressed = codec.decompress(&compressed).unwrap();

        assert_eq!(original.as_slice(), decompressed.as_slice());
        assert!(compressed.len() < original.len());
    }

    #[test]
    fn test_tagged_passthrough() {
        let raw = Bytes::from_static(b"plain bytes");
        let out = decompress_tagged(None, raw.clone()).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn test_tagged_unknown_codec() {
        let result = decompress_tagged(Some("zstd"), Bytes::from_static(b"whatever"));
        assert!(matches!(result, Err(StowageError::UnsupportedCodec(name)) if name == "zstd"));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = CodecRegistry::builtin();
        assert!(registry.get("gzip").is_some());
        assert!(registry.get("snappy").is_some());
        assert!(registry.get("lz4").is_none());
    }

    #[test]
    fn test_resolve_codec_disabled() {
        let cfg = BucketConfig::default();
        assert!(resolve_codec(&cfg, &CodecRegistry::builtin()).is_none());
    }

    #[test]
    fn test_resolve_codec_unknown_name() {
        let cfg = BucketConfig {
            enable_compressor: true,
            compress_type: "brotli".to_string(),
            ..Default::default()
        };
        // Unknown codec downgrades to uncompressed storage.
        assert!(resolve_codec(&cfg, &CodecRegistry::builtin()).is_none());
    }
}
