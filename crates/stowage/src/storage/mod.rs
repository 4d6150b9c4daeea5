//! The uniform object-storage capability trait and its backends.
//!
//! Every backend implements [`ObjectStore`]; the facade holds them as
//! `Arc<dyn ObjectStore>`. The compression protocol and the string-typed
//! Get variants are default methods, so each backend only supplies the raw
//! byte-level operations.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::compress::{compress_snappy, decompress_tagged, COMPRESSOR_META_KEY, SNAPPY};
use crate::error::{Result, StowageError};
use crate::options::{CopyOptions, GetOptions, PutOptions, SignOptions};

mod local;
mod oss;
mod s3;

pub use local::LocalStore;
pub use oss::OssStore;
pub use s3::S3Store;

/// Readable stream of object content, owned by the caller.
pub type ByteReader = Box<dyn AsyncRead + Send + Unpin>;

/// In-memory reader over a byte buffer.
#[must_use]
pub fn bytes_reader(data: Bytes) -> ByteReader {
    Box::new(std::io::Cursor::new(data))
}

pub(crate) const PUT_RETRY_ATTEMPTS: usize = 3;
pub(crate) const PUT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Run a Put attempt up to [`PUT_RETRY_ATTEMPTS`] times with a fixed delay.
///
/// Each attempt re-sends the full payload from offset zero; only the Put
/// path uses this.
pub(crate) async fn retry_put<F, Fut>(mut attempt: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut last_err = StowageError::Transport("put failed".to_string());
    for n in 1..=PUT_RETRY_ATTEMPTS {
        match attempt().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::warn!(attempt = n, error = %e, "put attempt failed");
                last_err = e;
                if n < PUT_RETRY_ATTEMPTS {
                    tokio::time::sleep(PUT_RETRY_DELAY).await;
                }
            }
        }
    }
    Err(last_err)
}

/// Split a raw `/bucket/key` copy source into its parts.
pub(crate) fn parse_raw_source(src: &str) -> Result<(String, String)> {
    src.strip_prefix('/')
        .and_then(|rest| rest.split_once('/'))
        .filter(|(bucket, key)| !bucket.is_empty() && !key.is_empty())
        .map(|(bucket, key)| (bucket.to_string(), key.to_string()))
        .ok_or_else(|| {
            StowageError::InvalidArgument(format!("raw copy source must be /bucket/key, got {src:?}"))
        })
}

fn into_utf8(data: Bytes) -> Result<String> {
    String::from_utf8(data.to_vec())
        .map_err(|e| StowageError::InvalidArgument(format!("object content is not UTF-8: {e}")))
}

/// Uniform capability interface over object-storage backends.
///
/// A missing object is never an error: read operations return `Ok(None)`
/// and `exists` returns `Ok(false)`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Physical bucket the key routes to. Pure computation, no network.
    fn bucket_name(&self, key: &str) -> Result<String>;

    /// Fetch object content as raw bytes.
    async fn get_bytes(&self, key: &str, opts: GetOptions) -> Result<Option<Bytes>>;

    /// Fetch object content plus the requested metadata attributes.
    async fn get_with_meta(
        &self,
        key: &str,
        attrs: &[String],
        opts: GetOptions,
    ) -> Result<Option<(ByteReader, HashMap<String, String>)>>;

    /// Store an object. Retried up to 3 times with a fixed 1s delay; the
    /// full payload is re-sent on every attempt.
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        meta: &HashMap<String, String>,
        opts: PutOptions,
    ) -> Result<()>;

    /// Delete one object.
    async fn del(&self, key: &str) -> Result<()>;

    /// Delete many objects, grouped into per-bucket batches. Partial
    /// failure surfaces as [`StowageError::MultiDelete`] listing every
    /// failed key.
    async fn del_multi(&self, keys: &[String]) -> Result<()>;

    /// Fetch the requested metadata attributes without the body.
    async fn head(&self, key: &str, attrs: &[String]) -> Result<Option<HashMap<String, String>>>;

    /// List one page of keys. `key` is used for bucket resolution only.
    async fn list_object(
        &self,
        key: &str,
        prefix: &str,
        marker: &str,
        max_keys: i64,
        delimiter: &str,
    ) -> Result<Vec<String>>;

    /// Produce a time-limited pre-signed retrieval URL. Computed locally.
    async fn sign_url(&self, key: &str, expires_secs: i64, opts: SignOptions) -> Result<String>;

    /// Read the half-open byte range `[offset, offset + length)`.
    async fn range(&self, key: &str, offset: u64, length: u64) -> Result<ByteReader>;

    /// Whether the key exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Copy an object. With `copy_meta`, the source is first headed and the
    /// selected attributes (plus its `Content-Encoding`) replace the
    /// destination metadata.
    async fn copy(&self, src_key: &str, dst_key: &str, opts: CopyOptions) -> Result<()>;

    /// Fetch object content as a UTF-8 string.
    async fn get(&self, key: &str, opts: GetOptions) -> Result<Option<String>> {
        match self.get_bytes(key, opts).await? {
            Some(data) => Ok(Some(into_utf8(data)?)),
            None => Ok(None),
        }
    }

    /// Fetch object content as a readable stream.
    async fn get_as_reader(&self, key: &str, opts: GetOptions) -> Result<Option<ByteReader>> {
        Ok(self.get_bytes(key, opts).await?.map(bytes_reader))
    }

    /// Fetch an object and transparently decompress it according to its
    /// stored `Compressor` tag.
    async fn get_and_decompress(&self, key: &str) -> Result<Option<String>> {
        match self.fetch_decompressed(key).await? {
            Some(data) => Ok(Some(into_utf8(data)?)),
            None => Ok(None),
        }
    }

    /// Stream variant of [`get_and_decompress`]; the returned reader is an
    /// independent in-memory stream over the decompressed content.
    ///
    /// [`get_and_decompress`]: ObjectStore::get_and_decompress
    async fn get_and_decompress_as_reader(&self, key: &str) -> Result<Option<ByteReader>> {
        Ok(self.fetch_decompressed(key).await?.map(bytes_reader))
    }

    /// Compress the payload, tag it with `Compressor: snappy`, and Put it.
    async fn put_and_compress(
        &self,
        key: &str,
        data: Bytes,
        meta: &HashMap<String, String>,
        opts: PutOptions,
    ) -> Result<()> {
        let compressed = compress_snappy(&data)?;
        let mut meta = meta.clone();
        meta.insert(COMPRESSOR_META_KEY.to_string(), SNAPPY.to_string());
        self.put(key, Bytes::from(compressed), &meta, opts).await
    }

    #[doc(hidden)]
    async fn fetch_decompressed(&self, key: &str) -> Result<Option<Bytes>> {
        let attrs = [COMPRESSOR_META_KEY.to_string()];
        match self
            .get_with_meta(key, &attrs, GetOptions::default())
            .await?
        {
            None => Ok(None),
            Some((mut reader, meta)) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await?;
                let tag = meta.get(COMPRESSOR_META_KEY).map(String::as_str);
                Ok(Some(decompress_tagged(tag, Bytes::from(buf))?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_retry_put_eventual_success() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();

        retry_put(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(StowageError::Transport("flaky".to_string()))
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_put_exhaustion() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();

        let result = retry_put(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(StowageError::Transport("down".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(StowageError::Transport(msg)) if msg == "down"));
        assert_eq!(attempts.load(Ordering::SeqCst), PUT_RETRY_ATTEMPTS);
    }

    #[test]
    fn test_parse_raw_source() {
        let (bucket, key) = parse_raw_source("/media/a/b.txt").unwrap();
        assert_eq!(bucket, "media");
        assert_eq!(key, "a/b.txt");

        assert!(parse_raw_source("media/a").is_err());
        assert!(parse_raw_source("/media").is_err());
        assert!(parse_raw_source("//key").is_err());
    }

    #[tokio::test]
    async fn test_bytes_reader() {
        let mut reader = bytes_reader(Bytes::from_static(b"abc"));
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"abc");
    }
}
