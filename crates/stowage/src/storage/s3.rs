//! S3-compatible storage backend.
//!
//! Works with AWS S3, MinIO, and other S3-compatible services. One
//! `Bucket` handle is built per physical bucket at construction, so shard
//! routing is a plain map lookup at request time.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use s3::creds::Credentials;
use s3::serde_types::HeadObjectResult;
use s3::{Bucket, Region};

use crate::compress::{resolve_codec, Codec, CodecRegistry};
use crate::config::BucketConfig;
use crate::error::{Result, StowageError};
use crate::meta::{select_attrs, CONTENT_ENCODING};
use crate::options::{CopyOptions, GetOptions, PutOptions, SignOptions};
use crate::router::KeyRouter;
use crate::storage::{bytes_reader, parse_raw_source, retry_put, ByteReader, ObjectStore};

const META_PREFIX: &str = "x-amz-meta-";

/// S3-compatible [`ObjectStore`].
pub struct S3Store {
    router: KeyRouter,
    buckets: HashMap<String, Box<Bucket>>,
    codec: Option<Arc<dyn Codec>>,
    compress_limit: usize,
}

impl S3Store {
    /// Build a store from a bucket configuration.
    pub fn new(cfg: &BucketConfig, codecs: &CodecRegistry) -> Result<Self> {
        let router = KeyRouter::new(&cfg.bucket, &cfg.prefix, &cfg.shards)?;

        let region = if cfg.endpoint.is_empty() {
            cfg.region
                .parse()
                .map_err(|e| StowageError::Config(format!("invalid region: {e}")))?
        } else {
            Region::Custom {
                region: cfg.region.clone(),
                endpoint: cfg.endpoint_url(),
            }
        };

        let credentials = Credentials::new(
            Some(&cfg.access_key_id),
            Some(&cfg.access_key_secret),
            None,
            None,
            None,
        )
        .map_err(|e| StowageError::Config(format!("invalid credentials: {e}")))?;

        let mut buckets = HashMap::new();
        for name in router.buckets() {
            let bucket = Bucket::new(&name, region.clone(), credentials.clone())
                .map_err(|e| StowageError::Config(format!("failed to create bucket: {e}")))?;
            let bucket = if cfg.force_path_style {
                bucket.with_path_style()
            } else {
                bucket
            };
            buckets.insert(name, bucket);
        }

        Ok(Self {
            router,
            buckets,
            codec: resolve_codec(cfg, codecs),
            compress_limit: cfg.compress_limit,
        })
    }

    fn bucket(&self, name: &str) -> Result<&Bucket> {
        self.buckets
            .get(name)
            .map(AsRef::as_ref)
            .ok_or_else(|| StowageError::Config(format!("no client for bucket {name:?}")))
    }

    fn is_not_found(err: &s3::error::S3Error) -> bool {
        let msg = err.to_string();
        msg.contains("404") || msg.contains("NoSuchKey")
    }

    fn transport(op: &str, err: s3::error::S3Error) -> StowageError {
        StowageError::Transport(format!("s3 {op} failed: {err}"))
    }

    async fn fetch(&self, key: &str, opts: &GetOptions) -> Result<Option<s3::request::ResponseData>> {
        let routed = self.router.route(key)?;
        let bucket = self.bucket(&routed.bucket)?;

        let mut query = HashMap::new();
        if let Some(v) = &opts.content_type {
            query.insert("response-content-type".to_string(), v.clone());
        }
        if let Some(v) = &opts.content_encoding {
            query.insert("response-content-encoding".to_string(), v.clone());
        }

        let response = if query.is_empty() {
            bucket.get_object(&routed.key).await
        } else {
            let bucket = bucket
                .clone()
                .with_extra_query(query)
                .map_err(|e| Self::transport("get", e))?;
            bucket.get_object(&routed.key).await
        };

        match response {
            Ok(data) if data.status_code() == 404 => Ok(None),
            Ok(data) if data.status_code() / 100 != 2 => Err(StowageError::Transport(format!(
                "s3 get failed with status {}",
                data.status_code()
            ))),
            Ok(data) => Ok(Some(data)),
            Err(e) if Self::is_not_found(&e) => Ok(None),
            Err(e) => Err(Self::transport("get", e)),
        }
    }

    fn head_candidates(head: HeadObjectResult) -> HashMap<String, String> {
        let mut candidates = HashMap::new();
        let standard = [
            ("Content-Type", head.content_type),
            ("Content-Encoding", head.content_encoding),
            ("Content-Disposition", head.content_disposition),
            ("Cache-Control", head.cache_control),
            ("ETag", head.e_tag),
            ("Last-Modified", head.last_modified),
            ("Expires", head.expires),
        ];
        for (name, value) in standard {
            if let Some(v) = value {
                candidates.insert(name.to_string(), v);
            }
        }
        if let Some(len) = head.content_length {
            candidates.insert("Content-Length".to_string(), len.to_string());
        }
        if let Some(user_meta) = head.metadata {
            candidates.extend(user_meta);
        }
        candidates
    }

    async fn head_physical(
        &self,
        bucket: &str,
        physical_key: &str,
    ) -> Result<Option<HashMap<String, String>>> {
        match self.bucket(bucket)?.head_object(physical_key).await {
            Ok((_, 404)) => Ok(None),
            Ok((head, code)) if code / 100 == 2 => Ok(Some(Self::head_candidates(head))),
            Ok((_, code)) => Err(StowageError::Transport(format!(
                "s3 head failed with status {code}"
            ))),
            Err(e) if Self::is_not_found(&e) => Ok(None),
            Err(e) => Err(Self::transport("head", e)),
        }
    }

    fn put_headers(meta: &HashMap<String, String>, opts: &PutOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in meta {
            insert_header(&mut headers, &format!("{META_PREFIX}{}", name.to_ascii_lowercase()), value)?;
        }
        let standard = [
            ("Content-Encoding", &opts.content_encoding),
            ("Content-Disposition", &opts.content_disposition),
            ("Cache-Control", &opts.cache_control),
            ("Expires", &opts.expires),
        ];
        for (name, value) in standard {
            if let Some(v) = value {
                insert_header(&mut headers, name, v)?;
            }
        }
        Ok(headers)
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| StowageError::InvalidArgument(format!("invalid header name {name:?}: {e}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| StowageError::InvalidArgument(format!("invalid header value: {e}")))?;
    headers.insert(name, value);
    Ok(())
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket_name(&self, key: &str) -> Result<String> {
        self.router.bucket_name(key)
    }

    async fn get_bytes(&self, key: &str, opts: GetOptions) -> Result<Option<Bytes>> {
        Ok(self
            .fetch(key, &opts)
            .await?
            .map(|data| Bytes::from(data.to_vec())))
    }

    async fn get_with_meta(
        &self,
        key: &str,
        attrs: &[String],
        opts: GetOptions,
    ) -> Result<Option<(ByteReader, HashMap<String, String>)>> {
        match self.fetch(key, &opts).await? {
            None => Ok(None),
            Some(data) => {
                let headers = data.headers().clone();
                let selected = select_attrs(attrs, &headers, META_PREFIX);
                Ok(Some((bytes_reader(Bytes::from(data.to_vec())), selected)))
            }
        }
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        meta: &HashMap<String, String>,
        opts: PutOptions,
    ) -> Result<()> {
        let routed = self.router.route(key)?;

        let mut opts = opts;
        let mut data = data;
        if let Some(codec) = &self.codec {
            if data.len() > self.compress_limit {
                data = Bytes::from(codec.compress(&data)?);
                opts.content_encoding = Some(codec.content_encoding().to_string());
            }
        }

        let content_type = opts
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let headers = Self::put_headers(meta, &opts)?;
        let bucket = self
            .bucket(&routed.bucket)?
            .clone()
            .with_extra_headers(headers)
            .map_err(|e| Self::transport("put", e))?;

        retry_put(|| {
            let bucket = bucket.clone();
            let key = routed.key.clone();
            let data = data.clone();
            let content_type = content_type.clone();
            async move {
                bucket
                    .put_object_with_content_type(&key, &data, &content_type)
                    .await
                    .map_err(|e| Self::transport("put", e))?;
                Ok(())
            }
        })
        .await
    }

    async fn del(&self, key: &str) -> Result<()> {
        let routed = self.router.route(key)?;
        self.bucket(&routed.bucket)?
            .delete_object(&routed.key)
            .await
            .map_err(|e| Self::transport("delete", e))?;
        Ok(())
    }

    async fn del_multi(&self, keys: &[String]) -> Result<()> {
        let mut grouped: HashMap<String, Vec<(String, String)>> = HashMap::new();
        let mut failures = Vec::new();
        for key in keys {
            match self.router.route(key) {
                Ok(routed) => grouped
                    .entry(routed.bucket)
                    .or_default()
                    .push((key.clone(), routed.key)),
                Err(e) => failures.push((key.clone(), e.to_string())),
            }
        }

        for (bucket_name, batch) in grouped {
            let bucket = match self.bucket(&bucket_name) {
                Ok(b) => b,
                Err(e) => {
                    let reason = e.to_string();
                    failures.extend(batch.into_iter().map(|(key, _)| (key, reason.clone())));
                    continue;
                }
            };
            for (logical, physical) in batch {
                if let Err(e) = bucket.delete_object(&physical).await {
                    failures.push((logical, Self::transport("delete", e).to_string()));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(StowageError::MultiDelete(failures))
        }
    }

    async fn head(&self, key: &str, attrs: &[String]) -> Result<Option<HashMap<String, String>>> {
        let routed = self.router.route(key)?;
        match self.head_physical(&routed.bucket, &routed.key).await? {
            None => Ok(None),
            Some(candidates) => Ok(Some(select_attrs(attrs, &candidates, META_PREFIX))),
        }
    }

    async fn list_object(
        &self,
        key: &str,
        prefix: &str,
        marker: &str,
        max_keys: i64,
        delimiter: &str,
    ) -> Result<Vec<String>> {
        let bucket_name = self.router.bucket_name(key)?;
        let bucket = self.bucket(&bucket_name)?;

        let delimiter = (!delimiter.is_empty()).then(|| delimiter.to_string());
        let start_after = (!marker.is_empty()).then(|| marker.to_string());
        let max_keys = usize::try_from(max_keys.max(0))
            .map_err(|_| StowageError::InvalidArgument("max_keys out of range".to_string()))?;

        let (page, _) = bucket
            .list_page(prefix.to_string(), delimiter, None, start_after, Some(max_keys))
            .await
            .map_err(|e| Self::transport("list", e))?;

        Ok(page.contents.into_iter().map(|obj| obj.key).collect())
    }

    async fn sign_url(&self, key: &str, expires_secs: i64, opts: SignOptions) -> Result<String> {
        if opts.process.is_some() {
            return Err(StowageError::Unsupported("sign_url with a process option"));
        }
        let expires = u32::try_from(expires_secs)
            .map_err(|_| StowageError::InvalidArgument("expiry out of range".to_string()))?;
        let routed = self.router.route(key)?;
        self.bucket(&routed.bucket)?
            .presign_get(&routed.key, expires, None)
            .await
            .map_err(|e| Self::transport("presign", e))
    }

    async fn range(&self, key: &str, offset: u64, length: u64) -> Result<ByteReader> {
        if length == 0 {
            return Err(StowageError::InvalidArgument(
                "range length must be positive".to_string(),
            ));
        }
        let routed = self.router.route(key)?;
        let data = self
            .bucket(&routed.bucket)?
            .get_object_range(&routed.key, offset, Some(offset + length - 1))
            .await
            .map_err(|e| Self::transport("range", e))?;
        if data.status_code() / 100 != 2 {
            return Err(StowageError::Transport(format!(
                "s3 range failed with status {}",
                data.status_code()
            )));
        }
        Ok(bytes_reader(Bytes::from(data.to_vec())))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let routed = self.router.route(key)?;
        Ok(self.head_physical(&routed.bucket, &routed.key).await?.is_some())
    }

    async fn copy(&self, src_key: &str, dst_key: &str, opts: CopyOptions) -> Result<()> {
        let (src_bucket, src_physical) = if opts.raw_src_key {
            parse_raw_source(src_key)?
        } else {
            let routed = self.router.route(src_key)?;
            (routed.bucket, routed.key)
        };
        let dst = self.router.route(dst_key)?;

        let mut headers = HeaderMap::new();
        let mut content_type = None;
        if opts.copy_meta {
            let candidates = self
                .head_physical(&src_bucket, &src_physical)
                .await?
                .ok_or_else(|| {
                    StowageError::Transport(format!("copy source {src_physical:?} does not exist"))
                })?;

            let mut attrs = opts.meta_keys.clone();
            attrs.push(CONTENT_ENCODING.to_string());
            let selected = select_attrs(&attrs, &candidates, META_PREFIX);

            insert_header(&mut headers, "x-amz-metadata-directive", "REPLACE")?;
            for (name, value) in &selected {
                if name.eq_ignore_ascii_case(CONTENT_ENCODING) {
                    insert_header(&mut headers, CONTENT_ENCODING, value)?;
                } else {
                    insert_header(
                        &mut headers,
                        &format!("{META_PREFIX}{}", name.to_ascii_lowercase()),
                        value,
                    )?;
                }
            }
            content_type = candidates.get("Content-Type").cloned();
        }

        if src_bucket == dst.bucket {
            let bucket = self
                .bucket(&dst.bucket)?
                .clone()
                .with_extra_headers(headers)
                .map_err(|e| Self::transport("copy", e))?;
            let code = bucket
                .copy_object_internal(&src_physical, &dst.key)
                .await
                .map_err(|e| Self::transport("copy", e))?;
            if code / 100 != 2 {
                return Err(StowageError::Transport(format!(
                    "s3 copy failed with status {code}"
                )));
            }
            return Ok(());
        }

        // Server-side copy only works within one bucket; cross-bucket copy
        // goes through the client.
        let data = self
            .bucket(&src_bucket)?
            .get_object(&src_physical)
            .await
            .map_err(|e| Self::transport("copy", e))?;
        if data.status_code() / 100 != 2 {
            return Err(StowageError::Transport(format!(
                "s3 copy source read failed with status {}",
                data.status_code()
            )));
        }

        let bucket = self
            .bucket(&dst.bucket)?
            .clone()
            .with_extra_headers(headers)
            .map_err(|e| Self::transport("copy", e))?;
        let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
        bucket
            .put_object_with_content_type(&dst.key, &data.to_vec(), &content_type)
            .await
            .map_err(|e| Self::transport("copy", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minio_config() -> BucketConfig {
        BucketConfig {
            access_key_id: "minioadmin".to_string(),
            access_key_secret: "minioadmin".to_string(),
            endpoint: "http://localhost:9000".to_string(),
            region: "us-east-1".to_string(),
            bucket: "test-bucket".to_string(),
            force_path_style: true,
            ssl: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_construction() {
        let store = S3Store::new(&minio_config(), &CodecRegistry::builtin()).unwrap();
        assert_eq!(store.bucket_name("any-key").unwrap(), "test-bucket");
    }

    #[test]
    fn test_sharded_construction() {
        let cfg = BucketConfig {
            shards: vec!["abc".to_string(), "def".to_string()],
            ..minio_config()
        };
        let store = S3Store::new(&cfg, &CodecRegistry::builtin()).unwrap();
        assert_eq!(store.bucket_name("key-a").unwrap(), "test-bucket-abc");
        assert_eq!(store.bucket_name("key-f").unwrap(), "test-bucket-def");
        assert!(store.bucket_name("key-z").is_err());
    }

    #[test]
    fn test_put_headers() {
        let mut meta = HashMap::new();
        meta.insert("Compressor".to_string(), "snappy".to_string());
        let opts = PutOptions::default().cache_control("no-cache");

        let headers = S3Store::put_headers(&meta, &opts).unwrap();
        assert_eq!(headers.get("x-amz-meta-compressor").unwrap(), "snappy");
        assert_eq!(headers.get("Cache-Control").unwrap(), "no-cache");
    }

    // Integration tests require MinIO running locally
    // Run with: cargo test -p stowage -- --ignored

    #[tokio::test]
    #[ignore]
    async fn test_s3_roundtrip_with_minio() {
        let store = S3Store::new(&minio_config(), &CodecRegistry::builtin()).unwrap();
        let key = "roundtrip.txt";
        let data = Bytes::from_static(b"hello minio");

        store
            .put(key, data.clone(), &HashMap::new(), PutOptions::default())
            .await
            .unwrap();
        assert!(store.exists(key).await.unwrap());
        assert_eq!(store.get_bytes(key, GetOptions::default()).await.unwrap(), Some(data));

        store.del(key).await.unwrap();
        assert!(!store.exists(key).await.unwrap());
    }
}
