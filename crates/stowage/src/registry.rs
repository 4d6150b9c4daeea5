//! Client registry: one store per configured bucket entry.
//!
//! Built once at service bootstrap from a [`Config`] and immutable after
//! that. Any construction failure is returned to the caller, which is
//! expected to abort startup. The registry also mirrors the whole
//! capability surface, delegating to the default client, so most callers
//! never touch [`ObjectStore`] directly.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::compress::CodecRegistry;
use crate::config::{BucketConfig, Config, StorageKind};
use crate::error::{Result, StowageError};
use crate::options::{CopyOptions, GetOptions, PutOptions, SignOptions};
use crate::storage::{ByteReader, LocalStore, ObjectStore, OssStore, S3Store};

/// Immutable set of configured object-store clients.
pub struct StoreRegistry {
    default: Option<Arc<dyn ObjectStore>>,
    named: HashMap<String, Arc<dyn ObjectStore>>,
}

fn build_store(name: &str, cfg: &BucketConfig, codecs: &CodecRegistry) -> Result<Arc<dyn ObjectStore>> {
    match cfg.storage_type {
        StorageKind::Local => Ok(Arc::new(LocalStore::new(cfg)?)),
        StorageKind::S3 | StorageKind::Oss if cfg.bucket.is_empty() => Err(StowageError::Config(
            format!("bucket entry {name:?} has no bucket name"),
        )),
        StorageKind::S3 => Ok(Arc::new(S3Store::new(cfg, codecs)?)),
        StorageKind::Oss => Ok(Arc::new(OssStore::new(cfg, codecs)?)),
    }
}

impl StoreRegistry {
    /// Build every configured client. The default entry is optional; a
    /// named entry that fails validation fails the whole build.
    pub fn build(config: &Config) -> Result<Self> {
        let codecs = CodecRegistry::builtin();

        let default = if config.default.bucket.is_empty()
            && config.default.storage_type != StorageKind::Local
        {
            None
        } else {
            Some(build_store("default", &config.default, &codecs)?)
        };

        let mut named = HashMap::new();
        for (name, cfg) in &config.buckets {
            named.insert(name.clone(), build_store(name, cfg, &codecs)?);
        }

        tracing::info!(
            named = named.len(),
            has_default = default.is_some(),
            "storage registry built"
        );
        Ok(Self { default, named })
    }

    /// The default client.
    pub fn default_client(&self) -> Result<&Arc<dyn ObjectStore>> {
        self.default
            .as_ref()
            .ok_or_else(|| StowageError::Config("no default bucket configured".to_string()))
    }

    /// A named client.
    pub fn client(&self, name: &str) -> Result<&Arc<dyn ObjectStore>> {
        self.named
            .get(name)
            .ok_or_else(|| StowageError::Config(format!("no bucket named {name:?} configured")))
    }

    // Capability surface, delegating to the default client.

    pub fn bucket_name(&self, key: &str) -> Result<String> {
        self.default_client()?.bucket_name(key)
    }

    pub async fn get(&self, key: &str, opts: GetOptions) -> Result<Option<String>> {
        self.default_client()?.get(key, opts).await
    }

    pub async fn get_bytes(&self, key: &str, opts: GetOptions) -> Result<Option<Bytes>> {
        self.default_client()?.get_bytes(key, opts).await
    }

    pub async fn get_as_reader(&self, key: &str, opts: GetOptions) -> Result<Option<ByteReader>> {
        self.default_client()?.get_as_reader(key, opts).await
    }

    pub async fn get_with_meta(
        &self,
        key: &str,
        attrs: &[String],
        opts: GetOptions,
    ) -> Result<Option<(ByteReader, HashMap<String, String>)>> {
        self.default_client()?.get_with_meta(key, attrs, opts).await
    }

    pub async fn get_and_decompress(&self, key: &str) -> Result<Option<String>> {
        self.default_client()?.get_and_decompress(key).await
    }

    pub async fn get_and_decompress_as_reader(&self, key: &str) -> Result<Option<ByteReader>> {
        self.default_client()?.get_and_decompress_as_reader(key).await
    }

    pub async fn put(
        &self,
        key: &str,
        data: Bytes,
        meta: &HashMap<String, String>,
        opts: PutOptions,
    ) -> Result<()> {
        self.default_client()?.put(key, data, meta, opts).await
    }

    pub async fn put_and_compress(
        &self,
        key: &str,
        data: Bytes,
        meta: &HashMap<String, String>,
        opts: PutOptions,
    ) -> Result<()> {
        self.default_client()?
            .put_and_compress(key, data, meta, opts)
            .await
    }

    pub async fn del(&self, key: &str) -> Result<()> {
        self.default_client()?.del(key).await
    }

    pub async fn del_multi(&self, keys: &[String]) -> Result<()> {
        self.default_client()?.del_multi(keys).await
    }

    pub async fn head(
        &self,
        key: &str,
        attrs: &[String],
    ) -> Result<Option<HashMap<String, String>>> {
        self.default_client()?.head(key, attrs).await
    }

    pub async fn list_object(
        &self,
        key: &str,
        prefix: &str,
        marker: &str,
        max_keys: i64,
        delimiter: &str,
    ) -> Result<Vec<String>> {
        self.default_client()?
            .list_object(key, prefix, marker, max_keys, delimiter)
            .await
    }

    pub async fn sign_url(&self, key: &str, expires_secs: i64, opts: SignOptions) -> Result<String> {
        self.default_client()?.sign_url(key, expires_secs, opts).await
    }

    pub async fn range(&self, key: &str, offset: u64, length: u64) -> Result<ByteReader> {
        self.default_client()?.range(key, offset, length).await
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        self.default_client()?.exists(key).await
    }

    pub async fn copy(&self, src_key: &str, dst_key: &str, opts: CopyOptions) -> Result<()> {
        self.default_client()?.copy(src_key, dst_key, opts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_entry_without_bucket_fails() {
        let mut buckets = HashMap::new();
        buckets.insert("media".to_string(), BucketConfig::default());
        let config = Config {
            default: BucketConfig::default(),
            buckets,
        };
        assert!(matches!(
            StoreRegistry::build(&config),
            Err(StowageError::Config(_))
        ));
    }

    #[test]
    fn test_missing_default_client() {
        let registry = StoreRegistry::build(&Config::default()).unwrap();
        assert!(matches!(
            registry.default_client(),
            Err(StowageError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_named_client() {
        let registry = StoreRegistry::build(&Config::default()).unwrap();
        assert!(matches!(
            registry.client("never-configured"),
            Err(StowageError::Config(_))
        ));
    }
}
