//! Bucket configuration.
//!
//! The configuration loader is an external collaborator; this module only
//! defines the finished structs it is expected to produce.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Supported backend kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// S3-compatible API (AWS S3, MinIO, ...)
    #[default]
    S3,
    /// Aliyun-style OSS API
    Oss,
    /// Local filesystem, for tests and desktop use
    Local,
}

/// Per-bucket configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    /// Which backend serves this bucket.
    pub storage_type: StorageKind,
    pub access_key_id: String,
    pub access_key_secret: String,
    /// Backend endpoint. May carry a scheme; when it does not, one is
    /// derived from `ssl`.
    pub endpoint: String,
    /// Region, S3-like backends only.
    pub region: String,
    /// Bucket name (base name when shards are configured).
    pub bucket: String,
    /// Global key prefix, automatically applied to every key.
    pub prefix: String,
    /// Optional shard strings. A key whose (lowercased) last character is
    /// contained in shard `"abc"` is stored in bucket `"{bucket}-abc"`.
    pub shards: Vec<String>,
    /// Force path-style URLs, S3-like backends only (MinIO).
    pub force_path_style: bool,
    /// Use https when the endpoint does not carry a scheme.
    pub ssl: bool,
    /// Content root for the local backend.
    pub root: PathBuf,
    /// Enable transparent compression on the Put path.
    pub enable_compressor: bool,
    /// Codec name for the Put path ("gzip" or "snappy").
    pub compress_type: String,
    /// Payloads at or below this many bytes are stored uncompressed.
    pub compress_limit: usize,
    /// HTTP client total timeout in seconds.
    pub http_timeout_secs: u64,
    /// Idle connections kept per host.
    pub max_idle_conns_per_host: usize,
    /// Idle connection timeout in seconds.
    pub idle_conn_timeout_secs: u64,
    /// Keep connections alive between requests.
    pub enable_keep_alives: bool,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageKind::default(),
            access_key_id: String::new(),
            access_key_secret: String::new(),
            endpoint: String::new(),
            region: String::new(),
            bucket: String::new(),
            prefix: String::new(),
            shards: Vec::new(),
            force_path_style: false,
            ssl: true,
            root: PathBuf::new(),
            enable_compressor: false,
            compress_type: String::new(),
            compress_limit: 0,
            http_timeout_secs: 60,
            max_idle_conns_per_host: num_cpus::get() + 1,
            idle_conn_timeout_secs: 90,
            enable_keep_alives: true,
        }
    }
}

impl BucketConfig {
    /// Endpoint with a scheme, deriving one from `ssl` when absent.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else if self.ssl {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        }
    }
}

/// Full client configuration: one default bucket plus named extras.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Default bucket configuration, used when no name is given.
    #[serde(flatten)]
    pub default: BucketConfig,
    /// Additional buckets addressable by name.
    #[serde(default)]
    pub buckets: HashMap<String, BucketConfig>,
}
