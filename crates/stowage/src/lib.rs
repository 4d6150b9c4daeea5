//! # stowage
//!
//! Uniform object-storage client over multiple backends.
//!
//! Provides:
//! - A single capability interface (get/put/delete/list/head/sign/copy/range)
//!   over S3-compatible services, Aliyun-style OSS, and the local filesystem
//! - Key routing: automatic prefixing plus deterministic bucket sharding by
//!   the last character of the key
//! - Transparent compression driven by a `Compressor` metadata tag
//! - A registry of configured clients (default + named)
//!
//! ## Example
//!
//! ```rust,no_run
//! use stowage::{Config, GetOptions, PutOptions, StoreRegistry};
//!
//! # async fn example() -> stowage::Result<()> {
//! let config: Config = serde_json::from_str(r#"{
//!     "storage_type": "s3",
//!     "bucket": "content",
//!     "region": "us-east-1",
//!     "access_key_id": "ak",
//!     "access_key_secret": "sk"
//! }"#).unwrap();
//!
//! let registry = StoreRegistry::build(&config)?;
//! registry
//!     .put("greeting.txt", "hello".into(), &Default::default(), PutOptions::new())
//!     .await?;
//! let body = registry.get("greeting.txt", GetOptions::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod compress;
pub mod config;
pub mod error;
pub mod meta;
pub mod options;
pub mod registry;
pub mod router;
pub mod storage;

pub use compress::{Codec, CodecRegistry, GzipCodec, SnappyCodec, COMPRESSOR_META_KEY};
pub use config::{BucketConfig, Config, StorageKind};
pub use error::{Result, StowageError};
pub use options::{CopyOptions, GetOptions, PutOptions, SignOptions};
pub use registry::StoreRegistry;
pub use router::{KeyRouter, Routed};
pub use storage::{ByteReader, LocalStore, ObjectStore, OssStore, S3Store};
