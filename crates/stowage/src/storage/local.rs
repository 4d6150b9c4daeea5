//! Local filesystem backend, for tests and desktop use.
//!
//! Each key maps to one file at `root/<key>`; intermediate directories are
//! created on demand. Object metadata lives in an in-process table and is
//! not persisted across restarts.

use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::config::BucketConfig;
use crate::error::{Result, StowageError};
use crate::meta::{select_attrs, CONTENT_ENCODING};
use crate::options::{CopyOptions, GetOptions, PutOptions, SignOptions};
use crate::storage::{bytes_reader, parse_raw_source, ByteReader, ObjectStore};

/// Filesystem-backed [`ObjectStore`].
pub struct LocalStore {
    root: PathBuf,
    // Keyed by logical key. Guarded because Put/Del/Copy mutate it.
    meta: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl LocalStore {
    /// Create a store rooted at `cfg.root`, creating the directory if
    /// needed.
    pub fn new(cfg: &BucketConfig) -> Result<Self> {
        if cfg.root.as_os_str().is_empty() {
            return Err(StowageError::Config(
                "local storage requires a root directory".to_string(),
            ));
        }
        std::fs::create_dir_all(&cfg.root)?;
        Ok(Self {
            root: cfg.root.clone(),
            meta: Mutex::new(HashMap::new()),
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(StowageError::InvalidArgument(
                "object key must not be empty".to_string(),
            ));
        }
        Ok(self.root.join(key))
    }

    fn stored_meta(&self, key: &str) -> HashMap<String, String> {
        self.meta.lock().get(key).cloned().unwrap_or_default()
    }

    async fn read_if_present(&self, key: &str) -> Result<Option<Bytes>> {
        match fs::read(self.path_for(key)?).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn collect_keys(
        root: &Path,
        dir: &Path,
        prefix: &str,
        out: &mut Vec<String>,
    ) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                Self::collect_keys(root, &path, prefix, out)?;
            } else if let Ok(rel) = path.strip_prefix(root) {
                let key = rel.to_string_lossy().replace('\\', "/");
                if key.starts_with(prefix) {
                    out.push(key);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn bucket_name(&self, _key: &str) -> Result<String> {
        Err(StowageError::Unsupported("bucket_name"))
    }

    async fn get_bytes(&self, key: &str, _opts: GetOptions) -> Result<Option<Bytes>> {
        self.read_if_present(key).await
    }

    async fn get_with_meta(
        &self,
        key: &str,
        attrs: &[String],
        _opts: GetOptions,
    ) -> Result<Option<(ByteReader, HashMap<String, String>)>> {
        match self.read_if_present(key).await? {
            None => Ok(None),
            Some(data) => {
                let mut candidates = self.stored_meta(key);
                candidates.insert("Content-Length".to_string(), data.len().to_string());
                let selected = select_attrs(attrs, &candidates, "");
                Ok(Some((bytes_reader(data), selected)))
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
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &data).await?;

        let mut stored = meta.clone();
        if let Some(v) = opts.content_type {
            stored.insert("Content-Type".to_string(), v);
        }
        if let Some(v) = opts.content_encoding {
            stored.insert(CONTENT_ENCODING.to_string(), v);
        }
        if let Some(v) = opts.content_disposition {
            stored.insert("Content-Disposition".to_string(), v);
        }
        if let Some(v) = opts.cache_control {
            stored.insert("Cache-Control".to_string(), v);
        }
        if let Some(v) = opts.expires {
            stored.insert("Expires".to_string(), v);
        }
        self.meta.lock().insert(key.to_string(), stored);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)?).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.meta.lock().remove(key);
        Ok(())
    }

    async fn del_multi(&self, keys: &[String]) -> Result<()> {
        let mut failures = Vec::new();
        for key in keys {
            if let Err(e) = self.del(key).await {
                failures.push((key.clone(), e.to_string()));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(StowageError::MultiDelete(failures))
        }
    }

    async fn head(&self, key: &str, attrs: &[String]) -> Result<Option<HashMap<String, String>>> {
        let size = match fs::metadata(self.path_for(key)?).await {
            Ok(m) => m.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut candidates = self.stored_meta(key);
        candidates.insert("Content-Length".to_string(), size.to_string());
        Ok(Some(select_attrs(attrs, &candidates, "")))
    }

    async fn list_object(
        &self,
        _key: &str,
        prefix: &str,
        marker: &str,
        max_keys: i64,
        _delimiter: &str,
    ) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        match Self::collect_keys(&self.root, &self.root, prefix, &mut keys) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        keys.sort();
        let keys = keys
            .into_iter()
            .filter(|k| marker.is_empty() || k.as_str() > marker)
            .take(usize::try_from(max_keys.max(0)).unwrap_or(usize::MAX))
            .collect();
        Ok(keys)
    }

    async fn sign_url(&self, _key: &str, _expires_secs: i64, _opts: SignOptions) -> Result<String> {
        Err(StowageError::Unsupported("sign_url"))
    }

    async fn range(&self, key: &str, offset: u64, length: u64) -> Result<ByteReader> {
        if length == 0 {
            return Err(StowageError::InvalidArgument(
                "range length must be positive".to_string(),
            ));
        }
        let mut file = fs::File::open(self.path_for(key)?).await?;
        file.seek(SeekFrom::Start(offset)).await?;
        Ok(Box::new(file.take(length)))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match fs::metadata(self.path_for(key)?).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn copy(&self, src_key: &str, dst_key: &str, opts: CopyOptions) -> Result<()> {
        let src_key = if opts.raw_src_key {
            parse_raw_source(src_key)?.1
        } else {
            src_key.to_string()
        };

        let data = self.read_if_present(&src_key).await?.ok_or_else(|| {
            StowageError::Transport(format!("copy source {src_key:?} does not exist"))
        })?;

        let src_meta = self.stored_meta(&src_key);
        let dst_meta = if opts.copy_meta {
            let mut attrs = opts.meta_keys.clone();
            attrs.push(CONTENT_ENCODING.to_string());
            select_attrs(&attrs, &src_meta, "")
        } else {
            src_meta
        };

        self.put(&dst_key, data, &dst_meta, PutOptions::default())
            .await
    }
}
