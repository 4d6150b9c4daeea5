//! End-to-end tests through the registry over the filesystem backend.

use std::collections::HashMap;

use bytes::Bytes;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

use stowage::{
    BucketConfig, Config, CopyOptions, GetOptions, PutOptions, StorageKind, StoreRegistry,
    COMPRESSOR_META_KEY,
};

fn local_config(dir: &TempDir) -> Config {
    Config {
        default: BucketConfig {
            storage_type: StorageKind::Local,
            root: dir.path().to_path_buf(),
            ..Default::default()
        },
        buckets: HashMap::new(),
    }
}

fn no_meta() -> HashMap<String, String> {
    HashMap::new()
}

#[tokio::test]
async fn test_roundtrip() {
    let dir = TempDir::new().unwrap();
    let registry = StoreRegistry::build(&local_config(&dir)).unwrap();

    let data = Bytes::from_static(b"round trip payload");
    registry
        .put("docs/readme.txt", data.clone(), &no_meta(), PutOptions::new())
        .await
        .unwrap();

    let got = registry
        .get_bytes("docs/readme.txt", GetOptions::new())
        .await
        .unwrap();
    assert_eq!(got, Some(data));
}

#[tokio::test]
async fn test_compression_transparency() {
    let dir = TempDir::new().unwrap();
    let registry = StoreRegistry::build(&local_config(&dir)).unwrap();

    let data = Bytes::from("compressible ".repeat(200));
    registry
        .put_and_compress("blob", data.clone(), &no_meta(), PutOptions::new())
        .await
        .unwrap();

    // The decompressing read restores the original content.
    let restored = registry.get_and_decompress("blob").await.unwrap().unwrap();
    assert_eq!(restored.as_bytes(), &data[..]);

    // A plain read sees the compressed representation.
    let stored = registry.get_bytes("blob", GetOptions::new()).await.unwrap().unwrap();
    assert_ne!(stored, data);
    assert!(stored.len() < data.len());

    let head = registry
        .head("blob", &[COMPRESSOR_META_KEY.to_string()])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(head[COMPRESSOR_META_KEY], "snappy");
}

#[tokio::test]
async fn test_uncompressed_fallthrough() {
    let dir = TempDir::new().unwrap();
    let registry = StoreRegistry::build(&local_config(&dir)).unwrap();

    registry
        .put("plain", Bytes::from_static(b"uncompressed body"), &no_meta(), PutOptions::new())
        .await
        .unwrap();

    let got = registry.get_and_decompress("plain").await.unwrap();
    assert_eq!(got.as_deref(), Some("uncompressed body"));

    let mut reader = registry
        .get_and_decompress_as_reader("plain")
        .await
        .unwrap()
        .unwrap();
    let mut buf = String::new();
    reader.read_to_string(&mut buf).await.unwrap();
    assert_eq!(buf, "uncompressed body");
}

#[tokio::test]
async fn test_not_found_contract() {
    let dir = TempDir::new().unwrap();
    let registry = StoreRegistry::build(&local_config(&dir)).unwrap();

    assert!(registry.get("ghost", GetOptions::new()).await.unwrap().is_none());
    assert!(registry.head("ghost", &[]).await.unwrap().is_none());
    assert!(registry.get_and_decompress("ghost").await.unwrap().is_none());
    assert!(!registry.exists("ghost").await.unwrap());
}

#[tokio::test]
async fn test_range() {
    let dir = TempDir::new().unwrap();
    let registry = StoreRegistry::build(&local_config(&dir)).unwrap();

    registry
        .put("digits", Bytes::from_static(b"123456"), &no_meta(), PutOptions::new())
        .await
        .unwrap();

    let mut reader = registry.range("digits", 3, 3).await.unwrap();
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await.unwrap();
    assert_eq!(buf, b"456");
}

#[tokio::test]
async fn test_del_multi_completeness() {
    let dir = TempDir::new().unwrap();
    let registry = StoreRegistry::build(&local_config(&dir)).unwrap();

    let keys: Vec<String> = ["a/one", "b/two", "c/three"]
        .iter()
        .map(|k| k.to_string())
        .collect();
    for key in &keys {
        registry
            .put(key, Bytes::from_static(b"x"), &no_meta(), PutOptions::new())
            .await
            .unwrap();
    }

    registry.del_multi(&keys).await.unwrap();
    for key in &keys {
        assert!(!registry.exists(key).await.unwrap());
    }
}

#[tokio::test]
async fn test_copy_with_metadata() {
    let dir = TempDir::new().unwrap();
    let registry = StoreRegistry::build(&local_config(&dir)).unwrap();

    let mut meta = HashMap::new();
    meta.insert("Owner".to_string(), "ops".to_string());
    registry
        .put(
            "orig",
            Bytes::from_static(b"copy me"),
            &meta,
            PutOptions::new().content_encoding("gzip"),
        )
        .await
        .unwrap();

    registry
        .copy("orig", "clone", CopyOptions::new().copy_meta(vec!["Owner".to_string()]))
        .await
        .unwrap();

    let got = registry.get("clone", GetOptions::new()).await.unwrap();
    assert_eq!(got.as_deref(), Some("copy me"));

    let head = registry
        .head("clone", &["Owner".to_string(), "Content-Encoding".to_string()])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(head["Owner"], "ops");
    assert_eq!(head["Content-Encoding"], "gzip");
}

#[tokio::test]
async fn test_named_clients() {
    let dir = TempDir::new().unwrap();
    let extra_dir = TempDir::new().unwrap();

    let mut config = local_config(&dir);
    config.buckets.insert(
        "scratch".to_string(),
        BucketConfig {
            storage_type: StorageKind::Local,
            root: extra_dir.path().to_path_buf(),
            ..Default::default()
        },
    );
    let registry = StoreRegistry::build(&config).unwrap();

    let scratch = registry.client("scratch").unwrap();
    scratch
        .put("note", Bytes::from_static(b"side"), &no_meta(), PutOptions::new())
        .await
        .unwrap();

    // Named clients are isolated from the default one.
    assert!(scratch.exists("note").await.unwrap());
    assert!(!registry.exists("note").await.unwrap());

    assert!(registry.client("missing").is_err());
}
