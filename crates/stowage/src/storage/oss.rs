//! Aliyun-style OSS storage backend.
//!
//! Talks to the service directly over HTTP with v1 header signing
//! (`Authorization: OSS <ak>:<signature>`, HMAC-SHA1 over the canonical
//! request). User metadata travels as `x-oss-meta-*` headers; list and
//! multi-delete bodies are XML.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use chrono::Utc;
use futures::TryStreamExt;
use hmac::{Hmac, Mac};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use tokio_util::io::StreamReader;

use crate::compress::{resolve_codec, Codec, CodecRegistry};
use crate::config::BucketConfig;
use crate::error::{Result, StowageError};
use crate::meta::{select_attrs, CONTENT_ENCODING};
use crate::options::{CopyOptions, GetOptions, PutOptions, SignOptions};
use crate::router::KeyRouter;
use crate::storage::{bytes_reader, parse_raw_source, retry_put, ByteReader, ObjectStore};

const META_PREFIX: &str = "x-oss-meta-";
const CRC_HEADER: &str = "x-oss-hash-crc64ecma";

type HmacSha1 = Hmac<Sha1>;

/// One signed OSS request.
#[derive(Debug, Clone, Default)]
struct OssRequest {
    bucket: String,
    /// Physical key; empty for bucket-level operations.
    key: String,
    content_type: Option<String>,
    content_md5: Option<String>,
    /// Lowercased `x-oss-*` headers, part of the signature.
    oss_headers: BTreeMap<String, String>,
    /// Headers outside the signature (Range, Cache-Control, ...).
    plain_headers: Vec<(String, String)>,
    /// Query parameters that belong to the canonicalized resource.
    subresources: Vec<(String, Option<String>)>,
    /// Query parameters outside the signature (list parameters).
    unsigned_query: Vec<(String, String)>,
    body: Option<Bytes>,
}

/// OSS-backed [`ObjectStore`].
pub struct OssStore {
    client: reqwest::Client,
    router: KeyRouter,
    scheme: String,
    host: String,
    access_key_id: String,
    access_key_secret: String,
    codec: Option<Arc<dyn Codec>>,
    compress_limit: usize,
}

impl OssStore {
    /// Build a store from a bucket configuration.
    pub fn new(cfg: &BucketConfig, codecs: &CodecRegistry) -> Result<Self> {
        let router = KeyRouter::new(&cfg.bucket, &cfg.prefix, &cfg.shards)?;

        let endpoint = cfg.endpoint_url();
        let (scheme, host) = endpoint
            .split_once("://")
            .ok_or_else(|| StowageError::Config(format!("invalid endpoint {endpoint:?}")))?;
        let host = host.trim_end_matches('/');
        if host.is_empty() {
            return Err(StowageError::Config("oss endpoint host is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(cfg.idle_conn_timeout_secs))
            .pool_max_idle_per_host(if cfg.enable_keep_alives {
                cfg.max_idle_conns_per_host
            } else {
                0
            })
            .tcp_keepalive(cfg.enable_keep_alives.then(|| Duration::from_secs(60)))
            .build()
            .map_err(|e| StowageError::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            router,
            scheme: scheme.to_string(),
            host: host.to_string(),
            access_key_id: cfg.access_key_id.clone(),
            access_key_secret: cfg.access_key_secret.clone(),
            codec: resolve_codec(cfg, codecs),
            compress_limit: cfg.compress_limit,
        })
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}://{}.{}/{}", self.scheme, bucket, self.host, encode_key(key))
    }

    async fn send(&self, method: Method, req: OssRequest) -> Result<reqwest::Response> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let resource = canonical_resource(&req.bucket, &req.key, &req.subresources);
        let string_to_sign = string_to_sign(
            method.as_str(),
            req.content_md5.as_deref().unwrap_or(""),
            req.content_type.as_deref().unwrap_or(""),
            &date,
            &req.oss_headers,
            &resource,
        );
        let signature = sign(&self.access_key_secret, &string_to_sign)?;

        let mut url = self.object_url(&req.bucket, &req.key);
        let mut query: Vec<String> = Vec::new();
        for (name, value) in &req.subresources {
            match value {
                Some(v) => query.push(format!("{name}={}", urlencoding::encode(v))),
                None => query.push(name.clone()),
            }
        }
        for (name, value) in &req.unsigned_query {
            query.push(format!("{name}={}", urlencoding::encode(value)));
        }
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }

        let mut builder = self
            .client
            .request(method, url)
            .header("Date", &date)
            .header(
                "Authorization",
                format!("OSS {}:{}", self.access_key_id, signature),
            );
        if let Some(v) = &req.content_type {
            builder = builder.header("Content-Type", v);
        }
        if let Some(v) = &req.content_md5 {
            builder = builder.header("Content-MD5", v);
        }
        for (name, value) in &req.oss_headers {
            builder = builder.header(name, value);
        }
        for (name, value) in &req.plain_headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        builder
            .send()
            .await
            .map_err(|e| StowageError::Transport(format!("oss request failed: {e}")))
    }

    async fn fetch(&self, key: &str, opts: &GetOptions) -> Result<Option<reqwest::Response>> {
        let routed = self.router.route(key)?;
        let mut req = OssRequest {
            bucket: routed.bucket,
            key: routed.key,
            ..Default::default()
        };
        if let Some(v) = &opts.content_type {
            req.subresources
                .push(("response-content-type".to_string(), Some(v.clone())));
        }
        if let Some(v) = &opts.content_encoding {
            req.subresources
                .push(("response-content-encoding".to_string(), Some(v.clone())));
        }

        let resp = self.send(Method::GET, req).await?;
        match resp.status().as_u16() {
            404 => Ok(None),
            code if (200..300).contains(&code) => Ok(Some(resp)),
            code => Err(StowageError::Transport(format!(
                "oss get failed with status {code}"
            ))),
        }
    }

    async fn body_with_crc(&self, resp: reqwest::Response, validate: bool) -> Result<Bytes> {
        let server_crc = resp
            .headers()
            .get(CRC_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = resp
            .bytes()
            .await
            .map_err(|e| StowageError::Transport(format!("oss body read failed: {e}")))?;

        if validate {
            if let Some(server) = server_crc {
                let mut digest = crc64fast::Digest::new();
                digest.write(&body);
                let client = digest.sum64();
                if client != server {
                    return Err(StowageError::ChecksumMismatch { server, client });
                }
            }
        }
        Ok(body)
    }

    fn header_map(resp: &reqwest::Response) -> HashMap<String, String> {
        resp.headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect()
    }

    async fn head_physical(
        &self,
        bucket: &str,
        physical_key: &str,
    ) -> Result<Option<HashMap<String, String>>> {
        let req = OssRequest {
            bucket: bucket.to_string(),
            key: physical_key.to_string(),
            ..Default::default()
        };
        let resp = self.send(Method::HEAD, req).await?;
        match resp.status().as_u16() {
            404 => Ok(None),
            code if (200..300).contains(&code) => Ok(Some(Self::header_map(&resp))),
            code => Err(StowageError::Transport(format!(
                "oss head failed with status {code}"
            ))),
        }
    }

    fn write_headers(meta: &HashMap<String, String>, opts: &PutOptions) -> OssRequestHeaders {
        let mut oss_headers = BTreeMap::new();
        for (name, value) in meta {
            oss_headers.insert(
                format!("{META_PREFIX}{}", name.to_ascii_lowercase()),
                value.clone(),
            );
        }
        let mut plain_headers = Vec::new();
        let standard = [
            (CONTENT_ENCODING, &opts.content_encoding),
            ("Content-Disposition", &opts.content_disposition),
            ("Cache-Control", &opts.cache_control),
            ("Expires", &opts.expires),
        ];
        for (name, value) in standard {
            if let Some(v) = value {
                plain_headers.push((name.to_string(), v.clone()));
            }
        }
        (oss_headers, plain_headers)
    }
}

type OssRequestHeaders = (BTreeMap<String, String>, Vec<(String, String)>);

fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn canonical_resource(bucket: &str, key: &str, subresources: &[(String, Option<String>)]) -> String {
    let mut resource = format!("/{bucket}/{key}");
    if !subresources.is_empty() {
        let mut parts: Vec<String> = subresources
            .iter()
            .map(|(name, value)| match value {
                Some(v) => format!("{name}={v}"),
                None => name.clone(),
            })
            .collect();
        parts.sort();
        resource.push('?');
        resource.push_str(&parts.join("&"));
    }
    resource
}

fn string_to_sign(
    verb: &str,
    content_md5: &str,
    content_type: &str,
    date: &str,
    oss_headers: &BTreeMap<String, String>,
    resource: &str,
) -> String {
    let mut out = format!("{verb}\n{content_md5}\n{content_type}\n{date}\n");
    for (name, value) in oss_headers {
        out.push_str(&format!("{name}:{value}\n"));
    }
    out.push_str(resource);
    out
}

fn sign(secret: &str, string_to_sign: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| StowageError::Config(format!("invalid signing key: {e}")))?;
    mac.update(string_to_sign.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[derive(Serialize)]
#[serde(rename = "Delete")]
struct DeleteBatch {
    #[serde(rename = "Quiet")]
    quiet: bool,
    #[serde(rename = "Object")]
    objects: Vec<DeleteEntry>,
}

#[derive(Serialize)]
struct DeleteEntry {
    #[serde(rename = "Key")]
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListBucketResult {
    #[serde(default)]
    contents: Vec<ListEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListEntry {
    key: String,
}

#[async_trait]
impl ObjectStore for OssStore {
    fn bucket_name(&self, key: &str) -> Result<String> {
        self.router.bucket_name(key)
    }

    async fn get_bytes(&self, key: &str, opts: GetOptions) -> Result<Option<Bytes>> {
        let validate = opts.enable_crc_validation;
        match self.fetch(key, &opts).await? {
            None => Ok(None),
            Some(resp) => Ok(Some(self.body_with_crc(resp, validate).await?)),
        }
    }

    /// Streams the response body instead of buffering it. CRC validation
    /// does not apply to streamed reads.
    async fn get_as_reader(&self, key: &str, opts: GetOptions) -> Result<Option<ByteReader>> {
        match self.fetch(key, &opts).await? {
            None => Ok(None),
            Some(resp) => {
                let stream = resp
                    .bytes_stream()
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
                Ok(Some(Box::new(StreamReader::new(Box::pin(stream)))))
            }
        }
    }

    async fn get_with_meta(
        &self,
        key: &str,
        attrs: &[String],
        opts: GetOptions,
    ) -> Result<Option<(ByteReader, HashMap<String, String>)>> {
        let validate = opts.enable_crc_validation;
        match self.fetch(key, &opts).await? {
            None => Ok(None),
            Some(resp) => {
                let headers = Self::header_map(&resp);
                let selected = select_attrs(attrs, &headers, META_PREFIX);
                let body = self.body_with_crc(resp, validate).await?;
                Ok(Some((bytes_reader(body), selected)))
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

        let (oss_headers, plain_headers) = Self::write_headers(meta, &opts);
        let content_type = opts.content_type.clone();

        retry_put(|| {
            let req = OssRequest {
                bucket: routed.bucket.clone(),
                key: routed.key.clone(),
                content_type: content_type.clone(),
                oss_headers: oss_headers.clone(),
                plain_headers: plain_headers.clone(),
                body: Some(data.clone()),
                ..Default::default()
            };
            async move {
                let resp = self.send(Method::PUT, req).await?;
                let code = resp.status().as_u16();
                if (200..300).contains(&code) {
                    Ok(())
                } else {
                    Err(StowageError::Transport(format!(
                        "oss put failed with status {code}"
                    )))
                }
            }
        })
        .await
    }

    async fn del(&self, key: &str) -> Result<()> {
        let routed = self.router.route(key)?;
        let req = OssRequest {
            bucket: routed.bucket,
            key: routed.key,
            ..Default::default()
        };
        let resp = self.send(Method::DELETE, req).await?;
        let code = resp.status().as_u16();
        if (200..300).contains(&code) || code == 404 {
            Ok(())
        } else {
            Err(StowageError::Transport(format!(
                "oss delete failed with status {code}"
            )))
        }
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

        for (bucket, batch) in grouped {
            let body = DeleteBatch {
                quiet: true,
                objects: batch
                    .iter()
                    .map(|(_, physical)| DeleteEntry {
                        key: physical.clone(),
                    })
                    .collect(),
            };
            let xml = match quick_xml::se::to_string(&body) {
                Ok(xml) => xml,
                Err(e) => {
                    let reason = format!("failed to encode delete batch: {e}");
                    failures.extend(batch.into_iter().map(|(key, _)| (key, reason.clone())));
                    continue;
                }
            };
            let body = Bytes::from(xml);
            let md5 = BASE64.encode(*md5::compute(&body));

            let req = OssRequest {
                bucket,
                content_type: Some("application/xml".to_string()),
                content_md5: Some(md5),
                subresources: vec![("delete".to_string(), None)],
                body: Some(body),
                ..Default::default()
            };
            match self.send(Method::POST, req).await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    let reason = format!("oss multi-delete failed with status {}", resp.status());
                    failures.extend(batch.into_iter().map(|(key, _)| (key, reason.clone())));
                }
                Err(e) => {
                    let reason = e.to_string();
                    failures.extend(batch.into_iter().map(|(key, _)| (key, reason.clone())));
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
            Some(headers) => Ok(Some(select_attrs(attrs, &headers, META_PREFIX))),
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
        let bucket = self.router.bucket_name(key)?;
        let mut unsigned_query = vec![
            ("prefix".to_string(), prefix.to_string()),
            ("max-keys".to_string(), max_keys.to_string()),
        ];
        if !marker.is_empty() {
            unsigned_query.push(("marker".to_string(), marker.to_string()));
        }
        if !delimiter.is_empty() {
            unsigned_query.push(("delimiter".to_string(), delimiter.to_string()));
        }

        let req = OssRequest {
            bucket,
            unsigned_query,
            ..Default::default()
        };
        let resp = self.send(Method::GET, req).await?;
        let code = resp.status().as_u16();
        if !(200..300).contains(&code) {
            return Err(StowageError::Transport(format!(
                "oss list failed with status {code}"
            )));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| StowageError::Transport(format!("oss list body read failed: {e}")))?;
        let result: ListBucketResult = quick_xml::de::from_str(&body)
            .map_err(|e| StowageError::Transport(format!("oss list response malformed: {e}")))?;
        Ok(result.contents.into_iter().map(|entry| entry.key).collect())
    }

    async fn sign_url(&self, key: &str, expires_secs: i64, opts: SignOptions) -> Result<String> {
        if expires_secs <= 0 {
            return Err(StowageError::InvalidArgument(
                "expiry must be positive".to_string(),
            ));
        }
        let routed = self.router.route(key)?;
        let expires = Utc::now().timestamp() + expires_secs;

        let mut subresources = Vec::new();
        if let Some(process) = &opts.process {
            subresources.push(("x-oss-process".to_string(), Some(process.clone())));
        }
        let resource = canonical_resource(&routed.bucket, &routed.key, &subresources);
        let string_to_sign = format!("GET\n\n\n{expires}\n{resource}");
        let signature = sign(&self.access_key_secret, &string_to_sign)?;

        let mut url = format!(
            "{}?OSSAccessKeyId={}&Expires={}&Signature={}",
            self.object_url(&routed.bucket, &routed.key),
            urlencoding::encode(&self.access_key_id),
            expires,
            urlencoding::encode(&signature),
        );
        if let Some(process) = &opts.process {
            url.push_str(&format!("&x-oss-process={}", urlencoding::encode(process)));
        }
        Ok(url)
    }

    async fn range(&self, key: &str, offset: u64, length: u64) -> Result<ByteReader> {
        if length == 0 {
            return Err(StowageError::InvalidArgument(
                "range length must be positive".to_string(),
            ));
        }
        let routed = self.router.route(key)?;
        let req = OssRequest {
            bucket: routed.bucket,
            key: routed.key,
            plain_headers: vec![(
                "Range".to_string(),
                format!("bytes={}-{}", offset, offset + length - 1),
            )],
            ..Default::default()
        };
        let resp = self.send(Method::GET, req).await?;
        let code = resp.status().as_u16();
        if !(200..300).contains(&code) {
            return Err(StowageError::Transport(format!(
                "oss range failed with status {code}"
            )));
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| StowageError::Transport(format!("oss body read failed: {e}")))?;
        Ok(bytes_reader(body))
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

        let mut oss_headers = BTreeMap::new();
        oss_headers.insert(
            "x-oss-copy-source".to_string(),
            format!("/{}/{}", src_bucket, encode_key(&src_physical)),
        );

        let mut plain_headers = Vec::new();
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

            oss_headers.insert("x-oss-metadata-directive".to_string(), "REPLACE".to_string());
            for (name, value) in &selected {
                if name.eq_ignore_ascii_case(CONTENT_ENCODING) {
                    plain_headers.push((CONTENT_ENCODING.to_string(), value.clone()));
                } else {
                    oss_headers.insert(
                        format!("{META_PREFIX}{}", name.to_ascii_lowercase()),
                        value.clone(),
                    );
                }
            }
        }

        let req = OssRequest {
            bucket: dst.bucket,
            key: dst.key,
            oss_headers,
            plain_headers,
            ..Default::default()
        };
        let resp = self.send(Method::PUT, req).await?;
        let code = resp.status().as_u16();
        if (200..300).contains(&code) {
            Ok(())
        } else {
            Err(StowageError::Transport(format!(
                "oss copy failed with status {code}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Signature vector from the Aliyun signing documentation.
    #[test]
    fn test_signature_known_answer() {
        let mut oss_headers = BTreeMap::new();
        oss_headers.insert("x-oss-magic".to_string(), "abracadabra".to_string());
        oss_headers.insert("x-oss-meta-author".to_string(), "foo@bar.com".to_string());

        let sts = string_to_sign(
            "PUT",
            "eB5eJF1ptWaXm4bijSPyxw==",
            "text/html",
            "Thu, 17 Nov 2005 18:49:58 GMT",
            &oss_headers,
            "/oss-example/nelson",
        );
        let signature = sign("OtxrzxIsfpFjA7SwPzILwy8Bw21TLhquhboDYROV", &sts).unwrap();
        assert_eq!(signature, "26NBxoKdsyly4EDv6inkoDft/yA=");
    }

    #[test]
    fn test_canonical_resource() {
        assert_eq!(canonical_resource("b", "k/x", &[]), "/b/k/x");

        let subs = vec![
            ("x-oss-process".to_string(), Some("image/resize".to_string())),
            ("delete".to_string(), None),
        ];
        assert_eq!(
            canonical_resource("b", "k", &subs),
            "/b/k?delete&x-oss-process=image/resize"
        );
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("a/b c/d+e"), "a/b%20c/d%2Be");
        assert_eq!(encode_key("plain"), "plain");
    }

    #[test]
    fn test_list_response_parsing() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <ListBucketResult>
              <Name>content</Name>
              <Contents><Key>a/1</Key><Size>10</Size></Contents>
              <Contents><Key>a/2</Key><Size>20</Size></Contents>
            </ListBucketResult>"#;
        let result: ListBucketResult = quick_xml::de::from_str(xml).unwrap();
        let keys: Vec<String> = result.contents.into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["a/1".to_string(), "a/2".to_string()]);
    }

    #[test]
    fn test_delete_batch_encoding() {
        let batch = DeleteBatch {
            quiet: true,
            objects: vec![
                DeleteEntry { key: "k1".to_string() },
                DeleteEntry { key: "k2".to_string() },
            ],
        };
        let xml = quick_xml::se::to_string(&batch).unwrap();
        assert!(xml.contains("<Quiet>true</Quiet>"));
        assert!(xml.contains("<Key>k1</Key>"));
        assert!(xml.contains("<Key>k2</Key>"));
    }

    #[test]
    fn test_construction() {
        let cfg = BucketConfig {
            storage_type: crate::config::StorageKind::Oss,
            access_key_id: "ak".to_string(),
            access_key_secret: "sk".to_string(),
            endpoint: "oss-cn-hangzhou.aliyuncs.com".to_string(),
            bucket: "content".to_string(),
            ..Default::default()
        };
        let store = OssStore::new(&cfg, &CodecRegistry::builtin()).unwrap();
        assert_eq!(store.object_url("content", "a/b"), "https://content.oss-cn-hangzhou.aliyuncs.com/a/b");
        assert_eq!(store.bucket_name("whatever").unwrap(), "content");
    }
}
