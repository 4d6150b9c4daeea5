//! Backend-agnostic metadata normalization.
//!
//! Backends fold user-metadata casing differently: S3-style services
//! title-case attribute names, OSS-style services lower-case them under an
//! `x-oss-meta-` prefix. Callers always see attribute names exactly as they
//! requested them; the lookup here absorbs the backend conventions.

use std::collections::HashMap;

/// Standard headers surfaced alongside user metadata by Head / GetWithMeta.
pub const STANDARD_HEADERS: &[&str] = &[
    "Content-Type",
    "Content-Length",
    "Content-Encoding",
    "Content-Disposition",
    "Cache-Control",
    "ETag",
    "Last-Modified",
    "Expires",
];

/// Header always carried forward by a metadata-replacing copy.
pub const CONTENT_ENCODING: &str = "Content-Encoding";

/// Select requested attributes out of a backend-native header map.
///
/// Each attribute is looked up case-insensitively, first under its own name
/// and then under `{meta_prefix}{name}`. Only attributes actually present
/// appear in the result, keyed exactly as the caller requested them.
pub fn select_attrs(
    attrs: &[String],
    headers: &HashMap<String, String>,
    meta_prefix: &str,
) -> HashMap<String, String> {
    let lowered: HashMap<String, &str> = headers
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.as_str()))
        .collect();

    let mut out = HashMap::new();
    for attr in attrs {
        let direct = attr.to_ascii_lowercase();
        let prefixed = format!("{}{}", meta_prefix.to_ascii_lowercase(), direct);
        if let Some(value) = lowered.get(&direct).or_else(|| lowered.get(&prefixed)) {
            out.insert(attr.clone(), (*value).to_string());
        }
    }
    out
}

/// Case-insensitive single-attribute lookup, same fallback order as
/// [`select_attrs`].
pub fn lookup_attr<'a>(
    attr: &str,
    headers: &'a HashMap<String, String>,
    meta_prefix: &str,
) -> Option<&'a str> {
    let wanted = attr.to_ascii_lowercase();
    let prefixed = format!("{}{}", meta_prefix.to_ascii_lowercase(), wanted);
    headers
        .iter()
        .find(|(k, _)| {
            let k = k.to_ascii_lowercase();
            k == wanted || k == prefixed
        })
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_select_title_cased() {
        // S3-style services title-case user metadata.
        let native = headers(&[("Head-Info", "v1"), ("Content-Type", "text/plain")]);
        let got = select_attrs(
            &["head-info".to_string(), "Content-Type".to_string()],
            &native,
            "x-amz-meta-",
        );
        assert_eq!(got["head-info"], "v1");
        assert_eq!(got["Content-Type"], "text/plain");
    }

    #[test]
    fn test_select_prefixed_fallback() {
        // OSS-style services store user metadata under x-oss-meta-.
        let native = headers(&[("x-oss-meta-compressor", "snappy")]);
        let got = select_attrs(&["Compressor".to_string()], &native, "x-oss-meta-");
        assert_eq!(got["Compressor"], "snappy");
    }

    #[test]
    fn test_select_absent_attrs_omitted() {
        let native = headers(&[("Content-Type", "text/plain")]);
        let got = select_attrs(
            &["Content-Type".to_string(), "Missing".to_string()],
            &native,
            "x-amz-meta-",
        );
        assert_eq!(got.len(), 1);
        assert!(!got.contains_key("Missing"));
    }

    #[test]
    fn test_lookup_attr() {
        let native = headers(&[("X-Oss-Meta-Author", "me")]);
        assert_eq!(lookup_attr("author", &native, "x-oss-meta-"), Some("me"));
        assert_eq!(lookup_attr("missing", &native, "x-oss-meta-"), None);
    }
}
