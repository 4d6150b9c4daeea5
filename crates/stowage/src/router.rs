//! Key routing: prefix injection and shard selection.
//!
//! A router maps a logical key to a physical `(bucket, key)` pair. The
//! physical key is the configured prefix plus the logical key. When shards
//! are configured, the bucket is chosen by the lowercased last character of
//! the physical key: each shard string expands to one table entry per
//! character, all pointing at `"{bucket}-{shard}"`.

use std::collections::HashMap;

use crate::error::{Result, StowageError};

/// Physical destination of a logical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    pub bucket: String,
    pub key: String,
}

/// Immutable key router, built once per backend client.
#[derive(Debug, Clone)]
pub struct KeyRouter {
    bucket: String,
    prefix: String,
    shard_table: HashMap<char, String>,
}

impl KeyRouter {
    /// Build a router.
    ///
    /// The prefix is normalized to either the empty string or a string with
    /// no leading slash and exactly one trailing slash. Shard strings must
    /// cover disjoint character sets; an overlap is a configuration error.
    pub fn new(bucket: &str, prefix: &str, shards: &[String]) -> Result<Self> {
        let trimmed = prefix.trim_matches('/');
        let prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}/")
        };

        let mut shard_table = HashMap::new();
        for shard in shards {
            let shard_bucket = format!("{bucket}-{shard}");
            for ch in shard.chars() {
                let ch = ch.to_ascii_lowercase();
                if let Some(previous) = shard_table.insert(ch, shard_bucket.clone()) {
                    return Err(StowageError::Config(format!(
                        "shard character {ch:?} appears in both {previous:?} and {shard_bucket:?}"
                    )));
                }
            }
        }

        Ok(Self {
            bucket: bucket.to_string(),
            prefix,
            shard_table,
        })
    }

    /// All physical buckets this router can route to.
    #[must_use]
    pub fn buckets(&self) -> Vec<String> {
        if self.shard_table.is_empty() {
            return vec![self.bucket.clone()];
        }
        let mut buckets: Vec<String> = self.shard_table.values().cloned().collect();
        buckets.sort();
        buckets.dedup();
        buckets
    }

    /// Physical key for a logical key.
    #[must_use]
    pub fn physical_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Resolve a logical key to its physical bucket and key.
    pub fn route(&self, key: &str) -> Result<Routed> {
        let physical = self.physical_key(key);
        let bucket = self.bucket_for(&physical)?;
        Ok(Routed {
            bucket,
            key: physical,
        })
    }

    /// Physical bucket for a logical key.
    pub fn bucket_name(&self, key: &str) -> Result<String> {
        self.bucket_for(&self.physical_key(key))
    }

    fn bucket_for(&self, physical_key: &str) -> Result<String> {
        if self.shard_table.is_empty() {
            return Ok(self.bucket.clone());
        }
        let last = physical_key
            .chars()
            .next_back()
            .ok_or_else(|| StowageError::Routing("empty object key".to_string()))?;
        self.shard_table
            .get(&last.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| {
                StowageError::Routing(format!("shards can't find bucket for key {physical_key:?}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shards() -> Vec<String> {
        vec![
            "abcdefghijklmnopqr".to_string(),
            "stuvwxyz0123456789".to_string(),
        ]
    }

    #[test]
    fn test_route_no_shards() {
        let router = KeyRouter::new("content", "blobs", &[]).unwrap();
        let routed = router.route("file.txt").unwrap();
        assert_eq!(routed.bucket, "content");
        assert_eq!(routed.key, "blobs/file.txt");
    }

    #[test]
    fn test_shard_determinism() {
        let router = KeyRouter::new("B", "", &shards()).unwrap();

        let routed = router.route("user-r").unwrap();
        assert_eq!(routed.bucket, "B-abcdefghijklmnopqr");

        let routed = router.route("metric-9").unwrap();
        assert_eq!(routed.bucket, "B-stuvwxyz0123456789");

        // Same final character always lands in the same bucket.
        assert_eq!(
            router.bucket_name("a/b/c/ends-in-r").unwrap(),
            router.bucket_name("other-r").unwrap()
        );
    }

    #[test]
    fn test_shard_case_insensitive() {
        let router = KeyRouter::new("B", "", &shards()).unwrap();
        assert_eq!(
            router.bucket_name("KEY-R").unwrap(),
            router.bucket_name("key-r").unwrap()
        );
    }

    #[test]
    fn test_shard_miss_is_routing_error() {
        let router = KeyRouter::new("B", "", &shards()).unwrap();
        let result = router.route("weird-key-#");
        assert!(matches!(result, Err(StowageError::Routing(_))));
    }

    #[test]
    fn test_empty_key_is_routing_error() {
        let router = KeyRouter::new("B", "", &shards()).unwrap();
        assert!(matches!(router.route(""), Err(StowageError::Routing(_))));
    }

    #[test]
    fn test_prefix_normalization() {
        let router = KeyRouter::new("B", "/nested/dir/", &[]).unwrap();
        assert_eq!(router.physical_key("k"), "nested/dir/k");

        let router = KeyRouter::new("B", "", &[]).unwrap();
        assert_eq!(router.physical_key("k"), "k");
    }

    #[test]
    fn test_bucket_enumeration() {
        let router = KeyRouter::new("B", "", &shards()).unwrap();
        assert_eq!(
            router.buckets(),
            vec![
                "B-abcdefghijklmnopqr".to_string(),
                "B-stuvwxyz0123456789".to_string()
            ]
        );

        let router = KeyRouter::new("single", "", &[]).unwrap();
        assert_eq!(router.buckets(), vec!["single".to_string()]);
    }

    #[test]
    fn test_overlapping_shards_rejected() {
        let overlapping = vec!["abc".to_string(), "cde".to_string()];
        let result = KeyRouter::new("B", "", &overlapping);
        assert!(matches!(result, Err(StowageError::Config(_))));
    }

    #[test]
    fn test_prefix_affects_shard_choice() {
        // Routing uses the last character of the physical key, so a key
        // ending in a prefix-covered char still routes by its own last char.
        let router = KeyRouter::new("B", "p", &shards()).unwrap();
        assert_eq!(
            router.route("x").unwrap().bucket,
            "B-stuvwxyz0123456789"
        );
    }
}
