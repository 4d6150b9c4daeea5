//! Per-call options for the capability surface.
//!
//! Every struct here is plain data with a `Default` and chainable setters,
//! so call sites read as `PutOptions::new().content_type("text/plain")`.

/// Options for the Get family of operations.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Override the `Content-Type` of the response (signed request parameter
    /// on backends that support it).
    pub content_type: Option<String>,
    /// Override the `Content-Encoding` of the response.
    pub content_encoding: Option<String>,
    /// Validate the body against the server-reported CRC64 checksum, on
    /// backends that report one.
    pub enable_crc_validation: bool,
}

impl GetOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn content_type(mut self, v: impl Into<String>) -> Self {
        self.content_type = Some(v.into());
        self
    }

    #[must_use]
    pub fn content_encoding(mut self, v: impl Into<String>) -> Self {
        self.content_encoding = Some(v.into());
        self
    }

    #[must_use]
    pub fn enable_crc_validation(mut self) -> Self {
        self.enable_crc_validation = true;
        self
    }
}

/// Options for Put and PutAndCompress.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub content_disposition: Option<String>,
    pub cache_control: Option<String>,
    /// `Expires` header value.
    pub expires: Option<String>,
}

impl PutOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn content_type(mut self, v: impl Into<String>) -> Self {
        self.content_type = Some(v.into());
        self
    }

    #[must_use]
    pub fn content_encoding(mut self, v: impl Into<String>) -> Self {
        self.content_encoding = Some(v.into());
        self
    }

    #[must_use]
    pub fn content_disposition(mut self, v: impl Into<String>) -> Self {
        self.content_disposition = Some(v.into());
        self
    }

    #[must_use]
    pub fn cache_control(mut self, v: impl Into<String>) -> Self {
        self.cache_control = Some(v.into());
        self
    }

    #[must_use]
    pub fn expires(mut self, v: impl Into<String>) -> Self {
        self.expires = Some(v.into());
        self
    }
}

/// Options for SignURL.
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    /// Server-side processing parameter (`x-oss-process`), OSS only.
    pub process: Option<String>,
}

impl SignOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn process(mut self, v: impl Into<String>) -> Self {
        self.process = Some(v.into());
        self
    }
}

/// Options for Copy.
#[derive(Debug, Clone, Default)]
pub struct CopyOptions {
    /// Replicate the source object's user metadata onto the destination.
    pub copy_meta: bool,
    /// Metadata attribute names to replicate when `copy_meta` is set. The
    /// source `Content-Encoding` is always carried forward in addition.
    pub meta_keys: Vec<String>,
    /// Treat the source key as a raw `/bucket/key` path, bypassing routing.
    pub raw_src_key: bool,
}

impl CopyOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn copy_meta(mut self, keys: Vec<String>) -> Self {
        self.copy_meta = true;
        self.meta_keys = keys;
        self
    }

    #[must_use]
    pub fn raw_src_key(mut self) -> Self {
        self.raw_src_key = true;
        self
    }
}
