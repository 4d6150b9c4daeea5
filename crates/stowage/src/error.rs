//! Error types for stowage.

use thiserror::Error;

/// Result type alias for stowage operations.
pub type Result<T> = std::result::Result<T, StowageError>;

/// Errors that can occur in stowage operations.
///
/// A missing object is never an error: the read-path operations return
/// `Ok(None)` (or `Ok(false)` for `exists`) when the backend reports that
/// the key does not exist.
#[derive(Error, Debug)]
pub enum StowageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shard table lookup failed for a key, or the key was empty
    #[error("routing error: {0}")]
    Routing(String),

    /// Deployment misconfiguration, fatal at construction time
    #[error("configuration error: {0}")]
    Config(String),

    /// Network or backend-side failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Caller supplied an argument outside the operation's contract
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Object metadata names a codec this build does not know
    #[error("unsupported compression codec: {0}")]
    UnsupportedCodec(String),

    /// Compression error
    #[error("compression error: {0}")]
    Compression(String),

    /// Decompression error
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Body checksum did not match the server-reported CRC64
    #[error("crc64 mismatch: server {server}, client {client}")]
    ChecksumMismatch { server: u64, client: u64 },

    /// Operation has no meaning for this backend
    #[error("{0} is not supported by this backend")]
    Unsupported(&'static str),

    /// Multi-delete partially failed; every failed key is listed
    #[error("multi-delete failed for {} key(s): {}", .0.len(), format_failures(.0))]
    MultiDelete(Vec<(String, String)>),
}

fn format_failures(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(key, reason)| format!("{key}: {reason}"))
        .collect::<Vec<_>>()
        .join("; ")
}
