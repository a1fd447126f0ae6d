// src/error.rs
// Error taxonomy shared across the correlation substrate.

use thiserror::Error;

/// Error kinds surfaced by Ricochet's core components.
///
/// This is a taxonomy of *kinds*, not a one-variant-per-failure-site
/// enumeration: callers match on these to decide retry/propagate/log
/// behavior per the contracts in the component design (rate limiter,
/// store, injector, callback servers, poller).
#[derive(Debug, Error)]
pub enum RicochetError {
    /// A constructor argument violates a precondition (rate <= 0, burst < 1,
    /// malformed correlation ID supplied by a caller, missing Host header).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The persistence layer could not service a request (I/O, corruption,
    /// lock contention beyond the conservative threshold).
    #[error("storage error: {0}")]
    StorageError(String),

    /// An injection insert was attempted with a pre-existing correlation ID.
    #[error("duplicate injection id: {0}")]
    DuplicateId(String),

    /// A network operation exceeded its deadline.
    #[error("timeout: {0}")]
    TimeoutError(String),

    /// A network operation failed before a deadline (DNS resolution,
    /// connection refused, TLS handshake failure).
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// An external request parser produced something unusable.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A DNS packet or callback request was too short or structurally
    /// invalid. Callers at the server layer log and drop; this variant
    /// exists so the parsing functions themselves stay pure.
    #[error("parse error: {0}")]
    ParseError(String),
}

pub type RicochetResult<T> = Result<T, RicochetError>;

impl From<sqlx::Error> for RicochetError {
    fn from(e: sqlx::Error) -> Self {
        RicochetError::StorageError(e.to_string())
    }
}

impl From<reqwest::Error> for RicochetError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RicochetError::TimeoutError(e.to_string())
        } else if e.is_connect() {
            RicochetError::ConnectionError(e.to_string())
        } else {
            RicochetError::ConnectionError(e.to_string())
        }
    }
}
