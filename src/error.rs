//! Crate-level error types.
//!
//! Synchronization itself never fails towards its callers. These types
//! describe the anomalies that are logged and absorbed along the way, plus
//! the one fallible setup call.

use crate::bridge::Channel;

/// A push payload that could not be decoded into the expected shape.
///
/// Raised inside the listener handlers, logged, and dropped. The
/// collection is left untouched.
#[derive(Debug, thiserror::Error)]
#[error("malformed payload on {channel}: {source}")]
pub struct PayloadError {
    /// The channel the payload arrived on.
    pub channel: Channel,
    /// The underlying decode error.
    #[source]
    pub source: serde_json::Error,
}

/// Error returned when opening a registry fails.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The builder was opened without a host environment.
    #[error("registry builder requires a host")]
    MissingHost,

}
