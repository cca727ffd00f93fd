//! Error Types
//!
//! The reconciliation and sequencing core is infallible: a broken chart shows
//! up as missing or static visuals, never as an error value. Errors are only
//! produced at the edges, when parsing configuration, building cache keys or
//! constructing controls.

use thiserror::Error;

/// Errors produced by the configuration, cache and control layers.
#[derive(Debug, Error)]
pub enum Error {
    /// No node in the surface matches the given selector.
    #[error("no element matches selector `{0}`")]
    MissingElement(String),

    /// A slider was configured with an empty range or a non-positive step.
    #[error("invalid slider: {0}")]
    InvalidSlider(String),

    /// A duration was negative or not finite.
    #[error("invalid duration: {0} ms")]
    InvalidDuration(f64),

    /// The parameters of a cached computation could not be serialized.
    #[error("failed to build cache key: {0}")]
    CacheKey(serde_json::Error),

    /// A chart configuration document could not be parsed.
    #[error("invalid chart configuration: {0}")]
    Config(serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
