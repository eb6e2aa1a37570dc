//! Errors for SDK configuration.

use std::path::PathBuf;

use finschia_crypto::KeyError;
use thiserror::Error;

/// Error while loading or applying an [`SdkConfig`](crate::config::SdkConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying io error.
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The human readable part is not usable in bech32.
    #[error("invalid bech32 hrp `{0}`")]
    InvalidHrp(String),

    /// An operation needed `keystore_path` but it is not set.
    #[error("keystore_path is not configured")]
    MissingKeystorePath,

    /// A key operation failed.
    #[error(transparent)]
    Key(#[from] KeyError),
}
