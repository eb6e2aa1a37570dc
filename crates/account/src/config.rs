//! SDK configuration loaded from TOML.
//!
//! ```toml
//! bech32_hrp = "tlink"
//! keystore_path = "/var/lib/wallet/keystore.txt"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{errors::ConfigError, key_type::DEFAULT_BECH32_HRP};

/// Settings shared by the wallet helpers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SdkConfig {
    /// Base human readable part for addresses and public keys.
    pub bech32_hrp: String,

    /// Where the wallet keystore is saved and loaded.
    pub keystore_path: Option<PathBuf>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            bech32_hrp: DEFAULT_BECH32_HRP.to_owned(),
            keystore_path: None,
        }
    }
}

impl SdkConfig {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), hrp = %config.bech32_hrp, "loaded sdk config");
        Ok(config)
    }

    /// The configured keystore location.
    pub fn keystore_path(&self) -> Result<&Path, ConfigError> {
        self.keystore_path
            .as_deref()
            .ok_or(ConfigError::MissingKeystorePath)
    }

    /// Checks that the prefix is non-empty lowercase printable ASCII without
    /// the `1` separator.
    fn validate(&self) -> Result<(), ConfigError> {
        let hrp = &self.bech32_hrp;
        let valid = !hrp.is_empty()
            && hrp
                .bytes()
                .all(|b| (33..=126).contains(&b) && !b.is_ascii_uppercase() && b != b'1');
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidHrp(hrp.clone()))
        }
    }
}
