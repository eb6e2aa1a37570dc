//! Public keys in their bech32 and typed value forms.

use std::{fmt, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine};
use finschia_crypto::{
    amino::{self, PUB_KEY_SECP256K1},
    bech32,
    keys::COMPRESSED_PUBLIC_KEY_LEN,
    KeyError, PrivateKey,
};
use serde::{Deserialize, Serialize};

use crate::key_type::{KeyType, DEFAULT_BECH32_HRP};

/// Suffix that follows the kind suffix in a public key prefix.
pub const PUB_KEY_HRP_SUFFIX: &str = "pub";

/// A compressed secp256k1 public key together with its kind.
///
/// The bech32 form carries the amino prefixed key, e.g. `linkpub1addwnpep...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PubKey {
    kind: KeyType,
    body: Vec<u8>,
}

impl PubKey {
    /// The empty public key, which renders as an empty string.
    pub const EMPTY: Self = Self {
        kind: KeyType::Account,
        body: Vec::new(),
    };

    /// Wraps a 33-byte compressed key as an account key.
    pub fn from_body(body: &[u8]) -> Result<Self, KeyError> {
        Self::with_type(KeyType::Account, body)
    }

    /// Wraps a 33-byte compressed key of the given kind.
    pub fn with_type(kind: KeyType, body: &[u8]) -> Result<Self, KeyError> {
        if body.len() != COMPRESSED_PUBLIC_KEY_LEN {
            return Err(KeyError::InvalidLength {
                expected: "33 bytes",
                actual: body.len(),
            });
        }
        Ok(Self {
            kind,
            body: body.to_vec(),
        })
    }

    /// The account public key of `key`.
    pub fn from_private_key(key: &PrivateKey) -> Self {
        Self {
            kind: KeyType::Account,
            body: key.compressed_public_key().to_vec(),
        }
    }

    /// Parses a bech32 public key whose prefix is `hrp`, a kind suffix and
    /// `pub`.
    pub fn from_bech32(text: &str, hrp: &str) -> Result<Self, KeyError> {
        let (found, data) = bech32::decode(text)?;
        let kind = found
            .strip_prefix(hrp)
            .and_then(|rest| rest.strip_suffix(PUB_KEY_HRP_SUFFIX))
            .and_then(KeyType::from_hrp_suffix)
            .ok_or_else(|| KeyError::InvalidHrp(found.clone()))?;

        let body = amino::strip_prefix(PUB_KEY_SECP256K1, &data, COMPRESSED_PUBLIC_KEY_LEN)?;
        Self::with_type(kind, body)
    }

    /// Renders the amino prefixed key in bech32 under `hrp`.
    pub fn to_bech32(&self, hrp: &str) -> Result<String, KeyError> {
        if self.body.is_empty() {
            return Ok(String::new());
        }
        let encoded = amino::add_prefix(PUB_KEY_SECP256K1, &self.body)?;
        bech32::encode(
            &format!("{}{PUB_KEY_HRP_SUFFIX}", self.kind.hrp(hrp)),
            &encoded,
        )
    }

    /// Lowercase hex of the compressed key.
    pub fn to_hex_string(&self) -> String {
        hex::encode(&self.body)
    }

    /// The `{type, value}` pair used when embedding the key in transactions.
    pub fn as_typed_value(&self) -> TypedValue {
        TypedValue {
            type_name: PUB_KEY_SECP256K1.to_owned(),
            value: STANDARD.encode(&self.body),
        }
    }

    /// The key kind.
    pub const fn kind(&self) -> KeyType {
        self.kind
    }

    /// The compressed key bytes, empty only for [`PubKey::EMPTY`].
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl Default for PubKey {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_bech32(DEFAULT_BECH32_HRP).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for PubKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s, DEFAULT_BECH32_HRP)
    }
}

/// A value tagged with its registered type name, base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedValue {
    /// Registered type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Base64 of the raw value.
    pub value: String,
}
