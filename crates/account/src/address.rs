//! Account and validator addresses.

use std::{fmt, str::FromStr};

use finschia_crypto::{bech32, hash160, KeyError};

use crate::{
    key_type::{KeyType, DEFAULT_BECH32_HRP},
    pub_key::PubKey,
};

/// Length of an address body.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte address together with its kind.
///
/// Two addresses are equal when both kind and body match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    kind: KeyType,
    body: Vec<u8>,
}

impl Address {
    /// The empty address. It renders as an empty string in every encoding.
    pub const EMPTY: Self = Self {
        kind: KeyType::Account,
        body: Vec::new(),
    };

    /// Creates an account address from a raw body.
    pub fn from_body(body: &[u8]) -> Result<Self, KeyError> {
        Self::with_type(KeyType::Account, body)
    }

    /// Creates an address of the given kind from a raw body.
    pub fn with_type(kind: KeyType, body: &[u8]) -> Result<Self, KeyError> {
        if body.len() != ADDRESS_LEN {
            return Err(KeyError::InvalidLength {
                expected: "20 bytes",
                actual: body.len(),
            });
        }
        Ok(Self {
            kind,
            body: body.to_vec(),
        })
    }

    /// Derives the address of a public key. The kind follows the key.
    pub fn from_pub_key(pub_key: &PubKey) -> Self {
        Self {
            kind: pub_key.kind(),
            body: hash160(pub_key.body()).to_vec(),
        }
    }

    /// Parses a bech32 address whose prefix is `hrp` plus a kind suffix.
    pub fn from_bech32(text: &str, hrp: &str) -> Result<Self, KeyError> {
        let (found, body) = bech32::decode(text)?;
        let kind = found
            .strip_prefix(hrp)
            .and_then(KeyType::from_hrp_suffix)
            .ok_or_else(|| KeyError::InvalidHrp(found.clone()))?;
        Self::with_type(kind, &body)
    }

    /// Renders the address in bech32 under `hrp`.
    pub fn to_bech32(&self, hrp: &str) -> Result<String, KeyError> {
        if self.body.is_empty() {
            return Ok(String::new());
        }
        bech32::encode(&self.kind.hrp(hrp), &self.body)
    }

    /// Lowercase hex of the body.
    pub fn to_hex_string(&self) -> String {
        hex::encode(&self.body)
    }

    /// The address kind.
    pub const fn kind(&self) -> KeyType {
        self.kind
    }

    /// The raw body, empty only for [`Address::EMPTY`].
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Whether this is the empty address.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_bech32(DEFAULT_BECH32_HRP).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for Address {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s, DEFAULT_BECH32_HRP)
    }
}
