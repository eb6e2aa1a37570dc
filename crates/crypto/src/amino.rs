//! Amino type prefixes.
//!
//! An amino prefix is a 4-byte tag derived from the SHA-256 of a registered
//! type name, followed by the varint length of the body it precedes.

use sha2::{Digest, Sha256};

use crate::errors::KeyError;

/// Type name registered for compressed secp256k1 public keys.
pub const PUB_KEY_SECP256K1: &str = "tendermint/PubKeySecp256k1";

/// Type name registered for secp256k1 private keys.
pub const PRIV_KEY_SECP256K1: &str = "tendermint/PrivKeySecp256k1";

/// Length of a prefix: four tag bytes plus a one byte length.
pub const PREFIX_LEN: usize = 5;

/// Longest body a single byte length can describe here.
pub const MAX_BODY_LEN: usize = 33;

/// Computes the 4-byte type tag for `type_name`.
///
/// The tag starts at the first non-zero byte found after skipping the leading
/// zero bytes of the digest and three further bytes.
pub fn type_tag(type_name: &str) -> Result<[u8; 4], KeyError> {
    let digest = Sha256::digest(type_name.as_bytes());

    let first = first_non_zero(&digest, 0).ok_or(KeyError::EmptyHash)?;
    let start = first_non_zero(&digest, first + 3).ok_or(KeyError::EmptyHash)?;

    digest
        .get(start..start + 4)
        .and_then(|tag| <[u8; 4]>::try_from(tag).ok())
        .ok_or(KeyError::EmptyHash)
}

/// Computes the full prefix for `body`.
pub fn prefix(type_name: &str, body: &[u8]) -> Result<[u8; PREFIX_LEN], KeyError> {
    prefix_for_len(type_name, body.len())
}

fn prefix_for_len(type_name: &str, body_len: usize) -> Result<[u8; PREFIX_LEN], KeyError> {
    if body_len > MAX_BODY_LEN {
        return Err(KeyError::UnsupportedBodyLength(body_len));
    }

    let tag = type_tag(type_name)?;
    let mut out = [0u8; PREFIX_LEN];
    out[..4].copy_from_slice(&tag);
    // Lengths up to 127 encode to a single LEB128 byte.
    out[4] = body_len as u8;
    Ok(out)
}

/// Returns `prefix(type_name, body) || body`.
pub fn add_prefix(type_name: &str, body: &[u8]) -> Result<Vec<u8>, KeyError> {
    let prefix = prefix(type_name, body)?;
    let mut out = Vec::with_capacity(PREFIX_LEN + body.len());
    out.extend_from_slice(&prefix);
    out.extend_from_slice(body);
    Ok(out)
}

/// Drops the first [`PREFIX_LEN`] bytes without checking them.
pub fn remove_prefix(bytes: &[u8]) -> Result<&[u8], KeyError> {
    bytes
        .get(PREFIX_LEN..)
        .ok_or(KeyError::invalid_length("at least 5 bytes", bytes.len()))
}

/// Verifies that `bytes` is a `type_name` prefix followed by exactly
/// `body_len` bytes and returns the body.
pub fn strip_prefix<'a>(
    type_name: &str,
    bytes: &'a [u8],
    body_len: usize,
) -> Result<&'a [u8], KeyError> {
    if bytes.len() != PREFIX_LEN + body_len {
        return Err(KeyError::invalid_length("prefix plus body", bytes.len()));
    }

    let expected = prefix_for_len(type_name, body_len)?;
    if bytes[..PREFIX_LEN] != expected {
        return Err(KeyError::AminoPrefixMismatch);
    }

    Ok(&bytes[PREFIX_LEN..])
}

fn first_non_zero(bytes: &[u8], from: usize) -> Option<usize> {
    bytes
        .iter()
        .enumerate()
        .skip(from)
        .find_map(|(i, b)| (*b != 0).then_some(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pub_key_prefix_matches_registered_value() {
        assert_eq!(hex::encode(prefix(PUB_KEY_SECP256K1, &[0u8; 33]).unwrap()), "eb5ae98721");
        assert_eq!(hex::encode(prefix(PUB_KEY_SECP256K1, &[]).unwrap()), "eb5ae98700");
    }

    #[test]
    fn priv_key_tag_matches_registered_value() {
        assert_eq!(hex::encode(type_tag(PRIV_KEY_SECP256K1).unwrap()), "e1b0f79b");
        assert_eq!(hex::encode(prefix(PRIV_KEY_SECP256K1, &[1u8; 32]).unwrap()), "e1b0f79b20");
    }

    #[test]
    fn prefix_is_added_in_front_of_body() {
        let body = [7u8; 33];
        let prefixed = add_prefix(PUB_KEY_SECP256K1, &body).unwrap();

        assert_eq!(&prefixed[..5], &hex::decode("eb5ae98721").unwrap()[..]);
        assert_eq!(&prefixed[5..], &body[..]);
        assert_eq!(remove_prefix(&prefixed).unwrap(), &body[..]);
        assert_eq!(strip_prefix(PUB_KEY_SECP256K1, &prefixed, 33).unwrap(), &body[..]);
    }

    #[test]
    fn long_bodies_are_rejected() {
        assert!(matches!(
            add_prefix(PUB_KEY_SECP256K1, &[0u8; 34]),
            Err(KeyError::UnsupportedBodyLength(34))
        ));
    }

    #[test]
    fn short_input_cannot_lose_its_prefix() {
        assert!(matches!(
            remove_prefix(&[0xeb, 0x5a, 0xe9, 0x87]),
            Err(KeyError::InvalidLength { actual: 4, .. })
        ));
    }

    #[test]
    fn foreign_prefix_is_detected() {
        let prefixed = add_prefix(PRIV_KEY_SECP256K1, &[1u8; 33]).unwrap();

        assert!(matches!(
            strip_prefix(PUB_KEY_SECP256K1, &prefixed, 33),
            Err(KeyError::AminoPrefixMismatch)
        ));
    }
}
