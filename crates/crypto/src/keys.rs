//! secp256k1 private keys and the public key encodings derived from them.

use std::fmt;

use bitcoin::hashes::{hash160, Hash};
use rand::rngs::OsRng;
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use zeroize::Zeroizing;

use crate::errors::KeyError;

/// Length of a serialized private key.
pub const PRIVATE_KEY_LEN: usize = 32;

/// Length of a compressed SEC1 public key.
pub const COMPRESSED_PUBLIC_KEY_LEN: usize = 33;

/// Length of an uncompressed SEC1 public key.
pub const UNCOMPRESSED_PUBLIC_KEY_LEN: usize = 65;

/// A secp256k1 private key.
///
/// The scalar is always in `[1, n - 1]`. The key is erased when dropped and
/// never printed by its [`Debug`](fmt::Debug) implementation.
#[derive(PartialEq, Eq)]
pub struct PrivateKey(SecretKey);

impl PrivateKey {
    /// Parses a 32-byte big-endian scalar.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(KeyError::invalid_length("32 bytes", bytes.len()));
        }
        SecretKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| KeyError::InvalidPrivateKey)
    }

    /// Creates a fresh key from the operating system's random source.
    pub fn random() -> Self {
        Self(SecretKey::new(&mut OsRng))
    }

    pub(crate) const fn from_secret_key(secret: SecretKey) -> Self {
        Self(secret)
    }

    pub(crate) const fn secret_key(&self) -> &SecretKey {
        &self.0
    }

    /// Returns the raw scalar in a buffer that is wiped when dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; PRIVATE_KEY_LEN]> {
        Zeroizing::new(self.0.secret_bytes())
    }

    /// The public point for this key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(SECP256K1, &self.0)
    }

    /// The 33-byte compressed public key.
    pub fn compressed_public_key(&self) -> [u8; COMPRESSED_PUBLIC_KEY_LEN] {
        self.public_key().serialize()
    }

    /// The 65-byte uncompressed public key, `0x04 || x || y`.
    pub fn uncompressed_public_key(&self) -> [u8; UNCOMPRESSED_PUBLIC_KEY_LEN] {
        self.public_key().serialize_uncompressed()
    }
}

impl Clone for PrivateKey {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        // NOTE: `non_secure_erase` overwrites the scalar with a constant, the
        // best the secp256k1 type allows.
        self.0.non_secure_erase();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Converts a compressed or uncompressed SEC1 encoding to the compressed form.
pub fn compress_public_key(bytes: &[u8]) -> Result<[u8; COMPRESSED_PUBLIC_KEY_LEN], KeyError> {
    match bytes.len() {
        COMPRESSED_PUBLIC_KEY_LEN | UNCOMPRESSED_PUBLIC_KEY_LEN => PublicKey::from_slice(bytes)
            .map(|pk| pk.serialize())
            .map_err(|_| KeyError::InvalidPublicKey),
        len => Err(KeyError::invalid_length("33 or 65 bytes", len)),
    }
}

/// RIPEMD-160 of SHA-256, the digest used for address bodies.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    hash160::Hash::hash(data).to_byte_array()
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::STANDARD, Engine};

    use super::*;

    const TEST_PRIVATE_KEY: &str = "M5AzgP8Ztnk5jGoNV9gZx7qUknHUV2BOjcoYGjkS7AI=";

    fn test_key() -> PrivateKey {
        PrivateKey::from_slice(&STANDARD.decode(TEST_PRIVATE_KEY).unwrap()).unwrap()
    }

    #[test]
    fn derives_known_public_keys() {
        let key = test_key();

        assert_eq!(
            hex::encode(key.compressed_public_key()),
            "026ec1fc1656f38b4165ad33f7a20811796d8a2995d8af27a7b274b96a814be29f"
        );
        assert_eq!(
            STANDARD.encode(key.uncompressed_public_key()),
            "BG7B/BZW84tBZa0z96IIEXltiimV2K8np7J0uWqBS+KfhIyHaVGUTcZUCaLPqwXR1aFPcDYaAfMmzq+w0kDyNkY="
        );
    }

    #[test]
    fn hash160_of_compressed_key_is_address_body() {
        let key = test_key();

        assert_eq!(
            hex::encode(hash160(&key.compressed_public_key())),
            "56d0bf80403dd6bab75bdfc94543676aa2fc25cb"
        );
    }

    #[test]
    fn rejects_bad_scalars() {
        assert!(matches!(
            PrivateKey::from_slice(&[1u8; 31]),
            Err(KeyError::InvalidLength { actual: 31, .. })
        ));
        assert!(matches!(
            PrivateKey::from_slice(&[0u8; 32]),
            Err(KeyError::InvalidPrivateKey)
        ));
        assert!(matches!(
            PrivateKey::from_slice(&[0xffu8; 32]),
            Err(KeyError::InvalidPrivateKey)
        ));
    }

    #[test]
    fn random_keys_differ() {
        assert_ne!(*PrivateKey::random().to_bytes(), *PrivateKey::random().to_bytes());
    }

    #[test]
    fn debug_output_hides_the_scalar() {
        let printed = format!("{:?}", test_key());

        assert_eq!(printed, "PrivateKey(<redacted>)");
    }

    #[test]
    fn compresses_uncompressed_keys() {
        let key = test_key();

        assert_eq!(
            compress_public_key(&key.uncompressed_public_key()).unwrap(),
            key.compressed_public_key()
        );
    }
}
