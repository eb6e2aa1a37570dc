//! Passphrase to symmetric key derivation.

use bcrypt::Version;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::errors::KeyError;

/// Work factor used for every keystore.
pub const BCRYPT_COST: u32 = 12;

/// Salt length bcrypt requires.
pub const SALT_LEN: usize = 16;

/// Name written to the `kdf` header.
pub const KDF_NAME: &str = "bcrypt";

/// Longest passphrase bcrypt hashes without truncation.
pub const MAX_PASSPHRASE_LEN: usize = 71;

/// Derives the 32-byte secretbox key for `passphrase` and `salt`.
///
/// The key is the SHA-256 of the complete `$2a$12$...` bcrypt string, which
/// is what other implementations of this keystore format produce. Passphrases
/// longer than [`MAX_PASSPHRASE_LEN`] bytes are rejected. bcrypt reads at most
/// 72 bytes, NUL terminator included.
pub(crate) fn derive_symmetric_key(
    passphrase: &str,
    salt: &[u8],
) -> Result<Zeroizing<[u8; 32]>, KeyError> {
    if passphrase.len() > MAX_PASSPHRASE_LEN {
        return Err(KeyError::PassphraseTooLong(passphrase.len()));
    }
    let salt: [u8; SALT_LEN] = salt.try_into().map_err(|_| KeyError::InvalidSalt)?;

    let parts = bcrypt::hash_with_salt(passphrase, BCRYPT_COST, salt)
        .map_err(|e| KeyError::KdfFailure(e.to_string()))?;
    let hashed = Zeroizing::new(parts.format_for_version(Version::TwoA));

    Ok(Zeroizing::new(Sha256::digest(hashed.as_bytes()).into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_derive_same_key() {
        let salt = [9u8; SALT_LEN];

        let first = derive_symmetric_key("passphrase", &salt).unwrap();
        let second = derive_symmetric_key("passphrase", &salt).unwrap();
        let other = derive_symmetric_key("passphrase!", &salt).unwrap();

        assert_eq!(*first, *second);
        assert_ne!(*first, *other);
    }

    #[test]
    fn passphrases_past_bcrypt_input_are_rejected() {
        let salt = [9u8; SALT_LEN];
        let longest = "a".repeat(MAX_PASSPHRASE_LEN);

        assert!(derive_symmetric_key(&longest, &salt).is_ok());
        assert!(matches!(
            derive_symmetric_key(&format!("{longest}b"), &salt),
            Err(KeyError::PassphraseTooLong(72))
        ));
    }

    #[test]
    fn salt_must_be_sixteen_bytes() {
        assert!(matches!(
            derive_symmetric_key("passphrase", &[1u8; 15]),
            Err(KeyError::InvalidSalt)
        ));
    }
}
