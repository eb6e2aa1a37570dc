//! Passphrase protected storage for a single private key.
//!
//! A keystore holds the amino encoded private key sealed with
//! XSalsa20-Poly1305. The symmetric key is the SHA-256 of a bcrypt hash of the
//! passphrase, salted with 16 random bytes. The sealed bytes and the salt are
//! exchanged as an ASCII armored envelope, see [`armor`].

use std::io::{Read, Write};

use rand::{rngs::OsRng, RngCore};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::{
    amino,
    errors::KeyError,
    keys::{PrivateKey, PRIVATE_KEY_LEN},
};

pub mod armor;
mod cipher;
mod kdf;

pub use armor::{ArmorBuilder, BEGIN_LINE, END_LINE};
pub use kdf::{BCRYPT_COST, KDF_NAME, MAX_PASSPHRASE_LEN, SALT_LEN};

const KDF_HEADER: &str = "kdf";
const SALT_HEADER: &str = "salt";

/// An encrypted private key with the parameters needed to unlock it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStore {
    kdf: String,
    salt: Vec<u8>,
    armored_private_key: Vec<u8>,
}

impl KeyStore {
    fn new(kdf: String, salt: Vec<u8>, armored_private_key: Vec<u8>) -> Result<Self, KeyError> {
        if kdf != KDF_NAME {
            return Err(KeyError::UnsupportedKdf(kdf));
        }
        if salt.is_empty() {
            return Err(KeyError::InvalidSalt);
        }
        Ok(Self {
            kdf,
            salt,
            armored_private_key,
        })
    }

    /// Encrypts `key` under `passphrase` with a fresh salt and nonce.
    pub fn create_from_private_key(key: &PrivateKey, passphrase: &str) -> Result<Self, KeyError> {
        let mut salt = vec![0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let symmetric_key = kdf::derive_symmetric_key(passphrase, &salt)?;
        let encoded = Zeroizing::new(amino::add_prefix(
            amino::PRIV_KEY_SECP256K1,
            &key.to_bytes()[..],
        )?);
        let armored_private_key = cipher::seal(&symmetric_key, &encoded)?;

        info!(kdf = KDF_NAME, cost = BCRYPT_COST, "created keystore");
        Self::new(KDF_NAME.to_owned(), salt, armored_private_key)
    }

    /// Decrypts the private key.
    ///
    /// A wrong passphrase surfaces as [`KeyError::DecryptionFailed`], one
    /// longer than [`MAX_PASSPHRASE_LEN`] bytes as
    /// [`KeyError::PassphraseTooLong`].
    pub fn private_key(&self, passphrase: &str) -> Result<PrivateKey, KeyError> {
        let symmetric_key = kdf::derive_symmetric_key(passphrase, &self.salt)?;
        let decrypted = cipher::open(&symmetric_key, &self.armored_private_key)?;
        let body = amino::strip_prefix(amino::PRIV_KEY_SECP256K1, &decrypted, PRIVATE_KEY_LEN)?;

        debug!("unlocked keystore");
        PrivateKey::from_slice(body)
    }

    /// Name of the key derivation function, always `bcrypt`.
    pub fn kdf(&self) -> &str {
        &self.kdf
    }

    /// The bcrypt salt.
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Nonce and sealed box, as stored in the envelope body.
    pub fn armored_private_key(&self) -> &[u8] {
        &self.armored_private_key
    }

    /// Renders the armored envelope.
    pub fn export(&self) -> String {
        ArmorBuilder::new()
            .header(KDF_HEADER, self.kdf.as_str())
            .header(SALT_HEADER, hex::encode(&self.salt))
            .body(&self.armored_private_key)
            .finish()
    }

    /// Writes the armored envelope to `writer`.
    pub fn export_to<W: Write>(&self, mut writer: W) -> Result<(), KeyError> {
        writer.write_all(self.export().as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Parses an armored envelope.
    pub fn load(text: &str) -> Result<Self, KeyError> {
        let armor = armor::decode(text)?;

        let kdf = armor.headers.get(KDF_HEADER).cloned().unwrap_or_default();
        if kdf != KDF_NAME {
            return Err(KeyError::UnsupportedKdf(kdf));
        }

        let salt = armor
            .headers
            .get(SALT_HEADER)
            .filter(|salt| !salt.is_empty())
            .ok_or(KeyError::InvalidSalt)
            .and_then(|salt| hex::decode(salt).map_err(|_| KeyError::InvalidSalt))?;

        debug!(body_len = armor.body.len(), "loaded keystore");
        Self::new(kdf, salt, armor.body)
    }

    /// Reads and parses an armored envelope.
    pub fn load_from_reader<R: Read>(mut reader: R) -> Result<Self, KeyError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::load(&text)
    }
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use finschia_common::logging::LoggerConfig;

    use super::*;

    const TEST_KEYSTORE: &str = include_str!("../../test-data/keystore.txt");
    const INVALID_KDF_KEYSTORE: &str = include_str!("../../test-data/invalid_kdf_keystore.txt");
    const INVALID_SALT_KEYSTORE: &str = include_str!("../../test-data/invalid_salt_keystore.txt");
    const INVALID_ARMOR_KEYSTORE: &str =
        include_str!("../../test-data/invalid_armor_keystore.txt");

    const TEST_PRIVATE_KEY: &str = "M5AzgP8Ztnk5jGoNV9gZx7qUknHUV2BOjcoYGjkS7AI=";
    const TEST_PASSWORD: &str = "1234567890";
    const EXPECTED_SALT: &str = "72af54430d345eba1570952c04a561a7";
    const EXPECTED_ARMORED_PRIVATE_KEY: &str = "J4jSBlsjNAtJKsME1nFGIqvxID5jAsdPnZ2zWYYuTBpX4P8KGIfT\
                                                UqGj/6v+hjbFQQ+yOD8dF4OJbWGHp3ncOrgXitsZtQZ2m23CynA=";

    fn test_private_key() -> PrivateKey {
        PrivateKey::from_slice(&STANDARD.decode(TEST_PRIVATE_KEY).unwrap()).unwrap()
    }

    #[test]
    fn loads_reference_keystore() {
        finschia_common::logging::init(LoggerConfig::with_base_name("(keystore-test)"));

        let keystore = KeyStore::load(TEST_KEYSTORE).unwrap();

        assert_eq!(keystore.kdf(), KDF_NAME);
        assert_eq!(hex::encode(keystore.salt()), EXPECTED_SALT);
        assert_eq!(
            STANDARD.encode(keystore.armored_private_key()),
            EXPECTED_ARMORED_PRIVATE_KEY
        );

        let key = keystore.private_key(TEST_PASSWORD).unwrap();
        assert_eq!(STANDARD.encode(*key.to_bytes()), TEST_PRIVATE_KEY);
    }

    #[test]
    fn loads_from_reader() {
        let keystore = KeyStore::load_from_reader(TEST_KEYSTORE.as_bytes()).unwrap();

        assert_eq!(keystore, KeyStore::load(TEST_KEYSTORE).unwrap());
    }

    #[test]
    fn rejects_invalid_keystores() {
        assert!(matches!(
            KeyStore::load(INVALID_KDF_KEYSTORE),
            Err(KeyError::UnsupportedKdf(kdf)) if kdf == "scrypt"
        ));
        assert!(matches!(
            KeyStore::load(INVALID_SALT_KEYSTORE),
            Err(KeyError::InvalidSalt)
        ));
        assert!(matches!(
            KeyStore::load(INVALID_ARMOR_KEYSTORE),
            Err(KeyError::CorruptArmor(_))
        ));
    }

    #[test]
    fn missing_or_empty_salt_is_invalid() {
        let without_salt = ArmorBuilder::new()
            .header(KDF_HEADER, KDF_NAME)
            .body(&[1, 2, 3])
            .finish();
        let empty_salt = ArmorBuilder::new()
            .header(KDF_HEADER, KDF_NAME)
            .header(SALT_HEADER, "")
            .body(&[1, 2, 3])
            .finish();

        assert!(matches!(KeyStore::load(&without_salt), Err(KeyError::InvalidSalt)));
        assert!(matches!(KeyStore::load(&empty_salt), Err(KeyError::InvalidSalt)));
    }

    #[test]
    fn extra_headers_are_ignored() {
        let text = TEST_KEYSTORE.replace("kdf: bcrypt", "comment: exported\nkdf: bcrypt");

        assert_eq!(
            KeyStore::load(&text).unwrap(),
            KeyStore::load(TEST_KEYSTORE).unwrap()
        );
    }

    #[test]
    fn export_round_trips_through_text_and_writer() {
        let keystore = KeyStore::load(TEST_KEYSTORE).unwrap();

        let exported = keystore.export();
        assert!(exported.contains(&format!("salt: {EXPECTED_SALT}")));
        assert_eq!(KeyStore::load(&exported).unwrap(), keystore);

        let mut buf = Vec::new();
        keystore.export_to(&mut buf).unwrap();
        assert_eq!(KeyStore::load_from_reader(buf.as_slice()).unwrap(), keystore);
    }

    #[test]
    fn created_keystore_unlocks_only_with_its_passphrase() {
        let key = test_private_key();

        let keystore = KeyStore::create_from_private_key(&key, TEST_PASSWORD).unwrap();

        assert_eq!(keystore.kdf(), KDF_NAME);
        assert_eq!(keystore.salt().len(), SALT_LEN);
        // nonce + tag + amino prefix + key
        assert_eq!(keystore.armored_private_key().len(), 24 + 16 + 5 + 32);
        assert_eq!(keystore.private_key(TEST_PASSWORD).unwrap(), key);
        assert!(matches!(
            keystore.private_key("wrong password"),
            Err(KeyError::DecryptionFailed)
        ));
    }

    #[test]
    fn long_passphrases_are_refused_on_both_paths() {
        let key = test_private_key();
        let shared = "a".repeat(MAX_PASSPHRASE_LEN + 1);

        assert!(matches!(
            KeyStore::create_from_private_key(&key, &format!("{shared}secret-tail")),
            Err(KeyError::PassphraseTooLong(_))
        ));

        let keystore = KeyStore::load(TEST_KEYSTORE).unwrap();
        assert!(matches!(
            keystore.private_key(&format!("{TEST_PASSWORD}{shared}")),
            Err(KeyError::PassphraseTooLong(_))
        ));
    }
}
