//! Wallets that sign with a single private key.

use std::{
    fs,
    io::{Read, Write},
    path::Path,
};

use finschia_crypto::{
    ecdsa::RECOVERABLE_SIGNATURE_LEN, EcdsaSigner, KeyError, KeyStore, PrivateKey,
};
use tracing::{debug, info};

use crate::{address::Address, config::SdkConfig, errors::ConfigError, pub_key::PubKey};

/// Something that owns a key and signs digests with it.
pub trait Wallet {
    /// The public key of the wallet.
    fn pub_key(&self) -> &PubKey;

    /// The address derived from [`Wallet::pub_key`].
    fn address(&self) -> &Address;

    /// Signs a 32-byte digest, returning `r || s || recovery_id`.
    fn sign(&self, digest: &[u8; 32]) -> Result<[u8; RECOVERABLE_SIGNATURE_LEN], KeyError>;

    /// The address in bech32 under the configured prefix.
    fn address_bech32(&self, config: &SdkConfig) -> Result<String, KeyError> {
        self.address().to_bech32(&config.bech32_hrp)
    }
}

/// A [`Wallet`] backed by one in-memory private key.
#[derive(Debug, Clone)]
pub struct KeyWallet {
    private_key: PrivateKey,
    pub_key: PubKey,
    address: Address,
}

impl KeyWallet {
    /// Creates a wallet around a freshly generated key.
    pub fn create() -> Self {
        let wallet = Self::from_private_key(PrivateKey::random());
        info!(address = %wallet.address, "created key wallet");
        wallet
    }

    /// Wraps an existing key.
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let pub_key = PubKey::from_private_key(&private_key);
        let address = Address::from_pub_key(&pub_key);
        Self {
            private_key,
            pub_key,
            address,
        }
    }

    /// Wraps a raw 32-byte key.
    pub fn from_private_key_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        PrivateKey::from_slice(bytes).map(Self::from_private_key)
    }

    /// Unlocks an armored keystore.
    pub fn load_from_keystore(keystore: &str, passphrase: &str) -> Result<Self, KeyError> {
        let private_key = KeyStore::load(keystore)?.private_key(passphrase)?;
        Ok(Self::from_private_key(private_key))
    }

    /// Reads and unlocks an armored keystore.
    pub fn load_from_keystore_reader<R: Read>(
        reader: R,
        passphrase: &str,
    ) -> Result<Self, KeyError> {
        let private_key = KeyStore::load_from_reader(reader)?.private_key(passphrase)?;
        Ok(Self::from_private_key(private_key))
    }

    /// Reads and unlocks the keystore file at `path`.
    pub fn load_keystore_file(
        path: impl AsRef<Path>,
        passphrase: &str,
    ) -> Result<Self, KeyError> {
        let path = path.as_ref();
        let wallet = Self::load_from_keystore_reader(fs::File::open(path)?, passphrase)?;
        debug!(path = %path.display(), address = %wallet.address, "loaded keystore file");
        Ok(wallet)
    }

    /// Encrypts the key under `passphrase` and returns the armored keystore.
    pub fn export_keystore(&self, passphrase: &str) -> Result<String, KeyError> {
        Ok(KeyStore::create_from_private_key(&self.private_key, passphrase)?.export())
    }

    /// Encrypts the key under `passphrase` and writes the armored keystore.
    pub fn export_keystore_to<W: Write>(
        &self,
        writer: W,
        passphrase: &str,
    ) -> Result<(), KeyError> {
        KeyStore::create_from_private_key(&self.private_key, passphrase)?.export_to(writer)
    }

    /// Encrypts the key and writes the keystore to `path`, replacing any
    /// existing file.
    pub fn save_keystore_file(
        &self,
        path: impl AsRef<Path>,
        passphrase: &str,
    ) -> Result<(), KeyError> {
        let path = path.as_ref();
        self.export_keystore_to(fs::File::create(path)?, passphrase)?;
        info!(path = %path.display(), address = %self.address, "saved keystore file");
        Ok(())
    }

    /// Saves the keystore to the configured `keystore_path`.
    pub fn save_to_configured_path(
        &self,
        config: &SdkConfig,
        passphrase: &str,
    ) -> Result<(), ConfigError> {
        Ok(self.save_keystore_file(config.keystore_path()?, passphrase)?)
    }

    /// Loads the keystore from the configured `keystore_path`.
    pub fn load_from_configured_path(
        config: &SdkConfig,
        passphrase: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self::load_keystore_file(config.keystore_path()?, passphrase)?)
    }

    /// The wallet's private key.
    pub const fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}

impl Wallet for KeyWallet {
    fn pub_key(&self) -> &PubKey {
        &self.pub_key
    }

    fn address(&self) -> &Address {
        &self.address
    }

    fn sign(&self, digest: &[u8; 32]) -> Result<[u8; RECOVERABLE_SIGNATURE_LEN], KeyError> {
        let signer = EcdsaSigner::new(&self.private_key);
        Ok(signer.sign_recoverable(digest)?.serialize())
    }
}
