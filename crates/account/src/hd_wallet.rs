//! Mnemonic backed wallets.

use std::fmt;

use finschia_crypto::{hd, KeyError};
use tracing::info;
use zeroize::Zeroizing;

use crate::wallet::KeyWallet;

/// Holds a mnemonic and hands out [`KeyWallet`]s derived from it along
/// `m/44'/438'/account'/0/index`.
pub struct HdWallet {
    mnemonic: Zeroizing<String>,
}

impl HdWallet {
    /// Creates a wallet with a fresh 12-word mnemonic.
    pub fn create() -> Result<Self, KeyError> {
        let mnemonic = hd::generate_mnemonic()?;
        info!("created hd wallet");
        Ok(Self { mnemonic })
    }

    /// Restores a wallet from `mnemonic`.
    ///
    /// The phrase is used as given. Call [`hd::validate_mnemonic`] first to
    /// check it against the BIP-39 word list.
    pub fn from_mnemonic(mnemonic: impl Into<String>) -> Self {
        Self {
            mnemonic: Zeroizing::new(mnemonic.into()),
        }
    }

    /// The mnemonic phrase.
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Derives the wallet for `account` and `index`.
    pub fn key_wallet(&self, account: u32, index: u32) -> Result<KeyWallet, KeyError> {
        hd::derive_private_key(&self.mnemonic, account, index).map(KeyWallet::from_private_key)
    }
}

impl fmt::Debug for HdWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HdWallet").finish_non_exhaustive()
    }
}
