//! BIP-32/39/44 hierarchical deterministic key derivation.
//!
//! Keys live at `m/44'/438'/account'/0/index`.
//!
//! ```text
//! Mnemonic (12 or 24 words)
//! └── seed: PBKDF2-HMAC-SHA512("mnemonic", 2048 rounds)
//!     └── m ─── BIP-32 master key
//!         └── m/44'/438'/account'/0/index ─── account key
//! ```

use bip39::{Language, Mnemonic};
use bitcoin::{
    bip32::{ChainCode, ChildNumber, Xpriv},
    NetworkKind,
};
use hmac::Hmac;
use rand::{rngs::OsRng, RngCore};
use secp256k1::SECP256K1;
use sha2::Sha512;
use tracing::debug;
use zeroize::Zeroizing;

use crate::{errors::KeyError, keys::PrivateKey};

/// BIP-44 purpose.
pub const PURPOSE: u32 = 44;

/// Registered coin type of the chain.
pub const COIN_TYPE: u32 = 438;

/// Entropy for freshly generated mnemonics, giving 12 words.
pub const MNEMONIC_ENTROPY_LEN: usize = 16;

/// Length of the seed produced from a mnemonic.
pub const SEED_LEN: usize = 64;

const SEED_SALT: &[u8] = b"mnemonic";
const SEED_ROUNDS: u32 = 2048;

/// Generates a new 12-word English mnemonic from OS randomness.
pub fn generate_mnemonic() -> Result<Zeroizing<String>, KeyError> {
    let mut entropy = Zeroizing::new([0u8; MNEMONIC_ENTROPY_LEN]);
    OsRng.fill_bytes(&mut entropy[..]);

    let mnemonic = Mnemonic::from_entropy(&entropy[..])
        .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;

    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// Checks the word list membership and checksum of an English mnemonic.
pub fn validate_mnemonic(phrase: &str) -> Result<(), KeyError> {
    Mnemonic::parse_in_normalized(Language::English, phrase)
        .map(|_| ())
        .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))
}

/// Stretches a mnemonic into a 64-byte seed with an empty passphrase.
///
/// The phrase is not validated, any text yields a seed. Use
/// [`validate_mnemonic`] first when the input comes from a user.
pub fn mnemonic_to_seed(phrase: &str) -> Result<Zeroizing<[u8; SEED_LEN]>, KeyError> {
    let mut seed = Zeroizing::new([0u8; SEED_LEN]);
    pbkdf2::pbkdf2::<Hmac<Sha512>>(phrase.as_bytes(), SEED_SALT, SEED_ROUNDS, &mut seed[..])
        .map_err(|e| KeyError::KdfFailure(e.to_string()))?;
    Ok(seed)
}

/// Creates the BIP-32 master key for `seed`.
pub fn derive_master_key(seed: &[u8]) -> Result<Xpriv, KeyError> {
    if seed.is_empty() {
        return Err(KeyError::InvalidSeed);
    }
    Ok(Xpriv::new_master(NetworkKind::Main, seed)?)
}

/// Builds `m/44'/438'/account'/0/index`.
pub fn bip44_path(account: u32, index: u32) -> Result<[ChildNumber; 5], KeyError> {
    Ok([
        ChildNumber::Hardened { index: PURPOSE },
        ChildNumber::Hardened { index: COIN_TYPE },
        ChildNumber::from_hardened_idx(account).map_err(|_| KeyError::DerivationOverflow(account))?,
        ChildNumber::Normal { index: 0 },
        ChildNumber::from_normal_idx(index).map_err(|_| KeyError::DerivationOverflow(index))?,
    ])
}

/// Derives the private key at `path` below `master`.
pub fn derive_path(master: &Xpriv, path: &[ChildNumber]) -> Result<PrivateKey, KeyError> {
    let mut child = master.derive_priv(SECP256K1, &path)?;
    let key = PrivateKey::from_secret_key(child.private_key);
    erase_xpriv(&mut child);
    Ok(key)
}

/// Derives the account key for `phrase` at `account` and `index`.
pub fn derive_private_key(phrase: &str, account: u32, index: u32) -> Result<PrivateKey, KeyError> {
    let path = bip44_path(account, index)?;
    let seed = mnemonic_to_seed(phrase)?;
    let mut master = derive_master_key(&seed[..])?;

    debug!(%account, %index, "deriving bip44 key");
    let key = derive_path(&master, &path);
    erase_xpriv(&mut master);
    key
}

fn erase_xpriv(xpriv: &mut Xpriv) {
    xpriv.private_key.non_secure_erase();
    xpriv.chain_code = ChainCode::from([0u8; 32]);
}
