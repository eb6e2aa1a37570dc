//! XSalsa20-Poly1305 secretbox with a random nonce stored in front.
//!
//! The sealed form is `nonce (24) || tag (16) || ciphertext`, the NaCl
//! secretbox layout.

use rand::{rngs::OsRng, RngCore};
use xsalsa20poly1305::{
    aead::{Aead, KeyInit},
    Key, Nonce, XSalsa20Poly1305,
};
use zeroize::Zeroizing;

use crate::errors::KeyError;

/// Length of the nonce prefix.
pub(crate) const NONCE_LEN: usize = 24;

/// Length of the Poly1305 tag.
pub(crate) const TAG_LEN: usize = 16;

/// Encrypts `plaintext` under `key` with a fresh nonce.
pub(crate) fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>, KeyError> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let cipher = XSalsa20Poly1305::new(Key::from_slice(key));
    let boxed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| KeyError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(NONCE_LEN + boxed.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&boxed);
    Ok(out)
}

/// Authenticates and decrypts the output of [`seal`].
pub(crate) fn open(key: &[u8; 32], sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(KeyError::DecryptionFailed);
    }
    let (nonce, boxed) = sealed.split_at(NONCE_LEN);

    let cipher = XSalsa20Poly1305::new(Key::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), boxed)
        .map(Zeroizing::new)
        .map_err(|_| KeyError::DecryptionFailed)
}
