//! Key management and signing primitives for Finschia accounts.
//!
//! - [`bech32`]: address text encoding with explicit bit regrouping.
//! - [`amino`]: registered type prefixes for keys.
//! - [`keys`]: secp256k1 private keys and public key encodings.
//! - [`ecdsa`]: deterministic low-S signatures with recovery ids.
//! - [`hd`]: mnemonics and BIP-44 derivation on `m/44'/438'/account'/0/index`.
//! - [`keystore`]: bcrypt + XSalsa20-Poly1305 keystores in ASCII armor.
//!
//! Call [`init`] once before using the other modules.

pub mod amino;
pub mod bech32;
pub mod ecdsa;
pub mod errors;
pub mod hd;
pub mod keys;
pub mod keystore;
mod provider;

pub use ecdsa::{EcdsaSignature, EcdsaSigner, RecoverableSignature};
pub use errors::KeyError;
pub use keys::{hash160, PrivateKey};
pub use keystore::KeyStore;
pub use provider::init;

