//! One-time initialization of the cryptographic backends.
//!
//! Hosts call [`init`] once at startup. It runs known-answer checks against
//! the curve, hash and randomness backends and caches the outcome, so later
//! calls are free and report the same result.

use std::sync::OnceLock;

use rand::{rngs::OsRng, RngCore};
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use tracing::{info, warn};

use crate::{amino, ecdsa, errors::KeyError, keys::PrivateKey};

static PROVIDER: OnceLock<Result<(), &'static str>> = OnceLock::new();

/// Compressed encoding of the secp256k1 generator, the public key of scalar 1.
const GENERATOR: [u8; 33] = [
    0x02, 0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87, 0x0b,
    0x07, 0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8, 0x17,
    0x98,
];

const PUB_KEY_TAG: [u8; 4] = [0xeb, 0x5a, 0xe9, 0x87];

/// Initializes the crypto backends, returning
/// [`KeyError::ProviderUnavailable`] if any of them misbehaves.
pub fn init() -> Result<(), KeyError> {
    (*PROVIDER.get_or_init(self_test)).map_err(KeyError::ProviderUnavailable)
}

fn self_test() -> Result<(), &'static str> {
    let result = run_checks();
    match result {
        Ok(()) => info!("crypto provider initialized"),
        Err(reason) => warn!(%reason, "crypto provider self-test failed"),
    }
    result
}

fn run_checks() -> Result<(), &'static str> {
    let mut one = [0u8; 32];
    one[31] = 1;
    let secret = SecretKey::from_slice(&one).map_err(|_| "scalar parsing")?;
    if PublicKey::from_secret_key(SECP256K1, &secret).serialize() != GENERATOR {
        return Err("generator multiplication");
    }

    if amino::type_tag(amino::PUB_KEY_SECP256K1).ok() != Some(PUB_KEY_TAG) {
        return Err("sha256 amino tag");
    }

    let key = PrivateKey::from_slice(&one).map_err(|_| "scalar parsing")?;
    let signer = ecdsa::EcdsaSigner::new(&key);
    let digest = [0x5au8; 32];
    let signature = signer
        .sign_recoverable(&digest)
        .map_err(|_| "signature recovery")?;
    if !ecdsa::verify(signer.public_key(), &signature.signature, &digest) {
        return Err("signature verification");
    }

    let mut first = [0u8; 32];
    let mut second = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut first)
        .and_then(|_| OsRng.try_fill_bytes(&mut second))
        .map_err(|_| "os random source")?;
    if first == second {
        return Err("os random source");
    }

    Ok(())
}
