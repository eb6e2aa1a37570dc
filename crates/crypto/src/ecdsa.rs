//! Deterministic secp256k1 ECDSA with recoverable signatures.
//!
//! Signatures are produced with RFC 6979 nonces and normalized to low-S. The
//! recovery id is found by running public key recovery (SEC1 v2, section
//! 4.1.6) for each candidate and comparing against the signer's own key.

use std::fmt;

use secp256k1::{
    constants::{CURVE_ORDER, FIELD_SIZE},
    ecdsa::Signature,
    Message, PublicKey, Scalar, SecretKey, SECP256K1,
};

use crate::{errors::KeyError, keys::PrivateKey};

/// Length of a serialized recoverable signature, `r || s || recovery_id`.
pub const RECOVERABLE_SIGNATURE_LEN: usize = 65;

/// `n / 2`, the largest `s` a normalized signature may carry.
const HALF_CURVE_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// The `(r, s)` pair of an ECDSA signature as 32-byte big-endian integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcdsaSignature {
    /// x coordinate of the nonce point, reduced mod n.
    pub r: [u8; 32],
    /// The proof scalar.
    pub s: [u8; 32],
}

impl EcdsaSignature {
    /// Splits a 64-byte `r || s` encoding.
    pub fn from_compact(bytes: &[u8; 64]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Self { r, s }
    }

    /// Joins the scalars into the 64-byte `r || s` encoding.
    pub fn to_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    /// Whether `s` is in the lower half of the scalar range.
    pub fn is_low_s(&self) -> bool {
        self.s <= HALF_CURVE_ORDER
    }

    fn is_in_range(&self) -> bool {
        is_valid_scalar(&self.r) && is_valid_scalar(&self.s)
    }
}

/// A signature together with the id that selects the signer's key among the
/// recovery candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    /// The `(r, s)` pair.
    pub signature: EcdsaSignature,
    /// Recovery id in `0..=3`.
    pub recovery_id: u8,
}

impl RecoverableSignature {
    /// Serializes as `r || s || recovery_id`.
    pub fn serialize(&self) -> [u8; RECOVERABLE_SIGNATURE_LEN] {
        let mut out = [0u8; RECOVERABLE_SIGNATURE_LEN];
        out[..64].copy_from_slice(&self.signature.to_compact());
        out[64] = self.recovery_id;
        out
    }

    /// Parses the 65-byte `r || s || recovery_id` encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: &[u8; RECOVERABLE_SIGNATURE_LEN] = bytes
            .try_into()
            .map_err(|_| KeyError::invalid_length("65 bytes", bytes.len()))?;

        let mut compact = [0u8; 64];
        compact.copy_from_slice(&bytes[..64]);
        let signature = EcdsaSignature::from_compact(&compact);
        let recovery_id = bytes[64];

        if recovery_id > 3 {
            return Err(KeyError::InvalidRecoveryId(recovery_id));
        }
        if !signature.is_in_range() {
            return Err(KeyError::InvalidSignature);
        }

        Ok(Self {
            signature,
            recovery_id,
        })
    }

    /// Recovers the public key that produced this signature over `digest`.
    pub fn recover(&self, digest: &[u8; 32]) -> Result<PublicKey, KeyError> {
        recover_from_signature(self.recovery_id, &self.signature, digest)
            .ok_or(KeyError::RecoveryFailed)
    }
}

/// Signs 32-byte digests with a single private key.
pub struct EcdsaSigner {
    secret: SecretKey,
    public: PublicKey,
}

impl EcdsaSigner {
    /// Creates a signer for `key`.
    pub fn new(key: &PrivateKey) -> Self {
        let secret = *key.secret_key();
        Self {
            secret,
            public: PublicKey::from_secret_key(SECP256K1, &secret),
        }
    }

    /// The signer's public key.
    pub const fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Produces a deterministic, low-S signature over `digest`.
    pub fn sign(&self, digest: &[u8; 32]) -> EcdsaSignature {
        let mut signature = SECP256K1.sign_ecdsa(&Message::from_digest(*digest), &self.secret);
        signature.normalize_s();
        EcdsaSignature::from_compact(&signature.serialize_compact())
    }

    /// Finds the recovery id under which `signature` recovers to this signer's
    /// public key.
    pub fn find_recovery_id(
        &self,
        signature: &EcdsaSignature,
        digest: &[u8; 32],
    ) -> Result<u8, KeyError> {
        (0..4)
            .find(|id| recover_from_signature(*id, signature, digest) == Some(self.public))
            .ok_or(KeyError::RecoveryFailed)
    }

    /// Signs `digest` and attaches the recovery id.
    pub fn sign_recoverable(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, KeyError> {
        let signature = self.sign(digest);
        let recovery_id = self.find_recovery_id(&signature, digest)?;
        Ok(RecoverableSignature {
            signature,
            recovery_id,
        })
    }
}

impl Drop for EcdsaSigner {
    fn drop(&mut self) {
        self.secret.non_secure_erase();
    }
}

impl fmt::Debug for EcdsaSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaSigner")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Recovers the public key `Q` for which `signature` is valid over `digest`,
/// given the recovery id.
///
/// Bit 1 of the id selects `x = r + n` instead of `x = r`, bit 0 selects the
/// parity of the nonce point's y coordinate. Returns `None` when the candidate
/// does not exist.
pub fn recover_from_signature(
    recovery_id: u8,
    signature: &EcdsaSignature,
    digest: &[u8; 32],
) -> Option<PublicKey> {
    if recovery_id > 3 || !signature.is_in_range() {
        return None;
    }

    let x = if recovery_id & 2 == 0 {
        signature.r
    } else {
        add_be(&signature.r, &CURVE_ORDER)?
    };
    if x >= FIELD_SIZE {
        return None;
    }

    let mut encoded = [0u8; 33];
    encoded[0] = 0x02 | (recovery_id & 1);
    encoded[1..].copy_from_slice(&x);
    // Decompression fails when x is not on the curve. With cofactor 1 every
    // point that decompresses already has order n.
    let nonce_point = PublicKey::from_slice(&encoded).ok()?;

    let r = SecretKey::from_slice(&signature.r).ok()?;
    let s = SecretKey::from_slice(&signature.s).ok()?;
    let r_inv = invert_scalar(&r)?;

    // Q = (s * r^-1) * R + (-e * r^-1) * G
    let s_term = nonce_point
        .mul_tweak(SECP256K1, &Scalar::from(mul_scalars(s, r_inv)?))
        .ok()?;

    let e = reduce_mod_order(digest);
    if e == [0u8; 32] {
        return Some(s_term);
    }
    let e = SecretKey::from_slice(&e).ok()?.negate();
    let g_term = PublicKey::from_secret_key(SECP256K1, &mul_scalars(e, r_inv)?);

    s_term.combine(&g_term).ok()
}

/// Parses a 65-byte signature and recovers the key that produced it.
pub fn recover_public_key(signature: &[u8], digest: &[u8; 32]) -> Result<PublicKey, KeyError> {
    RecoverableSignature::from_bytes(signature)?.recover(digest)
}

/// Checks `signature` over `digest` against `public_key`.
pub fn verify(public_key: &PublicKey, signature: &EcdsaSignature, digest: &[u8; 32]) -> bool {
    Signature::from_compact(&signature.to_compact())
        .and_then(|sig| SECP256K1.verify_ecdsa(&Message::from_digest(*digest), &sig, public_key))
        .is_ok()
}

fn is_valid_scalar(value: &[u8; 32]) -> bool {
    *value != [0u8; 32] && *value < CURVE_ORDER
}

fn mul_scalars(a: SecretKey, b: SecretKey) -> Option<SecretKey> {
    a.mul_tweak(&Scalar::from(b)).ok()
}

/// `value^(n - 2) mod n`, the inverse by Fermat's little theorem.
fn invert_scalar(value: &SecretKey) -> Option<SecretKey> {
    let mut exponent = CURVE_ORDER;
    exponent[31] -= 2;

    let mut acc: Option<SecretKey> = None;
    for byte in exponent {
        for bit in (0..8).rev() {
            if let Some(current) = acc {
                acc = Some(mul_scalars(current, current)?);
            }
            if (byte >> bit) & 1 == 1 {
                acc = Some(match acc {
                    Some(current) => mul_scalars(current, *value)?,
                    None => *value,
                });
            }
        }
    }
    acc
}

/// Interprets the digest as an integer and reduces it mod n.
///
/// A 256-bit value is below `2n`, so one subtraction is enough.
fn reduce_mod_order(digest: &[u8; 32]) -> [u8; 32] {
    if *digest < CURVE_ORDER {
        return *digest;
    }
    let mut out = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = i16::from(digest[i]) - i16::from(CURVE_ORDER[i]) - borrow;
        borrow = i16::from(diff < 0);
        if diff < 0 {
            diff += 256;
        }
        out[i] = diff as u8;
    }
    out
}

fn add_be(a: &[u8; 32], b: &[u8; 32]) -> Option<[u8; 32]> {
    let mut out = [0u8; 32];
    let mut carry = 0u16;
    for i in (0..32).rev() {
        let sum = u16::from(a[i]) + u16::from(b[i]) + carry;
        out[i] = sum as u8;
        carry = sum >> 8;
    }
    (carry == 0).then_some(out)
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use secp256k1::ecdsa::{RecoverableSignature as LibRecoverableSignature, RecoveryId};

    use super::*;

    const TEST_PRIVATE_KEY: &str = "M5AzgP8Ztnk5jGoNV9gZx7qUknHUV2BOjcoYGjkS7AI=";
    const TEST_DIGEST: &str = "G1eQ4dSk3HGi5Jicd9do/y0EzX+M0zTGSP0ajGe9/9Q=";
    const TEST_SIGNATURE: &str =
        "CfNbzAFDD6WE0jZG+YOXEpSH6SqptfKL+FVzXffJQw1T7xMYj7A+uCXZDCrJZzbX3pgSQimJyyX5D0wCGf1QJgA=";

    fn test_signer() -> EcdsaSigner {
        let key = PrivateKey::from_slice(&STANDARD.decode(TEST_PRIVATE_KEY).unwrap()).unwrap();
        EcdsaSigner::new(&key)
    }

    fn test_digest() -> [u8; 32] {
        STANDARD.decode(TEST_DIGEST).unwrap().try_into().unwrap()
    }

    fn library_recover(sig: &RecoverableSignature, digest: &[u8; 32]) -> PublicKey {
        let id = RecoveryId::from_i32(i32::from(sig.recovery_id)).unwrap();
        let lib_sig = LibRecoverableSignature::from_compact(&sig.signature.to_compact(), id).unwrap();
        SECP256K1
            .recover_ecdsa(&Message::from_digest(*digest), &lib_sig)
            .unwrap()
    }

    #[test]
    fn signs_known_digest() {
        let signature = test_signer().sign_recoverable(&test_digest()).unwrap();

        assert_eq!(STANDARD.encode(signature.serialize()), TEST_SIGNATURE);
        assert_eq!(signature.recovery_id, 0);
    }

    #[test]
    fn parsed_signature_recovers_signer() {
        let signer = test_signer();
        let bytes = STANDARD.decode(TEST_SIGNATURE).unwrap();

        let recovered = recover_public_key(&bytes, &test_digest()).unwrap();

        assert_eq!(&recovered, signer.public_key());
    }

    #[test]
    fn overflowed_x_candidates_do_not_exist() {
        let signer = test_signer();
        let signature = signer.sign(&test_digest());

        // r + n exceeds the field size unless r is tiny.
        assert_eq!(recover_from_signature(2, &signature, &test_digest()), None);
        assert_eq!(recover_from_signature(3, &signature, &test_digest()), None);
        assert_eq!(recover_from_signature(4, &signature, &test_digest()), None);
    }

    #[test]
    fn digests_at_or_above_order_are_reduced() {
        let signer = test_signer();

        for digest in [[0xffu8; 32], CURVE_ORDER, [0u8; 32]] {
            let signature = signer.sign_recoverable(&digest).unwrap();
            assert_eq!(&signature.recover(&digest).unwrap(), signer.public_key());
            assert!(verify(signer.public_key(), &signature.signature, &digest));
        }
    }

    #[test]
    fn verification_rejects_other_keys_and_digests() {
        let signer = test_signer();
        let other = EcdsaSigner::new(&PrivateKey::random());
        let digest = test_digest();
        let signature = signer.sign(&digest);

        assert!(verify(signer.public_key(), &signature, &digest));
        assert!(!verify(other.public_key(), &signature, &digest));
        assert!(!verify(signer.public_key(), &signature, &[7u8; 32]));
    }

    #[test]
    fn malformed_serializations_are_rejected() {
        let mut bytes = STANDARD.decode(TEST_SIGNATURE).unwrap();

        assert!(matches!(
            RecoverableSignature::from_bytes(&bytes[..64]),
            Err(KeyError::InvalidLength { actual: 64, .. })
        ));

        bytes[64] = 4;
        assert!(matches!(
            RecoverableSignature::from_bytes(&bytes),
            Err(KeyError::InvalidRecoveryId(4))
        ));

        bytes[64] = 0;
        bytes[..32].copy_from_slice(&[0u8; 32]);
        assert!(matches!(
            RecoverableSignature::from_bytes(&bytes),
            Err(KeyError::InvalidSignature)
        ));
    }

    #[test]
    fn scalar_inverse_multiplies_to_one() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let value = SecretKey::from_slice(&test_digest()).unwrap();

        let inverse = invert_scalar(&value).unwrap();

        assert_eq!(mul_scalars(value, inverse).unwrap().secret_bytes(), one);
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        fn private_key() -> impl Strategy<Value = PrivateKey> {
            any::<[u8; 32]>().prop_filter_map("scalar out of range", |bytes| {
                PrivateKey::from_slice(&bytes).ok()
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            // Every signature is low-S and recovers to the signer under the id we report.
            #[test]
            fn recovery_agrees_with_libsecp256k1(key in private_key(), digest in any::<[u8; 32]>()) {
                let signer = EcdsaSigner::new(&key);
                let signature = signer.sign_recoverable(&digest).unwrap();

                prop_assert!(signature.signature.is_low_s());
                prop_assert_eq!(&signature.recover(&digest).unwrap(), signer.public_key());
                prop_assert_eq!(&library_recover(&signature, &digest), signer.public_key());
            }

            // Signing is deterministic for a fixed key and digest.
            #[test]
            fn signing_is_deterministic(key in private_key(), digest in any::<[u8; 32]>()) {
                let signer = EcdsaSigner::new(&key);
                prop_assert_eq!(signer.sign(&digest), signer.sign(&digest));
            }
        }
    }
}
