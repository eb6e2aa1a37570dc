//! Errors raised by the key management primitives.

use thiserror::Error;

/// Error returned by every fallible operation in this crate.
///
/// Messages describe which check failed and never include key material,
/// passphrases or mnemonics.
#[derive(Debug, Error)]
pub enum KeyError {
    /// A byte string did not have the length required by its type.
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Human readable description of the accepted length(s).
        expected: &'static str,
        /// The length that was supplied.
        actual: usize,
    },

    /// The human readable part of a bech32 string is not one we accept.
    #[error("unexpected bech32 prefix `{0}`")]
    InvalidHrp(String),

    /// The bech32 checksum does not verify.
    #[error("invalid bech32 checksum")]
    InvalidChecksum,

    /// The bech32 string is malformed in some way other than its checksum.
    #[error("malformed bech32 string: {0}")]
    MalformedBech32(String),

    /// Bit regrouping left non-zero or oversized padding.
    #[error("invalid padding while regrouping bits")]
    InvalidPadding,

    /// Amino varint length prefixes only cover bodies up to 33 bytes.
    #[error("amino body of {0} bytes is longer than the supported 33 bytes")]
    UnsupportedBodyLength(usize),

    /// The amino type name hashes to too few non-zero bytes to yield a tag.
    #[error("amino type name hash does not contain a usable tag")]
    EmptyHash,

    /// Bytes do not start with the expected amino prefix.
    #[error("amino prefix mismatch")]
    AminoPrefixMismatch,

    /// The scalar is zero or not below the curve order.
    #[error("private key is out of range")]
    InvalidPrivateKey,

    /// Bytes do not encode a point on secp256k1.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// HD derivation was given an empty seed.
    #[error("seed must not be empty")]
    InvalidSeed,

    /// A mnemonic phrase failed BIP-39 validation.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// An account or address index does not fit below the hardened offset.
    #[error("derivation index {0} must be below 2^31")]
    DerivationOverflow(u32),

    /// BIP-32 child derivation failed.
    #[error("BIP32 derivation error: {0}")]
    Bip32(#[from] bitcoin::bip32::Error),

    /// No recovery id reproduces the signer's public key.
    #[error("could not construct a recoverable signature")]
    RecoveryFailed,

    /// The recovery id byte of a serialized signature is not in `0..=3`.
    #[error("invalid recovery id {0}")]
    InvalidRecoveryId(u8),

    /// The signature scalars are not valid for secp256k1.
    #[error("invalid signature")]
    InvalidSignature,

    /// The keystore names a key derivation function other than bcrypt.
    #[error("unsupported kdf `{0}`")]
    UnsupportedKdf(String),

    /// The keystore salt header is missing, empty or not hex.
    #[error("keystore salt is missing or malformed")]
    InvalidSalt,

    /// The armored envelope is structurally broken or fails its checksum.
    #[error("corrupt armor: {0}")]
    CorruptArmor(&'static str),

    /// The cipher refused to seal the plaintext.
    #[error("failed to encrypt keystore")]
    EncryptionFailed,

    /// Authenticated decryption failed, usually because of a wrong passphrase.
    #[error("failed to decrypt keystore")]
    DecryptionFailed,

    /// The passphrase does not fit in bcrypt's 72-byte input, NUL included.
    #[error("passphrase is {0} bytes, at most 71 are accepted")]
    PassphraseTooLong(usize),

    /// The key derivation function itself reported an error.
    #[error("key derivation failed: {0}")]
    KdfFailure(String),

    /// The crypto provider self-test failed during initialization.
    #[error("crypto provider unavailable: {0}")]
    ProviderUnavailable(&'static str),

    /// Reading or writing a keystore failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl KeyError {
    /// Shorthand for [`KeyError::InvalidLength`].
    pub(crate) const fn invalid_length(expected: &'static str, actual: usize) -> Self {
        Self::InvalidLength { expected, actual }
    }
}
