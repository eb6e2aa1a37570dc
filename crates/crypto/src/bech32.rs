//! Bech32 (BIP-173) encoding of arbitrary byte strings.
//!
//! The checksum and character set come from the [`bech32`] crate. The bit
//! regrouping between 8-bit bytes and 5-bit symbols is done here so that the
//! strictness rules on padding can be applied explicitly when decoding.

use bech32::{u5, Variant};

use crate::errors::KeyError;

/// Regroups a sequence of `from_bits`-wide values into `to_bits`-wide values.
///
/// With `pad` set, a trailing partial group is zero-padded. Without it, the
/// input must end on a group boundary up to fewer than `from_bits` zero bits,
/// otherwise [`KeyError::InvalidPadding`] is returned. Values wider than
/// `from_bits` are rejected the same way.
///
/// Both widths must be in `1..=8`.
pub fn convert_bits(
    data: &[u8],
    from_bits: u32,
    to_bits: u32,
    pad: bool,
) -> Result<Vec<u8>, KeyError> {
    debug_assert!((1..=8).contains(&from_bits) && (1..=8).contains(&to_bits));

    let max_value: u32 = (1 << to_bits) - 1;
    let max_acc: u32 = (1 << (from_bits + to_bits - 1)) - 1;

    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(data.len() * from_bits as usize / to_bits as usize + 1);

    for &value in data {
        let value = u32::from(value);
        if value >> from_bits != 0 {
            return Err(KeyError::InvalidPadding);
        }
        acc = ((acc << from_bits) | value) & max_acc;
        bits += from_bits;
        while bits >= to_bits {
            bits -= to_bits;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to_bits - bits)) & max_value) as u8);
        }
    } else if bits >= from_bits || ((acc << (to_bits - bits)) & max_value) != 0 {
        return Err(KeyError::InvalidPadding);
    }

    Ok(out)
}

/// Encodes `data` as a bech32 string with the given human readable part.
pub fn encode(hrp: &str, data: &[u8]) -> Result<String, KeyError> {
    let symbols = convert_bits(data, 8, 5, true)?
        .into_iter()
        .map(u5::try_from_u8)
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_bech32_error)?;

    bech32::encode(hrp, symbols, Variant::Bech32).map_err(map_bech32_error)
}

/// Decodes a bech32 string into its human readable part and payload bytes.
///
/// The checksum is verified before anything else, so a corrupted string is
/// always reported as [`KeyError::InvalidChecksum`] regardless of its prefix.
pub fn decode(text: &str) -> Result<(String, Vec<u8>), KeyError> {
    let (hrp, symbols, variant) = bech32::decode(text).map_err(map_bech32_error)?;
    if variant != Variant::Bech32 {
        return Err(KeyError::InvalidChecksum);
    }

    let symbols: Vec<u8> = symbols.into_iter().map(u5::to_u8).collect();
    let data = convert_bits(&symbols, 5, 8, false)?;

    Ok((hrp, data))
}

fn map_bech32_error(err: bech32::Error) -> KeyError {
    match err {
        bech32::Error::InvalidChecksum => KeyError::InvalidChecksum,
        other => KeyError::MalformedBech32(other.to_string()),
    }
}
