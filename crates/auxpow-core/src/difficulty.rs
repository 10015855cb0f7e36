//! Compact "bits" target conversion.
//!
//! Only the conversion and comparison live here; retargeting is the job of
//! the chain-selection layer.

use crate::hash::{reverse_bytes, Hash256};

/// Convert compact "bits" representation to a 256-bit target.
///
/// The bits format is: [exponent (1 byte)][mantissa (3 bytes)]
/// Target = mantissa * 256^(exponent - 3)
///
/// The result is a 32-byte big-endian representation of the target.
/// Negative or overflowing encodings yield a zero target, which no hash meets.
pub fn bits_to_target(bits: u32) -> [u8; 32] {
    let exponent = ((bits >> 24) & 0xFF) as usize;
    let mantissa = bits & 0x007FFFFF;

    let mut target = [0u8; 32];

    if bits & 0x00800000 != 0 || exponent == 0 {
        return target;
    }

    if exponent <= 3 {
        // Mantissa fits in fewer bytes than specified
        let value = mantissa >> (8 * (3 - exponent));
        target[31] = (value & 0xFF) as u8;
        target[30] = ((value >> 8) & 0xFF) as u8;
        target[29] = ((value >> 16) & 0xFF) as u8;
        return target;
    }

    // Mantissa bytes that would land above the top byte make the target overflow.
    let mantissa_bytes = [(mantissa >> 16) as u8, (mantissa >> 8) as u8, mantissa as u8];
    for (offset, byte) in mantissa_bytes.iter().enumerate() {
        match (32 + offset).checked_sub(exponent) {
            Some(pos) if pos < 32 => target[pos] = *byte,
            _ if *byte != 0 => return [0u8; 32],
            _ => {}
        }
    }

    target
}

/// Convert a 256-bit big-endian target back to compact "bits".
pub fn target_to_bits(target: &[u8; 32]) -> u32 {
    let Some(first_nonzero) = target.iter().position(|&byte| byte != 0) else {
        return 0;
    };

    // Number of significant bytes
    let exponent = (32 - first_nonzero) as u32;

    let mut mantissa: u32 = 0;
    for offset in 0..3 {
        let byte = target.get(first_nonzero + offset).copied().unwrap_or(0);
        mantissa = (mantissa << 8) | u32::from(byte);
    }

    // A set high bit would read back as negative; shift into the next byte.
    let (exponent, mantissa) = if mantissa & 0x00800000 != 0 {
        (exponent + 1, mantissa >> 8)
    } else {
        (exponent, mantissa)
    };

    (exponent << 24) | (mantissa & 0x007FFFFF)
}

/// Check if a big-endian hash meets a big-endian target (`hash <= target`).
#[inline]
pub fn hash_meets_target(hash: &[u8; 32], target: &[u8; 32]) -> bool {
    hash <= target
}

/// Check a proof-of-work hash in internal byte order against `bits`.
pub fn pow_hash_meets_bits(pow_hash: &Hash256, bits: u32) -> bool {
    let target = bits_to_target(bits);
    target != [0u8; 32] && hash_meets_target(&reverse_bytes(pow_hash), &target)
}
