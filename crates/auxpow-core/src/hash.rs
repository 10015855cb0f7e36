//! SHA256 double-hashing and fixed-size hash I/O.

use bytes::{Buf, BufMut};
use sha2::{Digest, Sha256};

use crate::consts::HASH_SIZE;
use crate::error::{ensure_capacity, ensure_remaining, Result};

/// A 32-byte hash in internal (wire) byte order.
pub type Hash256 = [u8; HASH_SIZE];

/// The all-zero hash.
pub const ZERO_HASH: Hash256 = [0u8; HASH_SIZE];

/// SHA256(SHA256(data)).
///
/// Used for header identity hashes, transaction IDs and merkle trees.
#[inline]
pub fn double_sha256(data: &[u8]) -> Hash256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(&first);
    let mut result = [0u8; HASH_SIZE];
    result.copy_from_slice(&second);
    result
}

/// Single SHA256 hash.
#[inline]
pub fn sha256(data: &[u8]) -> Hash256 {
    let hash = Sha256::digest(data);
    let mut result = [0u8; HASH_SIZE];
    result.copy_from_slice(&hash);
    result
}

/// Double SHA256 of two hashes concatenated, `left || right`.
#[inline]
pub fn hash_pair(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut combined = [0u8; HASH_SIZE * 2];
    combined[..HASH_SIZE].copy_from_slice(left);
    combined[HASH_SIZE..].copy_from_slice(right);
    double_sha256(&combined)
}

/// Reverse the byte order of a 32-byte hash.
///
/// Hashes are displayed in reverse byte order.
#[inline]
pub fn reverse_bytes(bytes: &Hash256) -> Hash256 {
    let mut reversed = *bytes;
    reversed.reverse();
    reversed
}

/// Convert a hash to its display format (reversed hex).
pub fn hash_to_display_hex(hash: &Hash256) -> alloc::string::String {
    hex::encode(reverse_bytes(hash))
}

/// Read a raw 32-byte hash.
pub fn read_hash<B: Buf>(buf: &mut B) -> Result<Hash256> {
    ensure_remaining(buf.remaining(), HASH_SIZE)?;
    let mut hash = [0u8; HASH_SIZE];
    buf.copy_to_slice(&mut hash);
    Ok(hash)
}

/// Write a raw 32-byte hash.
pub fn write_hash<B: BufMut>(buf: &mut B, hash: &Hash256) -> Result<()> {
    ensure_capacity(buf.remaining_mut(), HASH_SIZE)?;
    buf.put_slice(hash);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_double_sha256() {
        // SHA256d("hello")
        let hash = double_sha256(b"hello");
        assert_eq!(
            hash,
            hex!("9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50")
        );
    }

    #[test]
    fn test_sha256() {
        // SHA256("abc")
        assert_eq!(
            sha256(b"abc"),
            hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
        assert_eq!(double_sha256(b"abc"), sha256(&sha256(b"abc")));
    }

    #[test]
    fn test_hash_pair_matches_concatenation() {
        let left = [0x11u8; 32];
        let right = [0x22u8; 32];

        let mut combined = alloc::vec::Vec::with_capacity(64);
        combined.extend_from_slice(&left);
        combined.extend_from_slice(&right);

        assert_eq!(hash_pair(&left, &right), double_sha256(&combined));
        assert_ne!(hash_pair(&left, &right), hash_pair(&right, &left));
    }

    #[test]
    fn test_reverse_bytes() {
        let mut original = [0u8; 32];
        for (i, byte) in original.iter_mut().enumerate() {
            *byte = i as u8 + 1;
        }
        let reversed = reverse_bytes(&original);

        assert_eq!(reversed[0], 0x20);
        assert_eq!(reversed[31], 0x01);
        assert_eq!(reverse_bytes(&reversed), original);
    }

    #[test]
    fn test_display_hex_is_reversed() {
        let mut hash = [0u8; 32];
        hash[31] = 0xab;
        assert!(hash_to_display_hex(&hash).starts_with("ab00"));
    }

    #[test]
    fn test_read_hash_truncated() {
        let data = [0u8; 31];
        let err = read_hash(&mut &data[..]).unwrap_err();
        assert!(err.is_unexpected_end());
    }

    #[test]
    fn test_write_hash_into_full_buffer() {
        let mut out = [0u8; 16];
        let err = write_hash(&mut &mut out[..], &[0x42; 32]).unwrap_err();
        assert!(!err.is_unexpected_end());
    }
}
