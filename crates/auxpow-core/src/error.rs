//! Error type for header, AuxPoW and transaction codecs.

use alloc::string::String;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Codec and hashing errors.
///
/// Nothing in this crate recovers from these locally; a decode failure
/// means the whole header must be discarded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input ended before a required field was fully read.
    #[error("unexpected end of stream: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// The output buffer cannot hold the bytes being written.
    #[error("insufficient buffer capacity: needed {needed} bytes, {remaining} remaining")]
    InsufficientCapacity { needed: usize, remaining: usize },

    /// A CompactSize integer used a longer encoding than necessary.
    #[error("non-canonical varint: {value} encoded with prefix {prefix:#04x}")]
    NonCanonicalVarInt { prefix: u8, value: u64 },

    /// A witness-serialized transaction carried an unknown flag byte.
    #[error("invalid witness flag {0:#04x}")]
    InvalidWitnessFlag(u8),

    /// The proof-of-work key derivation rejected its parameters.
    #[error("proof-of-work hash computation failed: {0}")]
    HashComputation(String),

    /// The coinbase branch does not lead to the parent block's merkle root.
    #[error("coinbase transaction is not committed to by the parent block")]
    CoinbaseNotCommitted,

    /// The parent coinbase does not carry the chain merkle root.
    #[error("parent coinbase does not commit to this chain's block")]
    ChainNotCommitted,
}

impl Error {
    /// Whether this error was caused by truncated input.
    pub fn is_unexpected_end(&self) -> bool {
        matches!(self, Error::UnexpectedEnd { .. })
    }
}

/// Fail with [`Error::UnexpectedEnd`] unless `remaining >= needed`.
#[inline]
pub(crate) fn ensure_remaining(remaining: usize, needed: usize) -> Result<()> {
    if remaining < needed {
        return Err(Error::UnexpectedEnd { needed, remaining });
    }
    Ok(())
}

/// Fail with [`Error::InsufficientCapacity`] unless `remaining >= needed`.
#[inline]
pub(crate) fn ensure_capacity(remaining: usize, needed: usize) -> Result<()> {
    if remaining < needed {
        return Err(Error::InsufficientCapacity { needed, remaining });
    }
    Ok(())
}
