//! Block header construction and serialization.
//!
//! A header is the 80-byte core optionally followed by an AuxPoW payload.
//! The payload is present on the wire only when version bit 8 is set and a
//! payload is attached; a flagged header without one encodes as the bare
//! core and decodes back without one.
//!
//! Both header hashes cover the core alone.

use alloc::vec::Vec;

use bytes::{Buf, BufMut};

use crate::auxpow::AuxPow;
use crate::consts::{
    BLOCK_VERSION_AUXPOW, BLOCK_VERSION_CHAIN_START, HEADER_CORE_SIZE,
    HEADER_SIZE_PROTOCOL_VERSION, STORAGE_PROTOCOL_VERSION,
};
use crate::difficulty::pow_hash_meets_bits;
use crate::error::{ensure_capacity, ensure_remaining, Result};
use crate::hash::{double_sha256, read_hash, Hash256};
use crate::pow::{HeaderHasher, ScryptHasher};

/// The fixed 80-byte part of a block header.
///
/// This is also the type of the parent header inside an AuxPoW, which
/// cannot carry a payload of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderCore {
    /// Block version. Bit 8 flags AuxPoW, bits 16 and up carry the chain id.
    pub version: i32,
    /// Hash of the previous block (internal byte order).
    pub prev_block_hash: Hash256,
    /// Merkle root of all transactions.
    pub merkle_root: Hash256,
    /// Block timestamp (Unix seconds).
    pub timestamp: u32,
    /// Difficulty target in compact "bits" format.
    pub bits: u32,
    /// Nonce for proof of work.
    pub nonce: u32,
}

impl HeaderCore {
    /// Serialize to the 80-byte core layout.
    pub fn serialize(&self) -> [u8; HEADER_CORE_SIZE] {
        let mut header = [0u8; HEADER_CORE_SIZE];

        // Version (4 bytes, little-endian)
        header[0..4].copy_from_slice(&self.version.to_le_bytes());

        // Previous block hash (32 bytes, internal byte order)
        header[4..36].copy_from_slice(&self.prev_block_hash);

        // Merkle root (32 bytes)
        header[36..68].copy_from_slice(&self.merkle_root);

        // Timestamp (4 bytes, little-endian)
        header[68..72].copy_from_slice(&self.timestamp.to_le_bytes());

        // Bits (4 bytes, little-endian)
        header[72..76].copy_from_slice(&self.bits.to_le_bytes());

        // Nonce (4 bytes, little-endian)
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());

        header
    }

    /// Write the 80-byte core.
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        ensure_capacity(buf.remaining_mut(), HEADER_CORE_SIZE)?;
        buf.put_slice(&self.serialize());
        Ok(())
    }

    /// Read an 80-byte core. Nothing after it is consumed.
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf.remaining(), HEADER_CORE_SIZE)?;
        let version = buf.get_i32_le();
        let prev_block_hash = read_hash(buf)?;
        let merkle_root = read_hash(buf)?;
        let timestamp = buf.get_u32_le();
        let bits = buf.get_u32_le();
        let nonce = buf.get_u32_le();

        Ok(HeaderCore {
            version,
            prev_block_hash,
            merkle_root,
            timestamp,
            bits,
            nonce,
        })
    }

    /// Identity hash: double SHA256 of the core.
    pub fn block_hash(&self) -> Hash256 {
        double_sha256(&self.serialize())
    }

    /// Proof-of-work hash: scrypt(1024, 1, 1) of the core.
    pub fn pow_hash(&self) -> Result<Hash256> {
        self.hash_with(&ScryptHasher::default())
    }

    /// Hash the core with an arbitrary header hash function.
    pub fn hash_with<H: HeaderHasher>(&self, hasher: &H) -> Result<Hash256> {
        hasher.hash_header(&self.serialize())
    }

    /// Whether the version carries the AuxPoW flag.
    pub fn is_auxpow(&self) -> bool {
        self.version & BLOCK_VERSION_AUXPOW != 0
    }

    /// Chain id packed into the upper version bits.
    ///
    /// Truncating division, so negative versions keep their sign in the
    /// two's-complement result.
    pub fn chain_id(&self) -> u32 {
        (self.version / BLOCK_VERSION_CHAIN_START) as u32
    }
}

/// A block header with an optional AuxPoW payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockHeader {
    /// Block version. Bit 8 flags AuxPoW, bits 16 and up carry the chain id.
    pub version: i32,
    /// Hash of the previous block (internal byte order).
    pub prev_block_hash: Hash256,
    /// Merkle root of all transactions.
    pub merkle_root: Hash256,
    /// Block timestamp (Unix seconds).
    pub timestamp: u32,
    /// Difficulty target in compact "bits" format.
    pub bits: u32,
    /// Nonce for proof of work.
    pub nonce: u32,
    /// Merged-mining payload; encoded only when the version flags it.
    pub auxpow: Option<AuxPow>,
}

impl BlockHeader {
    /// Create a new block header timestamped now, to the second.
    pub fn new(
        version: i32,
        prev_block_hash: Hash256,
        merkle_root: Hash256,
        bits: u32,
        nonce: u32,
    ) -> Self {
        BlockHeader {
            version,
            prev_block_hash,
            merkle_root,
            timestamp: current_timestamp(),
            bits,
            nonce,
            auxpow: None,
        }
    }

    /// A header with the fields of `core` and no payload.
    pub fn from_core(core: HeaderCore) -> Self {
        BlockHeader {
            version: core.version,
            prev_block_hash: core.prev_block_hash,
            merkle_root: core.merkle_root,
            timestamp: core.timestamp,
            bits: core.bits,
            nonce: core.nonce,
            auxpow: None,
        }
    }

    /// The 80-byte core fields.
    pub fn core(&self) -> HeaderCore {
        HeaderCore {
            version: self.version,
            prev_block_hash: self.prev_block_hash,
            merkle_root: self.merkle_root,
            timestamp: self.timestamp,
            bits: self.bits,
            nonce: self.nonce,
        }
    }

    /// Serialize the core, without any AuxPoW payload.
    pub fn serialize_core(&self) -> [u8; HEADER_CORE_SIZE] {
        self.core().serialize()
    }

    /// Identity hash, independent of the AuxPoW payload.
    pub fn block_hash(&self) -> Hash256 {
        self.core().block_hash()
    }

    /// Proof-of-work hash, independent of the AuxPoW payload.
    pub fn pow_hash(&self) -> Result<Hash256> {
        self.core().pow_hash()
    }

    /// Hash the core with an arbitrary header hash function.
    pub fn hash_with<H: HeaderHasher>(&self, hasher: &H) -> Result<Hash256> {
        self.core().hash_with(hasher)
    }

    /// Whether the proof-of-work hash meets the target encoded in `bits`.
    pub fn check_proof_of_work(&self) -> Result<bool> {
        Ok(pow_hash_meets_bits(&self.pow_hash()?, self.bits))
    }

    /// Whether the version carries the AuxPoW flag.
    pub fn is_auxpow(&self) -> bool {
        self.core().is_auxpow()
    }

    /// Chain id packed into the upper version bits.
    pub fn chain_id(&self) -> u32 {
        self.core().chain_id()
    }

    /// The payload that will actually be encoded.
    fn encoded_auxpow(&self) -> Option<&AuxPow> {
        self.auxpow.as_ref().filter(|_| self.is_auxpow())
    }

    /// Number of bytes [`BlockHeader::wire_encode`] writes.
    pub fn serialized_size(&self) -> usize {
        HEADER_CORE_SIZE + self.encoded_auxpow().map_or(0, AuxPow::serialized_size)
    }

    /// Encode for the peer-to-peer protocol at protocol version `pver`.
    pub fn wire_encode<B: BufMut>(&self, buf: &mut B, pver: u32) -> Result<()> {
        write_header(buf, pver, self)
    }

    /// Decode from the peer-to-peer protocol at protocol version `pver`.
    pub fn wire_decode<B: Buf>(buf: &mut B, pver: u32) -> Result<Self> {
        read_header(buf, pver)
    }

    /// Encode in the long-term storage format.
    pub fn serialize<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        // The storage format matches the wire encoding at protocol version 0.
        write_header(buf, STORAGE_PROTOCOL_VERSION, self)
    }

    /// Decode from the long-term storage format.
    pub fn deserialize<B: Buf>(buf: &mut B) -> Result<Self> {
        read_header(buf, STORAGE_PROTOCOL_VERSION)
    }

    /// Storage encoding as a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_size());
        // Writing into a Vec cannot run out of capacity.
        let _ = self.serialize(&mut out);
        out
    }

    /// Decode a header from the front of `raw`, ignoring trailing bytes.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        Self::deserialize(&mut &raw[..])
    }
}

impl From<HeaderCore> for BlockHeader {
    fn from(core: HeaderCore) -> Self {
        BlockHeader::from_core(core)
    }
}

/// Size of the header at the front of `raw`.
///
/// Trailing bytes after the header are not counted.
///
/// Only a short core is an error. A flagged header whose following bytes
/// do not decode as an AuxPoW payload is taken to have none, and measures
/// [`HEADER_CORE_SIZE`].
pub fn header_size_from_raw_bytes(raw: &[u8]) -> Result<usize> {
    let mut buf = raw;
    let core = HeaderCore::decode(&mut buf)?;
    if !core.is_auxpow() || !buf.has_remaining() {
        return Ok(HEADER_CORE_SIZE);
    }

    match AuxPow::decode(&mut buf) {
        Ok(auxpow) => Ok(HEADER_CORE_SIZE + auxpow.serialized_size()),
        Err(err) => {
            tracing::trace!(
                version = core.version,
                pver = HEADER_SIZE_PROTOCOL_VERSION,
                %err,
                "no auxpow payload after flagged header core"
            );
            Ok(HEADER_CORE_SIZE)
        }
    }
}

fn write_header<B: BufMut>(buf: &mut B, pver: u32, header: &BlockHeader) -> Result<()> {
    header.core().encode(buf)?;

    if !header.is_auxpow() {
        return Ok(());
    }
    match &header.auxpow {
        Some(auxpow) => auxpow.encode(buf),
        None => {
            tracing::debug!(
                version = header.version,
                pver,
                "auxpow flag set without payload, writing header core only"
            );
            Ok(())
        }
    }
}

fn read_header<B: Buf>(buf: &mut B, pver: u32) -> Result<BlockHeader> {
    let core = HeaderCore::decode(buf)?;
    let mut header = BlockHeader::from_core(core);

    // No structural differences between protocol versions yet.
    if header.is_auxpow() && buf.has_remaining() {
        header.auxpow = Some(AuxPow::decode(buf)?);
    }

    tracing::trace!(
        version = header.version,
        pver,
        auxpow = header.auxpow.is_some(),
        "decoded block header"
    );
    Ok(header)
}

/// Get the current Unix timestamp.
#[cfg(feature = "std")]
fn current_timestamp() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

#[cfg(not(feature = "std"))]
fn current_timestamp() -> u32 {
    // No clock without std; callers set the timestamp explicitly.
    0
}
