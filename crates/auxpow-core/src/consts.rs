//! Consensus constants shared by the header, AuxPoW and hashing code.

/// Size of a hash on the wire.
pub const HASH_SIZE: usize = 32;

/// Size of the header core: version, previous block hash, merkle root,
/// timestamp, bits and nonce.
pub const HEADER_CORE_SIZE: usize = 16 + HASH_SIZE * 2;

/// Version bit signalling that an AuxPoW payload follows the header core.
pub const BLOCK_VERSION_AUXPOW: i32 = 1 << 8;

/// Divisor extracting the chain id from the upper version bits.
pub const BLOCK_VERSION_CHAIN_START: i32 = 1 << 16;

/// Magic bytes preceding the chain merkle root in a parent coinbase script.
pub const MERGED_MINING_HEADER: [u8; 4] = [0xfa, 0xbe, b'm', b'm'];

/// Protocol version used when sizing a header from raw bytes.
pub const HEADER_SIZE_PROTOCOL_VERSION: u32 = 60002;

/// Protocol version the storage encoding is pinned to.
pub const STORAGE_PROTOCOL_VERSION: u32 = 0;

/// Size of a serialized merkle branch index.
pub const MERKLE_INDEX_SIZE: usize = 4;
