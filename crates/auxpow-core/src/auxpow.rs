//! Merged-mining payload.
//!
//! An AuxPoW ties a block of this chain to proof of work done on a parent
//! chain: the parent's coinbase commits to a merkle root of merge-mined
//! chain block hashes, and the coinbase itself is proven to be part of the
//! parent block.
//!
//! Wire layout, in order:
//! - parent coinbase transaction, stripped form
//! - parent block hash (32 bytes)
//! - coinbase branch: CompactSize count, hashes, `i32` index
//! - blockchain branch: same shape
//! - parent block header core (80 bytes, never extended)

use bytes::{Buf, BufMut};

use crate::consts::{HASH_SIZE, HEADER_CORE_SIZE, MERGED_MINING_HEADER};
use crate::error::{Error, Result};
use crate::hash::{read_hash, write_hash, Hash256};
use crate::header::HeaderCore;
use crate::merkle::MerkleBranch;
use crate::transaction::Transaction;

/// Auxiliary proof of work attached to a merge-mined block header.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuxPow {
    /// Coinbase transaction of the parent block.
    pub coinbase_txn: Transaction,
    /// Hash of the parent block.
    pub parent_block_hash: Hash256,
    /// Proves the coinbase is in the parent block's transaction tree.
    pub coinbase_branch: MerkleBranch,
    /// Proves this chain's block hash is in the merged-mining tree.
    pub blockchain_branch: MerkleBranch,
    /// Parent block header. Has no AuxPoW of its own.
    pub parent_block: HeaderCore,
}

impl AuxPow {
    /// Encoded size; always equals the length [`AuxPow::encode`] writes.
    pub fn serialized_size(&self) -> usize {
        self.coinbase_txn.stripped_size()
            + HASH_SIZE
            + self.coinbase_branch.serialized_size()
            + self.blockchain_branch.serialized_size()
            + HEADER_CORE_SIZE
    }

    /// Write the payload in wire order. The coinbase is always stripped.
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        self.coinbase_txn.encode_stripped(buf)?;
        write_hash(buf, &self.parent_block_hash)?;
        self.coinbase_branch.encode(buf)?;
        self.blockchain_branch.encode(buf)?;
        self.parent_block.encode(buf)
    }

    /// Read a payload. The parent header is read as a bare core.
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        let coinbase_txn = Transaction::decode_stripped(buf)?;
        let parent_block_hash = read_hash(buf)?;
        let coinbase_branch = MerkleBranch::decode(buf)?;
        let blockchain_branch = MerkleBranch::decode(buf)?;
        let parent_block = HeaderCore::decode(buf)?;

        tracing::trace!(
            coinbase_branch = coinbase_branch.branch.len(),
            blockchain_branch = blockchain_branch.branch.len(),
            parent_version = parent_block.version,
            "decoded auxpow"
        );

        Ok(AuxPow {
            coinbase_txn,
            parent_block_hash,
            coinbase_branch,
            blockchain_branch,
            parent_block,
        })
    }

    /// Transaction ID of the parent coinbase.
    pub fn coinbase_txid(&self) -> Hash256 {
        self.coinbase_txn.txid()
    }

    /// Parent block merkle root implied by the coinbase branch.
    pub fn parent_merkle_root(&self) -> Hash256 {
        self.coinbase_branch.reconstruct_root(&self.coinbase_txid())
    }

    /// Merged-mining root implied by the blockchain branch, in the byte
    /// order it appears in the parent coinbase script.
    pub fn chain_merkle_root(&self, aux_block_hash: &Hash256) -> Hash256 {
        self.blockchain_branch.reconstruct_root_reversed(aux_block_hash)
    }

    /// Check that the parent block commits to the coinbase and that the
    /// coinbase commits to `aux_block_hash`.
    ///
    /// This does not check the parent's proof of work.
    pub fn verify(&self, aux_block_hash: &Hash256) -> Result<()> {
        if self.parent_merkle_root() != self.parent_block.merkle_root {
            return Err(Error::CoinbaseNotCommitted);
        }

        let root = self.chain_merkle_root(aux_block_hash);
        let script = match self.coinbase_txn.inputs.first() {
            Some(input) => input.script_sig.as_slice(),
            None => return Err(Error::ChainNotCommitted),
        };

        let committed = script
            .windows(MERGED_MINING_HEADER.len() + HASH_SIZE)
            .any(|window| {
                window[..MERGED_MINING_HEADER.len()] == MERGED_MINING_HEADER
                    && window[MERGED_MINING_HEADER.len()..] == root
            });

        if !committed {
            return Err(Error::ChainNotCommitted);
        }
        Ok(())
    }
}
