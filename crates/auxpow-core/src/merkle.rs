//! Merkle trees and the merkle branches carried by AuxPoW payloads.

use alloc::vec::Vec;

use bytes::{Buf, BufMut};

use crate::consts::{HASH_SIZE, MERKLE_INDEX_SIZE};
use crate::error::{ensure_capacity, ensure_remaining, Result};
use crate::hash::{hash_pair, read_hash, reverse_bytes, write_hash, Hash256, ZERO_HASH};
use crate::varint::{read_count, varint_size, write_varint};

/// Index value meaning "no proof".
pub const NO_PROOF_INDEX: i32 = -1;

/// Compute the merkle root from a list of leaf hashes.
///
/// A single leaf is its own root. Levels with an odd number of nodes
/// duplicate the last one.
pub fn compute_merkle_root(leaves: &[Hash256]) -> Hash256 {
    if leaves.is_empty() {
        return ZERO_HASH;
    }

    let mut current_level: Vec<Hash256> = leaves.to_vec();

    while current_level.len() > 1 {
        current_level = next_level(&current_level);
    }

    current_level[0]
}

fn next_level(level: &[Hash256]) -> Vec<Hash256> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            [single] => hash_pair(single, single),
            _ => unreachable!("chunks(2) yields one or two nodes"),
        })
        .collect()
}

/// A merkle proof: sibling hashes from leaf to root plus the leaf's
/// position, one bit per level.
///
/// Bit `i` of `index` set means the running hash is the right child at
/// level `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MerkleBranch {
    pub branch: Vec<Hash256>,
    pub index: i32,
}

impl MerkleBranch {
    /// A proof from sibling hashes and a leaf index.
    pub fn new(branch: Vec<Hash256>, index: i32) -> Self {
        MerkleBranch { branch, index }
    }

    /// Build the proof for `leaves[index]`.
    ///
    /// Returns `None` if `index` is out of range.
    pub fn from_leaves(leaves: &[Hash256], index: usize) -> Option<Self> {
        if index >= leaves.len() {
            return None;
        }
        let proof_index = i32::try_from(index).ok()?;

        let mut branch = Vec::new();
        let mut level = leaves.to_vec();
        let mut position = index;

        while level.len() > 1 {
            let sibling = level.get(position ^ 1).unwrap_or(&level[position]);
            branch.push(*sibling);
            level = next_level(&level);
            position >>= 1;
        }

        Some(MerkleBranch::new(branch, proof_index))
    }

    /// Recompute the root from a known leaf hash.
    ///
    /// An index of `-1` yields the all-zero hash regardless of the branch.
    pub fn reconstruct_root(&self, leaf: &Hash256) -> Hash256 {
        if self.index == NO_PROOF_INDEX {
            return ZERO_HASH;
        }

        // Same bit pattern, logical shifts.
        let mut cursor = self.index as u32;
        let mut running = *leaf;

        for sibling in &self.branch {
            running = if cursor & 1 != 0 {
                hash_pair(sibling, &running)
            } else {
                hash_pair(&running, sibling)
            };
            cursor >>= 1;
        }

        running
    }

    /// [`MerkleBranch::reconstruct_root`] with the result byte-reversed, for
    /// roots committed in the parent chain's display order.
    pub fn reconstruct_root_reversed(&self, leaf: &Hash256) -> Hash256 {
        reverse_bytes(&self.reconstruct_root(leaf))
    }

    /// Encoded size: count, hashes and the 4-byte index.
    pub fn serialized_size(&self) -> usize {
        varint_size(self.branch.len() as u64) + HASH_SIZE * self.branch.len() + MERKLE_INDEX_SIZE
    }

    /// Write the count, the hashes and the index.
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        write_varint(buf, self.branch.len() as u64)?;
        for hash in &self.branch {
            write_hash(buf, hash)?;
        }
        ensure_capacity(buf.remaining_mut(), MERKLE_INDEX_SIZE)?;
        buf.put_i32_le(self.index);
        Ok(())
    }

    /// Decode a branch. An empty branch still carries its index.
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        let count = read_count(buf, HASH_SIZE)?;
        let mut branch = Vec::with_capacity(count);
        for _ in 0..count {
            branch.push(read_hash(buf)?);
        }
        ensure_remaining(buf.remaining(), MERKLE_INDEX_SIZE)?;
        let index = buf.get_i32_le();
        Ok(MerkleBranch { branch, index })
    }
}
