//! Block header codec and merged-mining (AuxPoW) support for scrypt chains.
//!
//! This crate provides pure Rust implementations of:
//! - The 80-byte block header core and its AuxPoW-extended wire form
//! - AuxPoW payload encoding with coinbase and chain Merkle branches
//! - Merkle branch root reconstruction (plain and byte-reversed)
//! - Identity hashing (double SHA256) and proof-of-work hashing (scrypt)
//! - The transaction and CompactSize codecs the header codec depends on

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod auxpow;
pub mod consts;
pub mod difficulty;
pub mod error;
pub mod hash;
pub mod header;
pub mod merkle;
pub mod pow;
pub mod transaction;
pub mod varint;

pub use auxpow::AuxPow;
pub use error::{Error, Result};
pub use hash::{double_sha256, Hash256};
pub use header::{header_size_from_raw_bytes, BlockHeader, HeaderCore};
pub use merkle::{compute_merkle_root, MerkleBranch};
pub use pow::{DoubleSha256, HeaderHasher, PowParams, ScryptHasher};
pub use transaction::{OutPoint, Transaction, TxIn, TxOut};
