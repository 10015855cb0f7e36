//! Header hash functions.
//!
//! Both the identity hash and the proof-of-work hash are computed over the
//! same 80-byte header core; only the hash algorithm differs.

use alloc::string::ToString;

use crate::consts::{HASH_SIZE, HEADER_CORE_SIZE};
use crate::error::{Error, Result};
use crate::hash::{double_sha256, Hash256};

/// A hash function over the serialized header core.
pub trait HeaderHasher {
    fn hash_header(&self, core: &[u8; HEADER_CORE_SIZE]) -> Result<Hash256>;
}

/// Double SHA256, used for the header identity hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleSha256;

impl HeaderHasher for DoubleSha256 {
    fn hash_header(&self, core: &[u8; HEADER_CORE_SIZE]) -> Result<Hash256> {
        Ok(double_sha256(core))
    }
}

/// Scrypt parameters for the proof-of-work hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowParams {
    /// CPU/memory cost `N`. Must be a power of two greater than one.
    pub cost: u32,
    /// Block size `r`.
    pub block_size: u32,
    /// Parallelism `p`.
    pub parallelism: u32,
}

impl PowParams {
    /// The consensus parameters: N = 1024, r = 1, p = 1.
    pub const CONSENSUS: PowParams = PowParams {
        cost: 1024,
        block_size: 1,
        parallelism: 1,
    };

    fn to_scrypt(self) -> Result<scrypt::Params> {
        if self.cost < 2 || !self.cost.is_power_of_two() {
            return Err(Error::HashComputation(alloc::format!(
                "scrypt cost {} is not a power of two greater than one",
                self.cost
            )));
        }
        let log_n = self.cost.trailing_zeros() as u8;
        scrypt::Params::new(log_n, self.block_size, self.parallelism, HASH_SIZE)
            .map_err(|err| Error::HashComputation(err.to_string()))
    }
}

impl Default for PowParams {
    fn default() -> Self {
        PowParams::CONSENSUS
    }
}

/// Scrypt with the header core as both password and salt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScryptHasher {
    params: PowParams,
}

impl ScryptHasher {
    pub fn new(params: PowParams) -> Self {
        ScryptHasher { params }
    }

    pub fn params(&self) -> PowParams {
        self.params
    }
}

impl HeaderHasher for ScryptHasher {
    fn hash_header(&self, core: &[u8; HEADER_CORE_SIZE]) -> Result<Hash256> {
        let params = self.params.to_scrypt().inspect_err(|err| {
            tracing::debug!(params = ?self.params, %err, "rejected scrypt parameters");
        })?;

        let mut hash = [0u8; HASH_SIZE];
        scrypt::scrypt(core, core, &params, &mut hash)
            .map_err(|err| Error::HashComputation(err.to_string()))?;
        Ok(hash)
    }
}
