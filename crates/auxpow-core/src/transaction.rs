//! Transaction encoding in witness and stripped (non-witness) forms.
//!
//! The AuxPoW payload carries the parent chain's coinbase transaction, so
//! the header codec needs a full transaction codec. Script contents are
//! carried opaquely.

use alloc::vec;
use alloc::vec::Vec;

use bytes::{Buf, BufMut};

use crate::consts::HASH_SIZE;
use crate::error::{ensure_capacity, ensure_remaining, Error, Result};
use crate::hash::{double_sha256, read_hash, write_hash, Hash256, ZERO_HASH};
use crate::varint::{read_count, varint_size, write_varint};

/// Version used for freshly built transactions.
pub const TX_VERSION: i32 = 1;

/// Index value marking the null outpoint of a coinbase input.
pub const NULL_OUTPOINT_INDEX: u32 = 0xFFFF_FFFF;

/// Final sequence number.
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

const WITNESS_MARKER: u8 = 0x00;
const WITNESS_FLAG: u8 = 0x01;

/// Smallest possible input: outpoint, empty script, sequence.
const MIN_TX_IN_SIZE: usize = HASH_SIZE + 4 + 1 + 4;

/// Smallest possible output: value and empty script.
const MIN_TX_OUT_SIZE: usize = 8 + 1;

/// A reference to an output of a previous transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutPoint {
    /// Transaction ID of the referenced transaction.
    pub txid: Hash256,
    /// Output index within that transaction.
    pub index: u32,
}

impl OutPoint {
    /// The outpoint spent by coinbase inputs.
    pub const fn null() -> Self {
        OutPoint {
            txid: ZERO_HASH,
            index: NULL_OUTPOINT_INDEX,
        }
    }

    /// Whether this is the coinbase null outpoint.
    pub fn is_null(&self) -> bool {
        self.index == NULL_OUTPOINT_INDEX && self.txid == ZERO_HASH
    }
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxIn {
    pub previous_output: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    /// Witness stack; empty for non-witness inputs.
    pub witness: Vec<Vec<u8>>,
}

impl TxIn {
    fn base_size(&self) -> usize {
        HASH_SIZE + 4 + var_bytes_size(&self.script_sig) + 4
    }

    fn witness_size(&self) -> usize {
        varint_size(self.witness.len() as u64)
            + self.witness.iter().map(|item| var_bytes_size(item)).sum::<usize>()
    }
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxOut {
    pub value: u64,
    pub script_pubkey: Vec<u8>,
}

impl TxOut {
    fn size(&self) -> usize {
        8 + var_bytes_size(&self.script_pubkey)
    }
}

/// A transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    /// Build a coinbase transaction spending the null outpoint.
    pub fn coinbase(script_sig: Vec<u8>, outputs: Vec<TxOut>) -> Self {
        Transaction {
            version: TX_VERSION,
            inputs: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig,
                sequence: SEQUENCE_FINAL,
                witness: Vec::new(),
            }],
            outputs,
            lock_time: 0,
        }
    }

    /// Whether this transaction has a single input spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_output.is_null()
    }

    /// Whether any input carries witness data.
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }

    /// Transaction ID: double SHA256 of the stripped serialization.
    pub fn txid(&self) -> Hash256 {
        double_sha256(&self.to_stripped_bytes())
    }

    /// Size of the stripped serialization.
    pub fn stripped_size(&self) -> usize {
        4 + varint_size(self.inputs.len() as u64)
            + self.inputs.iter().map(TxIn::base_size).sum::<usize>()
            + varint_size(self.outputs.len() as u64)
            + self.outputs.iter().map(TxOut::size).sum::<usize>()
            + 4
    }

    /// Size of the full serialization, including witness data if present.
    pub fn serialized_size(&self) -> usize {
        if !self.has_witness() {
            return self.stripped_size();
        }
        self.stripped_size()
            + 2
            + self.inputs.iter().map(TxIn::witness_size).sum::<usize>()
    }

    /// Encode the full form: witness serialization when any input has
    /// witness data, otherwise identical to [`Transaction::encode_stripped`].
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        self.write(buf, self.has_witness())
    }

    /// Encode without witness data.
    pub fn encode_stripped<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        self.write(buf, false)
    }

    /// Full serialization as a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_size());
        // Writing into a Vec cannot run out of capacity.
        let _ = self.encode(&mut out);
        out
    }

    /// Stripped serialization as a byte vector.
    pub fn to_stripped_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.stripped_size());
        // Writing into a Vec cannot run out of capacity.
        let _ = self.encode_stripped(&mut out);
        out
    }

    /// Decode either form, detecting the witness marker and flag.
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        Self::read(buf, true)
    }

    /// Decode the stripped form. A zero input count is taken literally.
    pub fn decode_stripped<B: Buf>(buf: &mut B) -> Result<Self> {
        Self::read(buf, false)
    }

    fn write<B: BufMut>(&self, buf: &mut B, with_witness: bool) -> Result<()> {
        ensure_capacity(buf.remaining_mut(), 4)?;
        buf.put_i32_le(self.version);

        if with_witness {
            ensure_capacity(buf.remaining_mut(), 2)?;
            buf.put_u8(WITNESS_MARKER);
            buf.put_u8(WITNESS_FLAG);
        }

        write_varint(buf, self.inputs.len() as u64)?;
        for input in &self.inputs {
            write_hash(buf, &input.previous_output.txid)?;
            ensure_capacity(buf.remaining_mut(), 4)?;
            buf.put_u32_le(input.previous_output.index);
            write_var_bytes(buf, &input.script_sig)?;
            ensure_capacity(buf.remaining_mut(), 4)?;
            buf.put_u32_le(input.sequence);
        }

        write_varint(buf, self.outputs.len() as u64)?;
        for output in &self.outputs {
            ensure_capacity(buf.remaining_mut(), 8)?;
            buf.put_u64_le(output.value);
            write_var_bytes(buf, &output.script_pubkey)?;
        }

        if with_witness {
            for input in &self.inputs {
                write_varint(buf, input.witness.len() as u64)?;
                for item in &input.witness {
                    write_var_bytes(buf, item)?;
                }
            }
        }

        ensure_capacity(buf.remaining_mut(), 4)?;
        buf.put_u32_le(self.lock_time);
        Ok(())
    }

    fn read<B: Buf>(buf: &mut B, allow_witness: bool) -> Result<Self> {
        ensure_remaining(buf.remaining(), 4)?;
        let version = buf.get_i32_le();

        let mut input_count = read_count(buf, 0)?;
        let mut with_witness = false;
        if allow_witness && input_count == 0 {
            // A zero input count is the witness marker; the flag follows.
            ensure_remaining(buf.remaining(), 1)?;
            let flag = buf.get_u8();
            if flag != WITNESS_FLAG {
                return Err(Error::InvalidWitnessFlag(flag));
            }
            with_witness = true;
            input_count = read_count(buf, MIN_TX_IN_SIZE)?;
        } else {
            ensure_remaining(buf.remaining(), input_count.saturating_mul(MIN_TX_IN_SIZE))?;
        }

        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            let txid = read_hash(buf)?;
            ensure_remaining(buf.remaining(), 4)?;
            let index = buf.get_u32_le();
            let script_sig = read_var_bytes(buf)?;
            ensure_remaining(buf.remaining(), 4)?;
            let sequence = buf.get_u32_le();
            inputs.push(TxIn {
                previous_output: OutPoint { txid, index },
                script_sig,
                sequence,
                witness: Vec::new(),
            });
        }

        let output_count = read_count(buf, MIN_TX_OUT_SIZE)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            ensure_remaining(buf.remaining(), 8)?;
            let value = buf.get_u64_le();
            let script_pubkey = read_var_bytes(buf)?;
            outputs.push(TxOut { value, script_pubkey });
        }

        if with_witness {
            for input in &mut inputs {
                let item_count = read_count(buf, 1)?;
                let mut witness = Vec::with_capacity(item_count);
                for _ in 0..item_count {
                    witness.push(read_var_bytes(buf)?);
                }
                input.witness = witness;
            }
        }

        ensure_remaining(buf.remaining(), 4)?;
        let lock_time = buf.get_u32_le();

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }
}

fn var_bytes_size(bytes: &[u8]) -> usize {
    varint_size(bytes.len() as u64) + bytes.len()
}

fn write_var_bytes<B: BufMut>(buf: &mut B, bytes: &[u8]) -> Result<()> {
    write_varint(buf, bytes.len() as u64)?;
    ensure_capacity(buf.remaining_mut(), bytes.len())?;
    buf.put_slice(bytes);
    Ok(())
}

fn read_var_bytes<B: Buf>(buf: &mut B) -> Result<Vec<u8>> {
    let len = read_count(buf, 1)?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_coinbase() -> Transaction {
        Transaction::coinbase(
            vec![0x03, 0xf8, 0x59, 0x0d, 0x01, 0x02, 0x03, 0x04],
            vec![
                TxOut {
                    value: 312_500_000,
                    script_pubkey: vec![0x00, 0x14, 0xab, 0xcd],
                },
                TxOut {
                    value: 0,
                    script_pubkey: vec![0x6a, 0x24, 0xaa, 0x21, 0xa9, 0xed],
                },
            ],
        )
    }

    #[test]
    fn test_coinbase_layout() {
        let tx = sample_coinbase();
        assert!(tx.is_coinbase());
        assert!(!tx.has_witness());

        let raw = tx.to_bytes();
        assert_eq!(&raw[0..4], &1i32.to_le_bytes());
        // Input count
        assert_eq!(raw[4], 0x01);
        // Null outpoint
        assert_eq!(&raw[5..37], &[0u8; 32]);
        assert_eq!(&raw[37..41], &[0xff; 4]);
        assert_eq!(raw.len(), tx.serialized_size());
        assert_eq!(raw, tx.to_stripped_bytes());
    }

    #[test]
    fn test_witness_form_is_detected() {
        let mut tx = sample_coinbase();
        tx.inputs[0].witness = vec![vec![0u8; 32]];

        let raw = tx.to_bytes();
        assert_eq!(&raw[4..6], &[WITNESS_MARKER, WITNESS_FLAG]);
        assert_eq!(raw.len(), tx.serialized_size());
        assert!(tx.serialized_size() > tx.stripped_size());

        let decoded = Transaction::decode(&mut &raw[..]).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_txid_ignores_witness() {
        let tx = sample_coinbase();
        let mut witnessed = tx.clone();
        witnessed.inputs[0].witness = vec![vec![0xaa; 32]];

        assert_eq!(tx.txid(), witnessed.txid());
        assert_eq!(tx.to_stripped_bytes(), witnessed.to_stripped_bytes());
    }

    #[test]
    fn test_decode_stripped_drops_nothing() {
        let tx = sample_coinbase();
        let raw = tx.to_stripped_bytes();
        let mut buf = &raw[..];
        let decoded = Transaction::decode_stripped(&mut buf).unwrap();
        assert_eq!(decoded, tx);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_invalid_witness_flag() {
        let raw = [0x01, 0x00, 0x00, 0x00, 0x00, 0x02];
        let err = Transaction::decode(&mut &raw[..]).unwrap_err();
        assert_eq!(err, Error::InvalidWitnessFlag(0x02));
    }

    #[test]
    fn test_truncated_transaction() {
        let raw = sample_coinbase().to_bytes();
        for len in [0, 3, 20, raw.len() - 1] {
            let err = Transaction::decode(&mut &raw[..len]).unwrap_err();
            assert!(err.is_unexpected_end(), "length {len}: {err:?}");
        }
    }
}
