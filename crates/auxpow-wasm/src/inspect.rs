//! Header inspection for JavaScript callers.

use auxpow_core::hash::hash_to_display_hex;
use auxpow_core::{header_size_from_raw_bytes, BlockHeader};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// A decoded block header.
#[wasm_bindgen]
pub struct HeaderInspector {
    header: BlockHeader,
}

#[wasm_bindgen]
impl HeaderInspector {
    /// Decode a header from hex. Bytes after the header are ignored.
    #[wasm_bindgen(constructor)]
    pub fn new(raw_hex: &str) -> Result<HeaderInspector, JsValue> {
        let header = decode_hex_header(raw_hex).map_err(|e| JsValue::from_str(&e))?;
        Ok(HeaderInspector { header })
    }

    #[wasm_bindgen(getter)]
    pub fn version(&self) -> i32 {
        self.header.version
    }

    #[wasm_bindgen(getter, js_name = chainId)]
    pub fn chain_id(&self) -> u32 {
        self.header.chain_id()
    }

    #[wasm_bindgen(getter, js_name = isAuxpow)]
    pub fn is_auxpow(&self) -> bool {
        self.header.is_auxpow()
    }

    #[wasm_bindgen(getter, js_name = hasAuxpowPayload)]
    pub fn has_auxpow_payload(&self) -> bool {
        self.header.auxpow.is_some()
    }

    /// Identity hash in display format.
    #[wasm_bindgen(getter, js_name = blockHash)]
    pub fn block_hash(&self) -> String {
        hash_to_display_hex(&self.header.block_hash())
    }

    /// Proof-of-work hash in display format.
    #[wasm_bindgen(js_name = powHash)]
    pub fn pow_hash(&self) -> Result<String, JsValue> {
        self.header
            .pow_hash()
            .map(|hash| hash_to_display_hex(&hash))
            .map_err(|e| JsValue::from_str(&format!("Failed to hash header: {}", e)))
    }

    /// Whether the proof-of-work hash meets the header's own target.
    #[wasm_bindgen(js_name = checkProofOfWork)]
    pub fn check_proof_of_work(&self) -> Result<bool, JsValue> {
        self.header
            .check_proof_of_work()
            .map_err(|e| JsValue::from_str(&format!("Failed to hash header: {}", e)))
    }

    /// Encoded size of the header in bytes.
    pub fn size(&self) -> usize {
        self.header.serialized_size()
    }

    /// Header fields as a plain JS object.
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&HeaderSummary::from_header(&self.header))
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize header: {:?}", e)))
    }

    /// The decoded header, field for field, with hashes as byte arrays.
    #[wasm_bindgen(js_name = toRaw)]
    pub fn to_raw(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.header)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize header: {:?}", e)))
    }
}

/// Size of the header at the front of a hex-encoded buffer.
#[wasm_bindgen(js_name = headerSize)]
pub fn header_size(raw_hex: &str) -> Result<usize, JsValue> {
    let raw = hex::decode(raw_hex).map_err(|_| JsValue::from_str("Invalid header hex"))?;
    header_size_from_raw_bytes(&raw)
        .map_err(|e| JsValue::from_str(&format!("Failed to decode header: {}", e)))
}

fn decode_hex_header(raw_hex: &str) -> Result<BlockHeader, String> {
    let raw = hex::decode(raw_hex).map_err(|_| "Invalid header hex".to_string())?;
    BlockHeader::wire_decode(&mut &raw[..], auxpow_core::consts::HEADER_SIZE_PROTOCOL_VERSION)
        .map_err(|e| format!("Failed to decode header: {}", e))
}

/// Display-oriented view of a header.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HeaderSummary {
    pub hash: String,
    pub version: i32,
    pub chain_id: u32,
    pub previous_block_hash: String,
    pub merkle_root: String,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
    pub size: usize,
    pub auxpow: Option<AuxPowSummary>,
}

/// Display-oriented view of an AuxPoW payload.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuxPowSummary {
    pub parent_block_hash: String,
    pub coinbase_txid: String,
    pub coinbase_branch_len: usize,
    pub coinbase_index: i32,
    pub blockchain_branch_len: usize,
    pub blockchain_index: i32,
    pub parent_version: i32,
}

impl HeaderSummary {
    fn from_header(header: &BlockHeader) -> Self {
        HeaderSummary {
            hash: hash_to_display_hex(&header.block_hash()),
            version: header.version,
            chain_id: header.chain_id(),
            previous_block_hash: hash_to_display_hex(&header.prev_block_hash),
            merkle_root: hash_to_display_hex(&header.merkle_root),
            timestamp: header.timestamp,
            bits: header.bits,
            nonce: header.nonce,
            size: header.serialized_size(),
            auxpow: header.auxpow.as_ref().map(|auxpow| AuxPowSummary {
                parent_block_hash: hash_to_display_hex(&auxpow.parent_block_hash),
                coinbase_txid: hash_to_display_hex(&auxpow.coinbase_txid()),
                coinbase_branch_len: auxpow.coinbase_branch.branch.len(),
                coinbase_index: auxpow.coinbase_branch.index,
                blockchain_branch_len: auxpow.blockchain_branch.branch.len(),
                blockchain_index: auxpow.blockchain_branch.index,
                parent_version: auxpow.parent_block.version,
            }),
        }
    }
}
