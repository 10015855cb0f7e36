//! End-to-end header codec properties.

use auxpow_core::consts::{BLOCK_VERSION_AUXPOW, BLOCK_VERSION_CHAIN_START, HEADER_CORE_SIZE};
use auxpow_core::hash::{hash_pair, hash_to_display_hex, ZERO_HASH};
use auxpow_core::{
    double_sha256, header_size_from_raw_bytes, AuxPow, BlockHeader, HeaderCore, MerkleBranch,
    Transaction, TxOut,
};
use hex_literal::hex;
use proptest::prelude::*;

fn litecoin_genesis() -> BlockHeader {
    BlockHeader::from(HeaderCore {
        version: 1,
        prev_block_hash: ZERO_HASH,
        merkle_root: hex!("d9ced4ed1130f7b7faad9be25323ffafa33232a17c3edf6cfd97bee6bafbdd97"),
        timestamp: 1317972665,
        bits: 0x1e0ffff0,
        nonce: 2084524493,
    })
}

fn sample_auxpow(coinbase_len: usize, chain_len: usize) -> AuxPow {
    let coinbase_txn = Transaction::coinbase(
        vec![0x04, 0xff, 0xff, 0x00, 0x1d],
        vec![TxOut {
            value: 1_000,
            script_pubkey: vec![0x76, 0xa9],
        }],
    );
    AuxPow {
        coinbase_txn,
        parent_block_hash: [0x66; 32],
        coinbase_branch: MerkleBranch::new(vec![[0x01; 32]; coinbase_len], 0),
        blockchain_branch: MerkleBranch::new(vec![[0x02; 32]; chain_len], 3),
        parent_block: HeaderCore {
            version: 2,
            prev_block_hash: [0x03; 32],
            merkle_root: [0x04; 32],
            timestamp: 1_400_000_000,
            bits: 0x1b0404cb,
            nonce: 9,
        },
    }
}

fn flagged_header(auxpow: Option<AuxPow>) -> BlockHeader {
    let mut header = litecoin_genesis();
    header.version = 0x62 * BLOCK_VERSION_CHAIN_START | BLOCK_VERSION_AUXPOW | 2;
    header.auxpow = auxpow;
    header
}

#[test]
fn genesis_hashes() {
    let header = litecoin_genesis();
    assert_eq!(header.serialize_core().len(), HEADER_CORE_SIZE);
    assert_eq!(
        hash_to_display_hex(&header.block_hash()),
        "12a765e31ffd4059bada1e25190f6e98c99d9714d334efa41a195a7e7e04bfe2"
    );
    assert!(header.check_proof_of_work().unwrap());

    let mut tampered = header.clone();
    tampered.nonce += 1;
    assert!(!tampered.check_proof_of_work().unwrap());
}

#[test]
fn auxpow_roundtrip_for_branch_lengths() {
    for (coinbase_len, chain_len) in [(0, 0), (1, 0), (0, 1), (1, 1), (5, 3), (260, 2)] {
        let header = flagged_header(Some(sample_auxpow(coinbase_len, chain_len)));
        let raw = header.to_bytes();
        assert_eq!(raw.len(), header.serialized_size(), "{coinbase_len}/{chain_len}");

        let decoded = BlockHeader::from_bytes(&raw).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(header_size_from_raw_bytes(&raw).unwrap(), raw.len());
    }
}

#[test]
fn flagged_header_without_payload() {
    let header = flagged_header(None);
    let raw = header.to_bytes();
    assert_eq!(raw, header.serialize_core().to_vec());

    let decoded = BlockHeader::from_bytes(&raw).unwrap();
    assert!(decoded.is_auxpow());
    assert!(decoded.auxpow.is_none());
}

#[test]
fn coinbase_witness_is_not_carried() {
    let mut auxpow = sample_auxpow(1, 1);
    auxpow.coinbase_txn.inputs[0].witness = vec![vec![0u8; 32]];
    let header = flagged_header(Some(auxpow));

    let raw = header.to_bytes();
    assert_eq!(raw.len(), header.serialized_size());

    let decoded = BlockHeader::from_bytes(&raw).unwrap();
    let coinbase = &decoded.auxpow.as_ref().unwrap().coinbase_txn;
    assert!(coinbase.inputs[0].witness.is_empty());
    assert_eq!(
        coinbase.txid(),
        header.auxpow.as_ref().unwrap().coinbase_txn.txid()
    );
}

#[test]
fn hashes_depend_only_on_core() {
    let with_payload = flagged_header(Some(sample_auxpow(2, 2)));
    let other_payload = flagged_header(Some(sample_auxpow(0, 7)));
    let without_payload = flagged_header(None);

    assert_eq!(with_payload.block_hash(), other_payload.block_hash());
    assert_eq!(with_payload.block_hash(), without_payload.block_hash());
    assert_eq!(
        with_payload.pow_hash().unwrap(),
        other_payload.pow_hash().unwrap()
    );
}

#[test]
fn merkle_single_level_matches_double_hash() {
    let leaf = [0x0a; 32];
    let sibling = [0x0b; 32];

    let mut leaf_first = leaf.to_vec();
    leaf_first.extend_from_slice(&sibling);
    let left = MerkleBranch::new(vec![sibling], 0);
    assert_eq!(left.reconstruct_root(&leaf), double_sha256(&leaf_first));

    let right = MerkleBranch::new(vec![sibling], 1);
    assert_eq!(right.reconstruct_root(&leaf), hash_pair(&sibling, &leaf));
}

#[test]
fn header_size_ignores_trailing_bytes() {
    let header = flagged_header(Some(sample_auxpow(3, 1)));
    let mut buffer = header.to_bytes();
    let size = buffer.len();
    buffer.extend_from_slice(&[0x5a; 100]);
    assert_eq!(header_size_from_raw_bytes(&buffer).unwrap(), size);
}

#[test]
fn header_size_of_flagged_core_ignores_trailing_bytes() {
    let raw = flagged_header(None).to_bytes();

    for trailing in [&[0x5a; 100][..], &[0x00; 3][..], &[0x01][..]] {
        let mut buffer = raw.clone();
        buffer.extend_from_slice(trailing);
        assert_eq!(
            header_size_from_raw_bytes(&buffer).unwrap(),
            HEADER_CORE_SIZE,
            "{} trailing bytes",
            trailing.len()
        );
    }

    assert_eq!(header_size_from_raw_bytes(&raw).unwrap(), HEADER_CORE_SIZE);
    assert!(header_size_from_raw_bytes(&raw[..HEADER_CORE_SIZE - 1]).is_err());
}

fn arb_core() -> impl Strategy<Value = HeaderCore> {
    (
        any::<i32>(),
        any::<[u8; 32]>(),
        any::<[u8; 32]>(),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
    )
        .prop_map(|(version, prev_block_hash, merkle_root, timestamp, bits, nonce)| HeaderCore {
            version,
            prev_block_hash,
            merkle_root,
            timestamp,
            bits,
            nonce,
        })
}

fn arb_branch() -> impl Strategy<Value = MerkleBranch> {
    (prop::collection::vec(any::<[u8; 32]>(), 0..4), any::<i32>())
        .prop_map(|(branch, index)| MerkleBranch::new(branch, index))
}

fn arb_auxpow() -> impl Strategy<Value = AuxPow> {
    (
        prop::collection::vec(any::<u8>(), 0..120),
        any::<u64>(),
        any::<[u8; 32]>(),
        arb_branch(),
        arb_branch(),
        arb_core(),
    )
        .prop_map(
            |(script_sig, value, parent_block_hash, coinbase_branch, blockchain_branch, parent_block)| {
                AuxPow {
                    coinbase_txn: Transaction::coinbase(
                        script_sig,
                        vec![TxOut {
                            value,
                            script_pubkey: vec![0x51],
                        }],
                    ),
                    parent_block_hash,
                    coinbase_branch,
                    blockchain_branch,
                    parent_block,
                }
            },
        )
}

proptest! {
    #[test]
    fn plain_header_roundtrip(core in arb_core()) {
        let header = BlockHeader::from(core);
        let raw = header.to_bytes();
        prop_assert_eq!(raw.len(), HEADER_CORE_SIZE);
        prop_assert_eq!(header.serialized_size(), HEADER_CORE_SIZE);
        prop_assert_eq!(BlockHeader::from_bytes(&raw).unwrap(), header);
    }

    #[test]
    fn auxpow_header_roundtrip(core in arb_core(), auxpow in arb_auxpow()) {
        let mut header = BlockHeader::from(core);
        header.version |= BLOCK_VERSION_AUXPOW;
        header.auxpow = Some(auxpow);

        let raw = header.to_bytes();
        prop_assert_eq!(raw.len(), header.serialized_size());
        prop_assert_eq!(BlockHeader::from_bytes(&raw).unwrap(), header);
    }

    #[test]
    fn chain_id_is_upper_bits(k in 0i32..0x8000, r in 0i32..0x10000) {
        let mut header = litecoin_genesis();
        header.version = k * BLOCK_VERSION_CHAIN_START + r;
        prop_assert_eq!(header.chain_id(), k as u32);
    }

    #[test]
    fn no_proof_sentinel_is_zero(branch in prop::collection::vec(any::<[u8; 32]>(), 0..6), leaf in any::<[u8; 32]>()) {
        let branch = MerkleBranch::new(branch, -1);
        prop_assert_eq!(branch.reconstruct_root(&leaf), ZERO_HASH);
        prop_assert_eq!(branch.reconstruct_root_reversed(&leaf), ZERO_HASH);
    }

    #[test]
    fn reversed_root_is_byte_reverse(branch in arb_branch(), leaf in any::<[u8; 32]>()) {
        let mut expected = branch.reconstruct_root(&leaf);
        expected.reverse();
        prop_assert_eq!(branch.reconstruct_root_reversed(&leaf), expected);
    }
}
