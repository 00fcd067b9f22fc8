// Fixed-offset header encoding.
//
// Byte layout of `encode_without_hash`, fixed for all versions so InnerMiner
// can mutate nonce/time in place without touching anything else:
//
//   [0, 8)    nonce, little-endian u64
//   [8, 16)   creation time, little-endian u64 (microseconds)
//   [16, 20)  chain id, little-endian u32
//   [20, 28)  height, little-endian u64
//   [28, 60)  parent hash, 32 bytes
//   [60, 64)  version tag, little-endian u32
//   [64, 96)  payload hash, 32 bytes
//   [96, 128) target, little-endian u256 (32 bytes)
//   [128,130) adjacent-parent count, little-endian u16
//   [130, ..) adjacent-parent entries: (chain id u32 LE, hash 32 bytes), ascending by chain id

use crate::chain::{BlockHeight, ChainId};
use crate::cut::BlockHashRecord;
use crate::hash::{BlockHash, HashTarget, HASH_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NONCE_OFFSET: usize = 0;
pub const TIME_OFFSET: usize = 8;
const CHAIN_ID_OFFSET: usize = 16;
const HEIGHT_OFFSET: usize = 20;
const PARENT_OFFSET: usize = 28;
const VERSION_OFFSET: usize = 60;
const PAYLOAD_OFFSET: usize = 64;
const TARGET_OFFSET: usize = 96;
const ADJACENT_COUNT_OFFSET: usize = 128;
const ADJACENT_ENTRIES_OFFSET: usize = 130;
const ADJACENT_ENTRY_SIZE: usize = 4 + HASH_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub chain_id: ChainId,
    pub height: BlockHeight,
    pub parent: BlockHash,
    pub adjacent: BlockHashRecord,
    pub payload_hash: BlockHash,
    pub nonce: u64,
    pub time: u64,
    pub target: HashTarget,
    pub version: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderDecodeError {
    #[error("header buffer too short: expected at least {expected} bytes, got {got}")]
    TooShort { expected: usize, got: usize },
    #[error("adjacent-parent entries truncated")]
    TruncatedAdjacent,
}

impl BlockHeader {
    /// Canonical, fixed-offset encoding used both for the self hash and as the
    /// mutable buffer fed to `InnerMiner`.
    pub fn encode_without_hash(&self) -> Vec<u8> {
        let mut buf = vec![0u8; ADJACENT_ENTRIES_OFFSET + self.adjacent.len() * ADJACENT_ENTRY_SIZE];

        write_nonce(&mut buf, self.nonce);
        write_time(&mut buf, self.time);
        buf[CHAIN_ID_OFFSET..CHAIN_ID_OFFSET + 4].copy_from_slice(&self.chain_id.as_u32().to_le_bytes());
        buf[HEIGHT_OFFSET..HEIGHT_OFFSET + 8].copy_from_slice(&self.height.to_le_bytes());
        buf[PARENT_OFFSET..PARENT_OFFSET + HASH_SIZE].copy_from_slice(self.parent.as_bytes());
        buf[VERSION_OFFSET..VERSION_OFFSET + 4].copy_from_slice(&self.version.to_le_bytes());
        buf[PAYLOAD_OFFSET..PAYLOAD_OFFSET + HASH_SIZE].copy_from_slice(self.payload_hash.as_bytes());

        let mut target_bytes = [0u8; HASH_SIZE];
        self.target.to_little_endian(&mut target_bytes);
        buf[TARGET_OFFSET..TARGET_OFFSET + HASH_SIZE].copy_from_slice(&target_bytes);

        buf[ADJACENT_COUNT_OFFSET..ADJACENT_COUNT_OFFSET + 2]
            .copy_from_slice(&(self.adjacent.len() as u16).to_le_bytes());

        let mut offset = ADJACENT_ENTRIES_OFFSET;
        for (cid, hash) in self.adjacent.iter() {
            buf[offset..offset + 4].copy_from_slice(&cid.as_u32().to_le_bytes());
            buf[offset + 4..offset + 4 + HASH_SIZE].copy_from_slice(hash.as_bytes());
            offset += ADJACENT_ENTRY_SIZE;
        }

        buf
    }

    pub fn decode_without_hash(bytes: &[u8]) -> Result<Self, HeaderDecodeError> {
        if bytes.len() < ADJACENT_ENTRIES_OFFSET {
            return Err(HeaderDecodeError::TooShort {
                expected: ADJACENT_ENTRIES_OFFSET,
                got: bytes.len(),
            });
        }

        let nonce = read_nonce(bytes);
        let time = read_time(bytes);
        let chain_id = ChainId::new(u32::from_le_bytes(
            bytes[CHAIN_ID_OFFSET..CHAIN_ID_OFFSET + 4].try_into().unwrap(),
        ));
        let height = u64::from_le_bytes(bytes[HEIGHT_OFFSET..HEIGHT_OFFSET + 8].try_into().unwrap());
        let parent = BlockHash::new(
            bytes[PARENT_OFFSET..PARENT_OFFSET + HASH_SIZE].try_into().unwrap(),
        );
        let version = u32::from_le_bytes(bytes[VERSION_OFFSET..VERSION_OFFSET + 4].try_into().unwrap());
        let payload_hash = BlockHash::new(
            bytes[PAYLOAD_OFFSET..PAYLOAD_OFFSET + HASH_SIZE].try_into().unwrap(),
        );
        let target = HashTarget::from_little_endian(&bytes[TARGET_OFFSET..TARGET_OFFSET + HASH_SIZE]);

        let count = u16::from_le_bytes(
            bytes[ADJACENT_COUNT_OFFSET..ADJACENT_COUNT_OFFSET + 2]
                .try_into()
                .unwrap(),
        ) as usize;

        let needed = ADJACENT_ENTRIES_OFFSET + count * ADJACENT_ENTRY_SIZE;
        if bytes.len() < needed {
            return Err(HeaderDecodeError::TruncatedAdjacent);
        }

        let mut adjacent = BlockHashRecord::new();
        let mut offset = ADJACENT_ENTRIES_OFFSET;
        for _ in 0..count {
            let cid = ChainId::new(u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap()));
            let hash = BlockHash::new(
                bytes[offset + 4..offset + 4 + HASH_SIZE].try_into().unwrap(),
            );
            adjacent.insert(cid, hash);
            offset += ADJACENT_ENTRY_SIZE;
        }

        Ok(BlockHeader {
            chain_id,
            height,
            parent,
            adjacent,
            payload_hash,
            nonce,
            time,
            target,
            version,
        })
    }
}

/// In-place mutator: touches only bytes [0,8).
#[inline]
pub fn write_nonce(buf: &mut [u8], nonce: u64) {
    buf[NONCE_OFFSET..NONCE_OFFSET + 8].copy_from_slice(&nonce.to_le_bytes());
}

/// In-place mutator: touches only bytes [8,16).
#[inline]
pub fn write_time(buf: &mut [u8], time: u64) {
    buf[TIME_OFFSET..TIME_OFFSET + 8].copy_from_slice(&time.to_le_bytes());
}

#[inline]
pub fn read_nonce(buf: &[u8]) -> u64 {
    u64::from_le_bytes(buf[NONCE_OFFSET..NONCE_OFFSET + 8].try_into().unwrap())
}

#[inline]
pub fn read_time(buf: &[u8]) -> u64 {
    u64::from_le_bytes(buf[TIME_OFFSET..TIME_OFFSET + 8].try_into().unwrap())
}
