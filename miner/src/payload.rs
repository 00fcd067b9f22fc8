// The payload side-channel: the execution service builds a payload for a
// candidate block and hands back its content hash plus the opaque bytes the
// payload store persists. The mining core never interprets payload content;
// it only ever threads the hash into the header and the bytes into the store.

use cw_common::BlockHash;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadWithOutputs {
    pub payload_hash: BlockHash,
    pub payload: Vec<u8>,
}

impl PayloadWithOutputs {
    pub fn new(payload_hash: BlockHash, payload: Vec<u8>) -> Self {
        Self {
            payload_hash,
            payload,
        }
    }
}
