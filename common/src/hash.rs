// PoW hashing primitives.
//
// The hash algorithm is a capability set {reset, update(bytes), finalize -> 32 bytes}.
// At present the only chainweb-version-selectable variant is SHA-512/256; the
// indirection exists so a future version can name a different engine without
// touching InnerMiner or CutExtender.

use digest::Digest;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use sha2::Sha512_256;
use std::fmt;

pub const HASH_SIZE: usize = 32;

/// A 32-byte block or PoW hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHash(pub [u8; HASH_SIZE]);

impl BlockHash {
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        BlockHash(bytes)
    }

    pub const fn zero() -> Self {
        BlockHash([0u8; HASH_SIZE])
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; HASH_SIZE]> for BlockHash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        BlockHash(bytes)
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.to_hex())
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// 256-bit unsigned difficulty target. A candidate hash `h` meets target `t` iff
/// `h <= t` under little-endian unsigned comparison.
pub type HashTarget = U256;

/// The maximum possible target, i.e. every hash meets it. Used by degenerate
/// single-chain test versions that have no real difficulty oracle.
pub fn max_target() -> HashTarget {
    U256::max_value()
}

/// Little-endian unsigned comparison of a digest against a target.
pub fn meets_target(digest: &[u8; HASH_SIZE], target: &HashTarget) -> bool {
    let value = U256::from_little_endian(digest);
    value <= *target
}

/// Capability set required of a PoW hash engine: reset, feed bytes, finalize.
pub trait HashAlgorithm {
    fn reset(&mut self);
    fn update(&mut self, bytes: &[u8]);
    fn finalize(&mut self) -> [u8; HASH_SIZE];

    /// One-shot convenience: reset, feed, finalize.
    fn hash_once(&mut self, bytes: &[u8]) -> [u8; HASH_SIZE] {
        self.reset();
        self.update(bytes);
        self.finalize()
    }
}

/// SHA-512/256 engine, the only algorithm named by any chainweb version under
/// consideration (see `ChainwebVersion::pow_hash_algo`).
#[derive(Default)]
pub struct Sha512_256Engine {
    inner: Sha512_256,
}

impl Sha512_256Engine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashAlgorithm for Sha512_256Engine {
    fn reset(&mut self) {
        Digest::reset(&mut self.inner);
    }

    fn update(&mut self, bytes: &[u8]) {
        Digest::update(&mut self.inner, bytes);
    }

    fn finalize(&mut self) -> [u8; HASH_SIZE] {
        let digest = self.inner.finalize_reset();
        let mut out = [0u8; HASH_SIZE];
        out.copy_from_slice(&digest);
        out
    }
}

/// Named PoW hash algorithm variants a chainweb version can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithmKind {
    Sha512_256,
}

impl HashAlgorithmKind {
    pub fn new_engine(&self) -> Box<dyn HashAlgorithm + Send> {
        match self {
            HashAlgorithmKind::Sha512_256 => Box::new(Sha512_256Engine::new()),
        }
    }
}

/// Pure PoW hash of an already-encoded header-without-hash buffer.
pub fn pow_hash(bytes: &[u8], algo: HashAlgorithmKind) -> [u8; HASH_SIZE] {
    let mut engine = algo.new_engine();
    engine.hash_once(bytes)
}
