// Chainweb version parameters: the finite chain graph, the PoW hash algorithm, the
// epoch window, and whether the fast miner is permitted. A version is a pure,
// static description the mining core is configured against; it owns no runtime
// state of its own.

use crate::chain::ChainId;
use crate::hash::HashAlgorithmKind;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("chainweb version {0:?} has no epoch window: POW miner used with non-POW chainweb")]
    NotProofOfWork(String),
    #[error("chainweb version {0:?} does not name a recognized PoW hash algorithm")]
    UnrecognizedAlgorithm(String),
}

/// A chainweb version: a fixed set of chains, their adjacency graph, and the
/// PoW parameters that apply to every chain in the set.
#[derive(Debug, Clone)]
pub struct ChainwebVersion {
    name: String,
    chains: BTreeSet<ChainId>,
    adjacents: BTreeMap<ChainId, BTreeSet<ChainId>>,
    window: Option<u64>,
    pow_hash_algo: Option<HashAlgorithmKind>,
    fast_mining: bool,
}

impl ChainwebVersion {
    /// Build a version from an explicit chain graph (edges are symmetrized).
    pub fn new(
        name: impl Into<String>,
        edges: impl IntoIterator<Item = (ChainId, ChainId)>,
        window: Option<u64>,
        pow_hash_algo: Option<HashAlgorithmKind>,
        fast_mining: bool,
    ) -> Self {
        let mut adjacents: BTreeMap<ChainId, BTreeSet<ChainId>> = BTreeMap::new();
        let mut chains = BTreeSet::new();
        for (a, b) in edges {
            chains.insert(a);
            chains.insert(b);
            adjacents.entry(a).or_default().insert(b);
            adjacents.entry(b).or_default().insert(a);
        }
        Self {
            name: name.into(),
            chains,
            adjacents,
            window,
            pow_hash_algo,
            fast_mining,
        }
    }

    /// A degenerate one-chain version with no adjacents, used by tests and by
    /// chain graphs that have not yet grown adjacency edges.
    pub fn single_chain_test(window: u64) -> Self {
        let cid = ChainId::new(0);
        let mut chains = BTreeSet::new();
        chains.insert(cid);
        Self {
            name: "singleton-test".to_string(),
            chains,
            adjacents: BTreeMap::new(),
            window: Some(window),
            pow_hash_algo: Some(HashAlgorithmKind::Sha512_256),
            fast_mining: false,
        }
    }

    /// A two-chain version where chain 0's only adjacent is chain 1 (§8 scenario 2).
    pub fn pair_test(window: u64) -> Self {
        Self::new(
            "pair-test",
            [(ChainId::new(0), ChainId::new(1))],
            Some(window),
            Some(HashAlgorithmKind::Sha512_256),
            false,
        )
    }

    /// A fully-connected `n`-chain version, convenient for cache-bound tests.
    pub fn complete_graph_test(n: u32, window: u64) -> Self {
        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push((ChainId::new(i), ChainId::new(j)));
            }
        }
        Self::new(
            "complete-graph-test",
            edges,
            Some(window),
            Some(HashAlgorithmKind::Sha512_256),
            false,
        )
    }

    /// A version with a finite chain graph but no epoch window: any miner
    /// instantiated against it must fail closed (§7.4).
    pub fn non_pow_test() -> Self {
        let cid = ChainId::new(0);
        let mut chains = BTreeSet::new();
        chains.insert(cid);
        Self {
            name: "non-pow-test".to_string(),
            chains,
            adjacents: BTreeMap::new(),
            window: None,
            pow_hash_algo: Some(HashAlgorithmKind::Sha512_256),
            fast_mining: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chains(&self) -> &BTreeSet<ChainId> {
        &self.chains
    }

    /// The fixed set of neighboring chains a header on `cid` must reference.
    pub fn adjacent_chains(&self, cid: ChainId) -> BTreeSet<ChainId> {
        self.adjacents.get(&cid).cloned().unwrap_or_default()
    }

    /// Epoch window width, or a fatal error if this version carries no PoW
    /// difficulty-adjustment schedule at all.
    pub fn window(&self) -> Result<u64, VersionError> {
        self.window
            .ok_or_else(|| VersionError::NotProofOfWork(self.name.clone()))
    }

    /// The PoW hash algorithm this version names, or a fatal error for a
    /// version this mapping does not recognize. There is deliberately no
    /// catch-all default.
    pub fn pow_hash_algo(&self) -> Result<HashAlgorithmKind, VersionError> {
        self.pow_hash_algo
            .ok_or_else(|| VersionError::UnrecognizedAlgorithm(self.name.clone()))
    }

    /// Whether `mine_fast` is permitted for this version. Unrecognized or
    /// production versions default to `false` rather than guessing.
    pub fn supports_fast_mining(&self) -> bool {
        self.fast_mining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_test_adjacency_is_symmetric() {
        let v = ChainwebVersion::pair_test(10);
        let mut expect0 = BTreeSet::new();
        expect0.insert(ChainId::new(1));
        let mut expect1 = BTreeSet::new();
        expect1.insert(ChainId::new(0));
        assert_eq!(v.adjacent_chains(ChainId::new(0)), expect0);
        assert_eq!(v.adjacent_chains(ChainId::new(1)), expect1);
    }

    #[test]
    fn non_pow_version_rejects_window() {
        let v = ChainwebVersion::non_pow_test();
        assert!(v.window().is_err());
        assert!(v.pow_hash_algo().is_ok());
    }

    #[test]
    fn complete_graph_has_all_pairs() {
        let v = ChainwebVersion::complete_graph_test(3, 5);
        assert_eq!(v.chains().len(), 3);
        for cid in v.chains() {
            assert_eq!(v.adjacent_chains(*cid).len(), 2);
        }
    }
}
