use crate::chain::ChainId;
use crate::hash::BlockHash;
use crate::header::BlockHeader;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A header paired with its own PoW hash, so splicing a cut never needs to
/// recompute a hash it already knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvedHeader {
    pub header: BlockHeader,
    pub hash: BlockHash,
}

impl SolvedHeader {
    pub fn height(&self) -> crate::chain::BlockHeight {
        self.header.height
    }
}

/// The adjacent-parent dependencies a header on some chain references,
/// dictated by the chain graph of the active chainweb version.
pub type BlockHashRecord = BTreeMap<ChainId, BlockHash>;

/// A consistent slice across all chains: one header per chain.
pub type Cut = BTreeMap<ChainId, SolvedHeader>;

/// Wire form of a cut: just the hashes, plus an optional origin peer (`None`
/// for cuts this node produced itself).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutHashes {
    pub origin: Option<String>,
    pub hashes: BTreeMap<ChainId, BlockHash>,
}

pub fn cut_to_hashes(origin: Option<String>, cut: &Cut) -> CutHashes {
    CutHashes {
        origin,
        hashes: cut.iter().map(|(cid, solved)| (*cid, solved.hash)).collect(),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CutError {
    #[error("chain {0} is not part of this cut")]
    UnknownChain(ChainId),
    #[error("extension header's parent does not match the current tip on chain {0}")]
    NotMonotonic(ChainId),
    #[error("cut invariant violated: chain {0} references an unresolvable adjacent parent on chain {1}")]
    InvariantViolated(ChainId, ChainId),
}

/// Checks that for every chain, each adjacent-parent reference resolves to a
/// header actually present in the cut, at either the same height as the
/// referencing chain's tip or one height below it.
pub fn check_cut_invariant(cut: &Cut) -> Result<(), CutError> {
    for (cid, solved) in cut.iter() {
        for (xcid, xhash) in solved.header.adjacent.iter() {
            let adjacent_tip = cut.get(xcid).ok_or(CutError::UnknownChain(*xcid))?;
            let resolves = adjacent_tip.hash == *xhash || adjacent_tip.header.parent == *xhash;
            if !resolves {
                return Err(CutError::InvariantViolated(*cid, *xcid));
            }
        }
    }
    Ok(())
}

/// Splices `new_header` into `cut` on its chain, iff doing so is monotonic
/// (parent matches the current tip) and the resulting cut still satisfies the
/// cut invariant. Every other chain is left untouched.
pub fn monotonic_extension(cut: &Cut, new_header: &SolvedHeader) -> Result<Cut, CutError> {
    let cid = new_header.header.chain_id;
    let current_tip = cut.get(&cid).ok_or(CutError::UnknownChain(cid))?;

    if new_header.header.parent != current_tip.hash {
        return Err(CutError::NotMonotonic(cid));
    }

    let mut extended = cut.clone();
    extended.insert(cid, new_header.clone());
    check_cut_invariant(&extended)?;

    Ok(extended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashTarget;

    fn header_at(chain: u32, height: u64, parent: BlockHash, adjacent: BlockHashRecord) -> SolvedHeader {
        let header = BlockHeader {
            chain_id: ChainId::new(chain),
            height,
            parent,
            adjacent,
            payload_hash: BlockHash::zero(),
            nonce: 0,
            time: 0,
            target: HashTarget::max_value(),
            version: 0,
        };
        SolvedHeader {
            hash: BlockHash::new([(chain as u8).wrapping_add(height as u8); 32]),
            header,
        }
    }

    #[test]
    fn monotonic_extension_only_touches_its_own_chain() {
        let a0 = header_at(0, 0, BlockHash::zero(), BlockHashRecord::new());
        let b0 = header_at(1, 0, BlockHash::zero(), BlockHashRecord::new());
        let mut cut = Cut::new();
        cut.insert(ChainId::new(0), a0.clone());
        cut.insert(ChainId::new(1), b0.clone());

        let mut a1 = header_at(0, 1, a0.hash, BlockHashRecord::new());
        a1.hash = BlockHash::new([99u8; 32]);

        let extended = monotonic_extension(&cut, &a1).unwrap();
        assert_eq!(extended.get(&ChainId::new(0)).unwrap(), &a1);
        assert_eq!(extended.get(&ChainId::new(1)).unwrap(), &b0);
    }

    #[test]
    fn non_matching_parent_is_rejected() {
        let a0 = header_at(0, 0, BlockHash::zero(), BlockHashRecord::new());
        let mut cut = Cut::new();
        cut.insert(ChainId::new(0), a0);

        let bogus = header_at(0, 1, BlockHash::new([42u8; 32]), BlockHashRecord::new());
        assert_eq!(
            monotonic_extension(&cut, &bogus),
            Err(CutError::NotMonotonic(ChainId::new(0)))
        );
    }

    #[test]
    fn invariant_accepts_same_height_or_one_less() {
        let a0 = header_at(0, 0, BlockHash::zero(), BlockHashRecord::new());
        let b0 = header_at(1, 0, BlockHash::zero(), BlockHashRecord::new());

        let mut adjacent_same_height = BlockHashRecord::new();
        adjacent_same_height.insert(ChainId::new(1), b0.hash);
        let a1 = header_at(0, 1, a0.hash, adjacent_same_height);

        let mut cut = Cut::new();
        cut.insert(ChainId::new(0), a1.clone());
        cut.insert(ChainId::new(1), b0);
        assert!(check_cut_invariant(&cut).is_ok());
    }
}
