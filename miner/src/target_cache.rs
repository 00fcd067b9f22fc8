// Per-epoch difficulty-target memoization, keyed by parent hash (§4.3).
//
// The cache is owned exclusively by `MinerLoop` and threaded by value between
// iterations (§5); it survives preemption and is only pruned after a
// successful mine.

use crate::collaborators::HeaderDbSet;
use cw_common::{BlockHash, BlockHeight, ChainId, HashTarget, SolvedHeader};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct TargetCache {
    entries: BTreeMap<BlockHash, (BlockHeight, HashTarget)>,
}

impl TargetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.entries.contains_key(hash)
    }

    /// Resolve the target for mining on `cid` against parent `p` (§4.3):
    ///
    /// 1. a cached entry for `p.hash` is returned unchanged;
    /// 2. absent a local header DB for `cid` (degenerate test versions), the
    ///    parent's own target is returned unchanged;
    /// 3. otherwise the difficulty oracle is consulted, the result is
    ///    inserted, and returned.
    pub fn target_for(&mut self, cid: ChainId, parent: &SolvedHeader, header_dbs: &dyn HeaderDbSet) -> HashTarget {
        if let Some((_, target)) = self.entries.get(&parent.hash) {
            return *target;
        }

        match header_dbs.for_chain(cid) {
            Some(db) => {
                let target = db.hash_target(parent);
                self.entries.insert(parent.hash, (parent.height(), target));
                target
            }
            None => parent.header.target,
        }
    }

    /// Prune to entries whose stored height is strictly greater than
    /// `new_tip_height - window`, bounding the cache at roughly
    /// `|Chains| * window` (§4.3, §8 cache-bound invariant).
    pub fn prune(&mut self, new_tip_height: BlockHeight, window: u64) {
        let floor = new_tip_height.saturating_sub(window);
        self.entries.retain(|_, (height, _)| *height > floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::HeaderDb;
    use cw_common::{BlockHeader, BlockHashRecord};
    use std::sync::Arc;

    struct FixedTarget(HashTarget);
    impl HeaderDb for FixedTarget {
        fn hash_target(&self, _parent: &SolvedHeader) -> HashTarget {
            self.0
        }
    }

    struct OneChainDbSet(Option<Arc<dyn HeaderDb>>);
    impl HeaderDbSet for OneChainDbSet {
        fn for_chain(&self, _cid: ChainId) -> Option<Arc<dyn HeaderDb>> {
            self.0.clone()
        }
        fn insert(&self, _cid: ChainId, _header: SolvedHeader) {}
    }

    fn solved(height: BlockHeight, hash_byte: u8, target: HashTarget) -> SolvedHeader {
        let header = BlockHeader {
            chain_id: ChainId::new(0),
            height,
            parent: BlockHash::zero(),
            adjacent: BlockHashRecord::new(),
            payload_hash: BlockHash::zero(),
            nonce: 0,
            time: 0,
            target,
            version: 0,
        };
        SolvedHeader {
            hash: BlockHash::new([hash_byte; 32]),
            header,
        }
    }

    #[test]
    fn degenerate_version_returns_parent_target_unchanged() {
        let mut cache = TargetCache::new();
        let db_set = OneChainDbSet(None);
        let parent = solved(5, 1, HashTarget::from(42u64));

        let target = cache.target_for(ChainId::new(0), &parent, &db_set);
        assert_eq!(target, HashTarget::from(42u64));
        assert!(cache.is_empty(), "degenerate lookups must not populate the cache");
    }

    #[test]
    fn oracle_consulted_once_then_cached() {
        let mut cache = TargetCache::new();
        let db: Arc<dyn HeaderDb> = Arc::new(FixedTarget(HashTarget::from(99u64)));
        let db_set = OneChainDbSet(Some(db));
        let parent = solved(5, 1, HashTarget::from(1u64));

        let t1 = cache.target_for(ChainId::new(0), &parent, &db_set);
        assert_eq!(t1, HashTarget::from(99u64));
        assert_eq!(cache.len(), 1);

        // Second lookup against the same parent hash hits the cache, not the oracle.
        let t2 = cache.target_for(ChainId::new(0), &parent, &db_set);
        assert_eq!(t2, HashTarget::from(99u64));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn pruning_keeps_only_recent_heights() {
        let mut cache = TargetCache::new();
        cache.entries.insert(BlockHash::new([1u8; 32]), (1, HashTarget::zero()));
        cache.entries.insert(BlockHash::new([2u8; 32]), (10, HashTarget::zero()));
        cache.entries.insert(BlockHash::new([3u8; 32]), (12, HashTarget::zero()));

        cache.prune(12, 5);

        assert_eq!(cache.len(), 2);
        for (_, (height, _)) in cache.entries.iter() {
            assert!(*height > 12 - 5);
        }
    }
}
