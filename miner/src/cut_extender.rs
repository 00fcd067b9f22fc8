// Cut extension (§4.4): pick a chain, resolve its adjacent-parent
// dependencies against the current cut, acquire a payload from the executor,
// look up (and cache) the target, mine a candidate, and splice the result
// back into the cut.

use crate::chain_selector::ChainSelector;
use crate::clock::Clock;
use crate::collaborators::{Executor, HeaderDbSet, PayloadStore};
use crate::config::{MinerConfig, MinerInfo};
use crate::error::MiningError;
use crate::inner_miner::{mine, mine_fast};
use crate::target_cache::TargetCache;
use cw_common::{
    monotonic_extension, BlockHashRecord, BlockHeader, ChainId, ChainwebVersion, Cut, SolvedHeader,
};
use log::{info, warn};
use std::sync::Arc;

pub struct CutExtender {
    version: Arc<ChainwebVersion>,
    executor: Arc<dyn Executor>,
    header_dbs: Arc<dyn HeaderDbSet>,
    payload_store: Arc<dyn PayloadStore>,
    chain_selector: ChainSelector,
    clock: Arc<dyn Clock>,
}

/// How the adjacent-parents check resolved for one candidate chain (§4.4 step 2).
enum AdjacentResolution {
    Resolved(BlockHashRecord),
    Blocked,
}

impl CutExtender {
    pub fn new(
        version: Arc<ChainwebVersion>,
        executor: Arc<dyn Executor>,
        header_dbs: Arc<dyn HeaderDbSet>,
        payload_store: Arc<dyn PayloadStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            version,
            executor,
            header_dbs,
            payload_store,
            chain_selector: ChainSelector::new(),
            clock,
        }
    }

    /// Resolve `cid`'s adjacent-parent dependencies against `cut` (§4.4 step 2).
    fn resolve_adjacents(&self, cid: ChainId, cut: &Cut) -> AdjacentResolution {
        let parent = &cut[&cid];
        let mut resolved = BlockHashRecord::new();

        for xcid in self.version.adjacent_chains(cid) {
            let b = match cut.get(&xcid) {
                Some(b) => b,
                None => return AdjacentResolution::Blocked,
            };

            if b.height() == parent.height() {
                resolved.insert(xcid, b.hash);
            } else if b.height() == parent.height() + 1 {
                resolved.insert(xcid, b.header.parent);
            } else {
                return AdjacentResolution::Blocked;
            }
        }

        AdjacentResolution::Resolved(resolved)
    }

    /// Run one cut-extension attempt to completion (§4.4). Blocked chains are
    /// retried internally with a fresh random chain choice and a cooperative
    /// yield (§9 open question); this only returns once a chain mines
    /// successfully or a non-recoverable error occurs.
    pub async fn extend(
        &self,
        cut: &Cut,
        nonce0: u64,
        mut cache: TargetCache,
        config: &MinerConfig,
    ) -> Result<(SolvedHeader, Cut, TargetCache), MiningError> {
        let chains: Vec<ChainId> = self.version.chains().iter().copied().collect();

        loop {
            let cid = self.chain_selector.sample(&chains);
            let parent = cut[&cid].clone();

            let adjacent = match self.resolve_adjacents(cid, cut) {
                AdjacentResolution::Resolved(adjacent) => adjacent,
                AdjacentResolution::Blocked => {
                    warn!(target: config.log_target.as_str(), "chain {cid} blocked, re-sampling");
                    tokio::task::yield_now().await;
                    continue;
                }
            };

            let payload = self
                .executor
                .new_block(&config.miner_info, &parent)
                .await
                .map_err(MiningError::from)?;

            let target = cache.target_for(cid, &parent, self.header_dbs.as_ref());

            let candidate = BlockHeader {
                chain_id: cid,
                height: parent.height() + 1,
                parent: parent.hash,
                adjacent,
                payload_hash: payload.payload_hash,
                nonce: 0,
                time: self.clock.now_micros(),
                target,
                version: 0,
            };

            let algo = self.version.pow_hash_algo()?;
            let solved = if self.version.supports_fast_mining() {
                mine_fast(&candidate, nonce0, algo, self.clock.as_ref(), config.refresh_interval).await
            } else {
                mine(&candidate, nonce0, algo, self.clock.as_ref(), config.refresh_interval).await
            };

            let new_cut = monotonic_extension(cut, &solved)?;

            info!(target: config.log_target.as_str(), "validate block payload");
            self.executor
                .validate_block(&solved.header, &payload)
                .await
                .map_err(MiningError::from)?;

            info!(target: config.log_target.as_str(), "add block payload to payload cas");
            self.payload_store.add_new_payload(payload).await;

            info!(target: config.log_target.as_str(), "add block to payload db");
            self.header_dbs.insert(cid, solved.clone());

            return Ok((solved, new_cut, cache));
        }
    }
}
