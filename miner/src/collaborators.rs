// Collaborator contracts (§6). These are the seams the mining core is built
// against; the node wires in real implementations (cut database, header
// databases, execution service, payload store). The core never reaches past
// these traits into concrete storage or network code.

use crate::config::MinerInfo;
use crate::error::ExecutorError;
use crate::payload::PayloadWithOutputs;
use async_trait::async_trait;
use cw_common::{cut_to_hashes, BlockHeader, ChainId, Cut, CutHashes, HashTarget, SolvedHeader};
use std::sync::Arc;

/// The node's view of the multi-chain tip, with wait-for-change semantics so
/// a miner can be preempted without polling.
#[async_trait]
pub trait CutStore: Send + Sync {
    async fn current(&self) -> Cut;

    /// Blocks until a cut strictly newer than `prev` is observed.
    async fn await_newer(&self, prev: &Cut) -> Cut;

    /// The wire-level publish contract (§6): only the hashes cross the
    /// boundary to a real cut database, which re-derives the full cut from
    /// headers it already has on disk.
    async fn publish(&self, hashes: CutHashes);

    /// Convenience for a caller that already holds the full `Cut` it just
    /// produced, e.g. `MinerLoop` right after `monotonic_extension`. The
    /// default narrows to `publish`'s `CutHashes` contract, so a real
    /// `CutStore` backed by on-disk headers never needs to override this.
    async fn publish_cut(&self, cut: &Cut) {
        self.publish(cut_to_hashes(None, cut)).await;
    }
}

/// The execution service that builds and validates block payloads.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn new_block(
        &self,
        miner_info: &MinerInfo,
        parent: &SolvedHeader,
    ) -> Result<PayloadWithOutputs, ExecutorError>;

    async fn validate_block(
        &self,
        header: &BlockHeader,
        payload: &PayloadWithOutputs,
    ) -> Result<(), ExecutorError>;
}

/// The difficulty oracle for a single chain's header database.
pub trait HeaderDb: Send + Sync {
    fn hash_target(&self, parent: &SolvedHeader) -> HashTarget;
}

/// The per-chain set of header databases.
pub trait HeaderDbSet: Send + Sync {
    fn for_chain(&self, cid: ChainId) -> Option<Arc<dyn HeaderDb>>;
    fn insert(&self, cid: ChainId, header: SolvedHeader);
}

/// The content-addressed payload store.
#[async_trait]
pub trait PayloadStore: Send + Sync {
    async fn add_new_payload(&self, payload: PayloadWithOutputs);
}
