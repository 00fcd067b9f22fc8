//! In-memory reference implementations of the §6 collaborator contracts,
//! used only by this crate's own test suite (integration tests included).
//! There is no real network, storage engine, or execution VM here -- see §1,
//! "out of scope (external collaborators, referenced only by contract)".

use crate::collaborators::{CutStore, Executor, HeaderDb, HeaderDbSet, PayloadStore};
use crate::config::MinerInfo;
use crate::error::ExecutorError;
use crate::payload::PayloadWithOutputs;
use async_trait::async_trait;
use cw_common::{BlockHash, BlockHeader, ChainId, Cut, CutHashes, HashTarget, SolvedHeader};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// An in-memory `CutStore` with wait-for-change semantics backed by a
/// `tokio::sync::Notify`.
pub struct InMemoryCutStore {
    current: Mutex<Cut>,
    notify: Notify,
}

impl InMemoryCutStore {
    pub fn new(genesis: Cut) -> Arc<Self> {
        Arc::new(Self {
            current: Mutex::new(genesis),
            notify: Notify::new(),
        })
    }

    /// Test/driver hook: force-publish a cut, as if it had arrived over the
    /// wire from a peer, to exercise preemption (§8 scenario 3).
    pub fn publish_external(&self, cut: Cut) {
        *self.current.lock().unwrap() = cut;
        self.notify.notify_waiters();
    }

    pub fn snapshot(&self) -> Cut {
        self.current.lock().unwrap().clone()
    }
}

fn cut_is_newer(candidate: &Cut, prev: &Cut) -> bool {
    candidate.iter().any(|(cid, solved)| match prev.get(cid) {
        Some(existing) => solved.height() > existing.height(),
        None => true,
    })
}

#[async_trait]
impl CutStore for InMemoryCutStore {
    async fn current(&self) -> Cut {
        self.current.lock().unwrap().clone()
    }

    async fn await_newer(&self, prev: &Cut) -> Cut {
        loop {
            // Register interest before checking the condition: `notify_waiters`
            // wakes only `Notified` futures that already exist at the time it
            // is called, so creating this one after the check (and before
            // awaiting it) would miss a publish that lands in between.
            let notified = self.notify.notified();
            {
                let current = self.current.lock().unwrap();
                if cut_is_newer(&current, prev) {
                    return current.clone();
                }
            }
            notified.await;
        }
    }

    async fn publish(&self, _hashes: CutHashes) {
        // The miner only ever calls this with hashes derived from a cut it
        // already produced via `monotonic_extension` against `current`, so
        // there is nothing left to merge here; just wake any waiters. Real
        // progress for this mock happens through `publish_cut` below, which
        // is what `MinerLoop::run_forever` actually calls.
        self.notify.notify_waiters();
    }

    async fn publish_cut(&self, cut: &Cut) {
        *self.current.lock().unwrap() = cut.clone();
        self.notify.notify_waiters();
    }
}

/// A trivial `Executor` that hands back a fixed-size payload keyed only by
/// parent height, and always validates successfully.
pub struct TrivialExecutor;

#[async_trait]
impl Executor for TrivialExecutor {
    async fn new_block(
        &self,
        _miner_info: &MinerInfo,
        parent: &SolvedHeader,
    ) -> Result<PayloadWithOutputs, ExecutorError> {
        let mut payload_hash = [0u8; 32];
        payload_hash[0..8].copy_from_slice(&parent.height().to_le_bytes());
        payload_hash[8] = parent.header.chain_id.as_u32() as u8;
        Ok(PayloadWithOutputs::new(
            BlockHash::new(payload_hash),
            vec![0u8; 8],
        ))
    }

    async fn validate_block(
        &self,
        _header: &BlockHeader,
        _payload: &PayloadWithOutputs,
    ) -> Result<(), ExecutorError> {
        Ok(())
    }
}

/// An `Executor` whose payload build always fails, for exercising the
/// recoverable payload-failure path (§7.3).
pub struct FailingExecutor;

#[async_trait]
impl Executor for FailingExecutor {
    async fn new_block(
        &self,
        _miner_info: &MinerInfo,
        _parent: &SolvedHeader,
    ) -> Result<PayloadWithOutputs, ExecutorError> {
        Err(ExecutorError::Build("mock executor always fails".to_string()))
    }

    async fn validate_block(
        &self,
        _header: &BlockHeader,
        _payload: &PayloadWithOutputs,
    ) -> Result<(), ExecutorError> {
        Ok(())
    }
}

/// A `HeaderDb` that reports a fixed target regardless of parent, and counts
/// how many times the oracle was actually consulted (§8 scenario 4).
pub struct FixedTargetHeaderDb {
    target: HashTarget,
    consultations: Mutex<u64>,
}

impl FixedTargetHeaderDb {
    pub fn new(target: HashTarget) -> Arc<Self> {
        Arc::new(Self {
            target,
            consultations: Mutex::new(0),
        })
    }

    pub fn consultations(&self) -> u64 {
        *self.consultations.lock().unwrap()
    }
}

impl HeaderDb for FixedTargetHeaderDb {
    fn hash_target(&self, _parent: &SolvedHeader) -> HashTarget {
        *self.consultations.lock().unwrap() += 1;
        self.target
    }
}

/// A `HeaderDbSet` over a fixed map of per-chain `HeaderDb`s, recording every
/// inserted header for later inspection by tests.
pub struct InMemoryHeaderDbSet {
    dbs: HashMap<ChainId, Arc<dyn HeaderDb>>,
    inserted: Mutex<Vec<(ChainId, SolvedHeader)>>,
}

impl InMemoryHeaderDbSet {
    pub fn new(dbs: HashMap<ChainId, Arc<dyn HeaderDb>>) -> Arc<Self> {
        Arc::new(Self {
            dbs,
            inserted: Mutex::new(Vec::new()),
        })
    }

    pub fn inserted(&self) -> Vec<(ChainId, SolvedHeader)> {
        self.inserted.lock().unwrap().clone()
    }
}

impl HeaderDbSet for InMemoryHeaderDbSet {
    fn for_chain(&self, cid: ChainId) -> Option<Arc<dyn HeaderDb>> {
        self.dbs.get(&cid).cloned()
    }

    fn insert(&self, cid: ChainId, header: SolvedHeader) {
        self.inserted.lock().unwrap().push((cid, header));
    }
}

/// An in-memory content-addressed payload store, recording every insert so
/// tests can assert preemption discarded work before any write landed (§8
/// scenario 3, "preemption discards work").
#[derive(Default)]
pub struct InMemoryPayloadStore {
    received: Mutex<Vec<PayloadWithOutputs>>,
}

impl InMemoryPayloadStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn received(&self) -> Vec<PayloadWithOutputs> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl PayloadStore for InMemoryPayloadStore {
    async fn add_new_payload(&self, payload: PayloadWithOutputs) {
        self.received.lock().unwrap().push(payload);
    }
}
