//! Standalone mining process wiring a `MinerLoop` to a chainweb version and a
//! set of collaborators. Real collaborator implementations (cut database,
//! execution service, header databases, payload store) live outside this
//! crate; until they are wired in, this binary drives the loop entirely
//! against the in-memory mocks, which is enough to observe the mine/await-cut
//! race and cut-extension behavior end to end.

use clap::Parser;
use cw_common::{BlockHash, BlockHashRecord, BlockHeader, ChainwebVersion, Cut, HashTarget, SolvedHeader};
use cw_miner::mocks::{
    InMemoryCutStore, InMemoryHeaderDbSet, InMemoryPayloadStore, TrivialExecutor,
};
use cw_miner::{logging, Clock, CutExtender, MinerConfig, MinerInfo, MinerLoop, SystemClock};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "cw-miner")]
#[command(about = "Proof-of-work mining core for a multi-chain chainweb node")]
struct Cli {
    /// Identity passed through to the execution service on every new block.
    #[clap(long, default_value = "miner-0")]
    miner_info: String,

    /// Number of chains in the degenerate test version this binary mines against.
    #[clap(long, default_value_t = 3)]
    chains: u32,

    /// Epoch window width for the difficulty-adjustment schedule.
    #[clap(long, default_value_t = 120)]
    window: u64,

    /// Default log level when RUST_LOG is unset.
    #[clap(long, default_value = "info")]
    log_level: String,
}

fn genesis_cut(version: &ChainwebVersion) -> Cut {
    let mut cut = Cut::new();
    for cid in version.chains() {
        let header = BlockHeader {
            chain_id: *cid,
            height: 0,
            parent: BlockHash::zero(),
            adjacent: BlockHashRecord::new(),
            payload_hash: BlockHash::zero(),
            nonce: 0,
            time: 0,
            target: HashTarget::max_value(),
            version: 0,
        };
        let hash = BlockHash::new([cid.as_u32() as u8; 32]);
        cut.insert(*cid, SolvedHeader { hash, header });
    }
    cut
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logger(&cli.log_level);

    let version = Arc::new(ChainwebVersion::complete_graph_test(cli.chains, cli.window));
    let genesis = genesis_cut(&version);

    let cut_store = InMemoryCutStore::new(genesis);
    let header_dbs = InMemoryHeaderDbSet::new(Default::default());
    let payload_store = InMemoryPayloadStore::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let cut_extender = CutExtender::new(
        version.clone(),
        Arc::new(TrivialExecutor),
        header_dbs,
        payload_store,
        clock,
    );

    let config = MinerConfig::new(MinerInfo::new(cli.miner_info));
    let miner_loop = MinerLoop::new(version, cut_store, cut_extender, config);

    miner_loop.run_forever().await;
}
