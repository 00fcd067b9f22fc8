pub mod chain;
pub mod cut;
pub mod hash;
pub mod header;
pub mod time;
pub mod version;

pub use chain::{BlockHeight, ChainId};
pub use cut::{check_cut_invariant, cut_to_hashes, monotonic_extension, BlockHashRecord, Cut, CutError, CutHashes, SolvedHeader};
pub use hash::{meets_target, pow_hash, BlockHash, HashAlgorithm, HashAlgorithmKind, HashTarget, HASH_SIZE};
pub use header::BlockHeader;
pub use time::{get_current_time_in_micros, TimeMicros};
pub use version::{ChainwebVersion, VersionError};
