// Error taxonomy for the mining core (§7). Recoverable conditions abort the
// in-flight attempt and let `MinerLoop` retry; fatal conditions propagate out
// of `run_forever`'s inner loop and are handled there (crash-and-restart for a
// corrupted cut, or a clean abort for a misconfigured version).

use cw_common::{CutError, VersionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("payload build failed: {0}")]
    Build(String),
    #[error("payload validation failed: {0}")]
    Validate(String),
}

/// Errors a single `CutExtender::extend` attempt can end in. A blocked chain
/// is deliberately absent from this enum: it is handled internally by
/// re-sampling and never escapes the extender (§4.4, §7.1).
#[derive(Debug, Error)]
pub enum MiningError {
    #[error("payload build failed: {0}")]
    PayloadBuild(String),

    #[error("payload validation failed: {0}")]
    PayloadValidate(String),

    /// Splicing the newly mined header into the cut failed. By construction
    /// this should never happen; its occurrence indicates corrupt state and
    /// is fatal (§4.4 step 7, §7.2).
    #[error("cut invariant violated while splicing mined block: {0}")]
    CutInvariant(#[from] CutError),

    /// The active version does not name a recognized PoW hash algorithm.
    /// Distinct from the non-PoW-schedule guard in `MinerLoop::run_forever`:
    /// that one is checked once at prune time and aborts without retry, this
    /// one surfaces mid-attempt and is treated as a restartable fatal error.
    #[error(transparent)]
    Version(#[from] VersionError),
}

impl From<ExecutorError> for MiningError {
    fn from(e: ExecutorError) -> Self {
        match e {
            ExecutorError::Build(msg) => MiningError::PayloadBuild(msg),
            ExecutorError::Validate(msg) => MiningError::PayloadValidate(msg),
        }
    }
}

impl MiningError {
    /// Fatal in the "crash the attempt and restart `run_forever`'s inner
    /// state" sense (§7.2). Non-PoW version misconfiguration is a *different*
    /// kind of fatal, checked separately in `MinerLoop::run_forever` since it
    /// is discovered only when the epoch window is consulted at prune time,
    /// not inside `CutExtender`.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MiningError::CutInvariant(_) | MiningError::Version(_))
    }
}
