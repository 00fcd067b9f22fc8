// Miner configuration (§6). Small, explicit, serde-(de)serializable struct
// rather than a global settings singleton.

use serde::{Deserialize, Serialize};

/// Opaque identity passed through to `Executor::new_block` (§6). The mining
/// core never interprets it; it is a pass-through credential naming who gets
/// the block reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerInfo(pub String);

impl MinerInfo {
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }
}

/// Default iteration count between timestamp-refresh / cancellation
/// checkpoints in the inner mining loop (§4.5).
pub const DEFAULT_REFRESH_INTERVAL: u64 = 100_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerConfig {
    pub miner_info: MinerInfo,

    /// Iteration count between timestamp refresh/yield checkpoints in
    /// `InnerMiner`. Overridable so tests can tighten the cancellation bound.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// The `log` target string mining events are emitted under, so an
    /// operator can filter mining logs independently of the rest of the node.
    #[serde(default = "default_log_target")]
    pub log_target: String,
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL
}

fn default_log_target() -> String {
    "cw_miner".to_string()
}

impl MinerConfig {
    pub fn new(miner_info: MinerInfo) -> Self {
        Self {
            miner_info,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            log_target: default_log_target(),
        }
    }

    pub fn with_refresh_interval(mut self, refresh_interval: u64) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = MinerConfig::new(MinerInfo::new("miner-1"));
        assert_eq!(cfg.refresh_interval, 100_000);
        assert_eq!(cfg.log_target, "cw_miner");
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        let json = r#"{"miner_info": "miner-1"}"#;
        let cfg: MinerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.miner_info, MinerInfo::new("miner-1"));
        assert_eq!(cfg.refresh_interval, DEFAULT_REFRESH_INTERVAL);
    }
}
