// Wall-clock helpers.
//
// `SystemTime::now()` is non-deterministic. It is fine for the miner's own
// timestamp refresh and for logging, but must never be treated as
// consensus-critical input: headers produced by other nodes carry their own
// timestamp and are never re-timestamped locally.

use std::time::{SystemTime, UNIX_EPOCH};

/// Microsecond timestamp, little-endian-encoded at bytes [8,16) of a header.
pub type TimeMicros = u64;

#[inline]
pub fn get_current_time_in_micros() -> TimeMicros {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_micros() as TimeMicros
}
