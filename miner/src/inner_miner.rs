// The hash-guess-check loop (§4.5). Two variants, algorithmically identical:
// `mine` constructs a fresh hash engine per iteration; `mine_fast` reuses one
// mutable context across iterations via `reset`. Neither suspends except at
// the `refresh_interval`-iteration checkpoint, where the embedded timestamp
// is refreshed and the task cooperatively yields so a concurrent
// `await_newer` can preempt it (§5).

use crate::clock::Clock;
use cw_common::{
    header::{write_nonce, write_time},
    meets_target, pow_hash, BlockHeader, HashAlgorithmKind, SolvedHeader,
};

/// Portable variant: allocation-light but not allocation-free -- a fresh hash
/// engine is built each iteration.
pub async fn mine(
    candidate: &BlockHeader,
    nonce0: u64,
    algo: HashAlgorithmKind,
    clock: &dyn Clock,
    refresh_interval: u64,
) -> SolvedHeader {
    let mut buf = candidate.encode_without_hash();
    let mut n = nonce0;
    let mut iterations: u64 = 0;

    loop {
        write_nonce(&mut buf, n);
        let digest = pow_hash(&buf, algo);

        if meets_target(&digest, &candidate.target) {
            let header =
                BlockHeader::decode_without_hash(&buf).expect("mining buffer round-trips by construction");
            return SolvedHeader {
                header,
                hash: digest.into(),
            };
        }

        n = n.wrapping_add(1);
        iterations += 1;
        if iterations % refresh_interval == 0 {
            write_time(&mut buf, clock.now_micros());
            tokio::task::yield_now().await;
        }
    }
}

/// Fast variant: the serialized buffer and hash context are each allocated
/// once and reused for every iteration. Implementations SHOULD gate this on
/// `ChainwebVersion::supports_fast_mining` and fall back to `mine` (§4.5).
pub async fn mine_fast(
    candidate: &BlockHeader,
    nonce0: u64,
    algo: HashAlgorithmKind,
    clock: &dyn Clock,
    refresh_interval: u64,
) -> SolvedHeader {
    let mut buf = candidate.encode_without_hash();
    let mut engine = algo.new_engine();
    let mut n = nonce0;
    let mut iterations: u64 = 0;

    loop {
        write_nonce(&mut buf, n);
        let digest = engine.hash_once(&buf);

        if meets_target(&digest, &candidate.target) {
            let header =
                BlockHeader::decode_without_hash(&buf).expect("mining buffer round-trips by construction");
            return SolvedHeader {
                header,
                hash: digest.into(),
            };
        }

        n = n.wrapping_add(1);
        iterations += 1;
        if iterations % refresh_interval == 0 {
            write_time(&mut buf, clock.now_micros());
            tokio::task::yield_now().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use cw_common::{BlockHash, BlockHashRecord, ChainId, HashTarget};

    fn trivial_candidate(target: HashTarget) -> BlockHeader {
        BlockHeader {
            chain_id: ChainId::new(0),
            height: 1,
            parent: BlockHash::zero(),
            adjacent: BlockHashRecord::new(),
            payload_hash: BlockHash::zero(),
            nonce: 0,
            time: 1_000,
            target,
            version: 0,
        }
    }

    #[tokio::test]
    async fn mine_meets_target_and_preserves_other_fields() {
        let candidate = trivial_candidate(HashTarget::max_value());
        let clock = FixedClock(1_000);
        let solved = mine(&candidate, 0, HashAlgorithmKind::Sha512_256, &clock, 100_000).await;

        assert!(meets_target(solved.hash.as_bytes(), &candidate.target));
        assert_eq!(solved.header.chain_id, candidate.chain_id);
        assert_eq!(solved.header.height, candidate.height);
        assert_eq!(solved.header.parent, candidate.parent);
        assert_eq!(solved.header.payload_hash, candidate.payload_hash);
        assert_eq!(solved.header.target, candidate.target);
    }

    #[tokio::test]
    async fn portable_and_fast_agree_given_same_inputs() {
        let candidate = trivial_candidate(HashTarget::max_value());
        let clock = FixedClock(2_000);

        let portable = mine(&candidate, 7, HashAlgorithmKind::Sha512_256, &clock, 100_000).await;
        let fast = mine_fast(&candidate, 7, HashAlgorithmKind::Sha512_256, &clock, 100_000).await;

        assert_eq!(portable.header.nonce, fast.header.nonce);
        assert_eq!(portable.header.time, fast.header.time);
        assert!(meets_target(portable.hash.as_bytes(), &candidate.target));
        assert!(meets_target(fast.hash.as_bytes(), &candidate.target));
    }

    #[tokio::test]
    async fn refreshes_timestamp_at_checkpoint() {
        // A target excluding all but 1/256th of the hash space makes nonce 0
        // meet it only on the rare unlucky run, so with refresh_interval=1
        // the first failed iteration refreshes the embedded timestamp to the
        // clock's value before mining succeeds a handful of nonces later.
        let candidate = trivial_candidate(HashTarget::max_value() / HashTarget::from(256u64));
        let clock = FixedClock(9_999);
        assert_ne!(candidate.time, clock.0);

        let solved = mine(&candidate, 0, HashAlgorithmKind::Sha512_256, &clock, 1).await;

        assert_eq!(solved.header.time, clock.0, "checkpoint must have refreshed the timestamp");
    }
}
