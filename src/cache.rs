use std::num::NonZeroUsize;

use tracing::debug;

use crate::bound::estimate_bound;
use crate::error::{Result, SieveError};
use crate::planner::{default_workers, dispatch, plan_segments, segment_size};
use crate::segment::{Segment, bootstrap_segment, sieve_segment};

/// Primes the table starts with. The bound estimate is only valid past them.
const SEED: [u64; 7] = [2, 3, 5, 7, 11, 13, 17];

/// Growing, ordered table of every prime up to a watermark.
///
/// Calculating every prime up through the n-th one is not the cheapest way
/// to find a single prime, but it turns every later query for a smaller
/// index into a lookup. The price is holding all of those primes in memory.
///
/// The table holds exactly the primes in `[2, watermark]`. It only ever
/// grows, and growth needs `&mut self`: callers sharing an instance must
/// serialize access themselves.
#[derive(Debug, Clone)]
pub struct PrimeCache {
    primes: Vec<u64>,
    max: u64,
    workers: NonZeroUsize,
}

impl Default for PrimeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimeCache {
    pub fn new() -> Self {
        Self::with_workers(default_workers())
    }

    /// Table that sieves with at most `workers` threads per growth round.
    pub fn with_workers(workers: NonZeroUsize) -> Self {
        Self {
            primes: SEED.to_vec(),
            max: SEED[SEED.len() - 1],
            workers,
        }
    }

    /// Number of primes currently held.
    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    /// Highest integer whose primality is known.
    pub fn watermark(&self) -> u64 {
        self.max
    }

    pub fn primes(&self) -> &[u64] {
        &self.primes
    }

    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// The prime at 0-indexed position `n` (`nth_prime(0) == 2`).
    ///
    /// Cached indices are a plain lookup; anything past the table grows it
    /// up to the Rosser and Schoenfeld bound for `n` first.
    pub fn nth_prime(&mut self, n: usize) -> Result<u64> {
        if let Some(&prime) = self.primes.get(n) {
            return Ok(prime);
        }

        let mut bound = estimate_bound(n)?;
        loop {
            self.grow_to(bound)?;
            if let Some(&prime) = self.primes.get(n) {
                return Ok(prime);
            }
            // Only reachable if float rounding undercut the estimate
            debug!(n, bound, "bound estimate fell short, doubling");
            bound = bound
                .checked_mul(2)
                .ok_or(SieveError::IndexTooLarge { index: n })?;
        }
    }

    /// All primes `<= limit`, growing the table first if needed.
    pub fn primes_up_to(&mut self, limit: u64) -> Result<&[u64]> {
        self.grow_to(limit)?;
        let end = self.primes.partition_point(|&prime| prime <= limit);
        Ok(&self.primes[..end])
    }

    /// Number of primes `<= limit`.
    pub fn count_up_to(&mut self, limit: u64) -> Result<usize> {
        Ok(self.primes_up_to(limit)?.len())
    }

    /// Extend the table until the watermark reaches `bound`.
    pub fn grow_to(&mut self, bound: u64) -> Result<()> {
        self.grow_with(bound, &sieve_segment)
    }

    /// [`grow_to`](Self::grow_to) with a custom segment worker.
    pub(crate) fn grow_with<F>(&mut self, bound: u64, sieve: &F) -> Result<()>
    where
        F: Fn(Segment, &[u64]) -> Vec<u64> + Sync,
    {
        if bound <= self.max {
            return Ok(());
        }

        let size = segment_size(bound);
        if self.max < size {
            // Every prime <= sqrt(bound) has to be known before the rest of
            // the range can be split up, so find those first.
            let start = self.max + 1;
            debug!(start, end = size, "bootstrapping base primes");
            let found = bootstrap_segment(
                Segment {
                    index: 0,
                    start,
                    end: size,
                },
                &self.primes,
            );
            self.primes.extend(found);
            self.max = size;
            if self.max >= bound {
                return Ok(());
            }
        }

        let segments = plan_segments(self.max + 1, bound, size);
        debug!(
            bound,
            segment_size = size,
            segments = segments.len(),
            known = self.primes.len(),
            "growing prime table"
        );

        let found = dispatch(&segments, &self.primes, self.workers, sieve)?;
        for primes in found {
            self.primes.extend(primes);
        }
        self.max = bound;
        Ok(())
    }
}
