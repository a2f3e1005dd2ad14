/// Closed range `[start, end]` of candidates owned by one worker.
///
/// `index` is the position of the segment within its growth round and is
/// what results are ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl Segment {
    pub fn len(&self) -> u64 {
        if self.start > self.end {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Primes found in one segment, tagged with the segment index for ordering.
#[derive(Clone, Debug)]
pub struct SegmentPrimes {
    pub primes: Vec<u64>,
    pub segment_id: usize,
}

/// Whether a pass may take new filtering primes from its own candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Harvest {
    /// Every prime <= sqrt(end) is already known.
    KnownOnly,
    /// Known primes may stop short of sqrt(end); the lowest surviving
    /// candidates are promoted to filtering primes as the pass goes.
    Discover,
}

/// Sieve an ordinary segment. `known` must hold every prime <= sqrt(end).
pub fn sieve_segment(segment: Segment, known: &[u64]) -> Vec<u64> {
    sieve_range(segment, known, Harvest::KnownOnly)
}

/// Sieve the lowest segment, discovering its own filtering primes.
///
/// `known` must hold every prime below `segment.start`.
pub fn bootstrap_segment(segment: Segment, known: &[u64]) -> Vec<u64> {
    sieve_range(segment, known, Harvest::Discover)
}

/// Trial-division filter over `[start, end]`.
///
/// Candidates start as every integer in the range. Each known prime p with
/// p * p <= end removes its multiples, building a fresh candidate list per
/// pass. With [`Harvest::Discover`] the smallest survivor is then prime
/// (all of its possible factors below it were already filtered), so it is
/// moved to the output and used as the next filter until its square passes
/// `end`. Whatever is left has no factor <= sqrt(end) and is prime.
///
/// `start` must be at least 2.
pub fn sieve_range(segment: Segment, known: &[u64], harvest: Harvest) -> Vec<u64> {
    let end = segment.end;
    let mut candidates: Vec<u64> = (segment.start..=end).collect();

    for &prime in known {
        if !divides_within(prime, end) {
            break;
        }
        candidates = remove_multiples(&candidates, prime);
    }

    if harvest == Harvest::KnownOnly {
        return candidates;
    }

    let mut vetted = Vec::with_capacity(candidates.len());
    while let Some(&prime) = candidates.first() {
        if !divides_within(prime, end) {
            break;
        }
        // Also drops `prime` itself.
        candidates = remove_multiples(&candidates, prime);
        vetted.push(prime);
    }
    vetted.extend(candidates);
    vetted
}

/// True when `prime` can be the smallest factor of some composite <= end.
#[inline]
fn divides_within(prime: u64, end: u64) -> bool {
    prime.checked_mul(prime).is_some_and(|square| square <= end)
}

#[inline]
fn remove_multiples(candidates: &[u64], prime: u64) -> Vec<u64> {
    candidates
        .iter()
        .copied()
        .filter(|candidate| candidate % prime != 0)
        .collect()
}
