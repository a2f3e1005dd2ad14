use std::num::NonZeroUsize;
use std::sync::mpsc;
use std::thread;

use tracing::{trace, warn};

use crate::error::{Result, SieveError};
use crate::segment::{Segment, SegmentPrimes};

/// Segment length for sieving up to `bound`: ceil(sqrt(bound)).
pub fn segment_size(bound: u64) -> u64 {
    let root = bound.isqrt();
    let size = if root * root < bound { root + 1 } else { root };
    size.max(1)
}

/// Default worker count: one per available core.
pub fn default_workers() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// Split `[first, last]` into consecutive segments of `size` integers.
///
/// The last segment may be shorter. An empty range yields no segments.
pub fn plan_segments(first: u64, last: u64, size: u64) -> Vec<Segment> {
    let size = size.max(1);
    let mut segments = Vec::new();
    if first > last {
        return segments;
    }

    let mut start = first;
    loop {
        let end = start.saturating_add(size - 1).min(last);
        segments.push(Segment {
            index: segments.len(),
            start,
            end,
        });
        if end == last {
            break;
        }
        start = end + 1;
    }
    segments
}

/// Sieve every segment in parallel and return their primes in segment order.
///
/// `known` is shared read-only by all workers for the whole round. Segments
/// are dealt round-robin to at most `workers` threads; each result carries
/// its segment index and lands in a pre-sized slot, so the output order is
/// independent of completion order. A worker that panics fails the round.
pub fn dispatch<F>(
    segments: &[Segment],
    known: &[u64],
    workers: NonZeroUsize,
    sieve: &F,
) -> Result<Vec<Vec<u64>>>
where
    F: Fn(Segment, &[u64]) -> Vec<u64> + Sync,
{
    let total_segments = segments.len();
    if total_segments == 0 {
        return Ok(Vec::new());
    }
    let num_workers = workers.get().min(total_segments);
    let mut slots: Vec<Option<Vec<u64>>> = vec![None; total_segments];

    let (sender, receiver) = mpsc::channel::<SegmentPrimes>();
    let mut panicked = false;

    thread::scope(|scope| {
        let handles: Vec<_> = (0..num_workers)
            .map(|worker_id| {
                let sender = sender.clone();
                scope.spawn(move || {
                    for segment in segments.iter().skip(worker_id).step_by(num_workers) {
                        trace!(
                            worker_id,
                            segment = segment.index,
                            start = segment.start,
                            end = segment.end,
                            "sieving segment"
                        );
                        let primes = sieve(*segment, known);
                        if sender
                            .send(SegmentPrimes {
                                primes,
                                segment_id: segment.index,
                            })
                            .is_err()
                        {
                            return; // Receiver dropped
                        }
                    }
                })
            })
            .collect();

        // Only worker clones remain, so the receiver ends once they all exit.
        drop(sender);

        for segment_primes in receiver.iter() {
            trace!(
                segment = segment_primes.segment_id,
                found = segment_primes.primes.len(),
                "collected segment"
            );
            slots[segment_primes.segment_id] = Some(segment_primes.primes);
        }

        for handle in handles {
            if handle.join().is_err() {
                panicked = true;
            }
        }
    });

    let mut ordered = Vec::with_capacity(total_segments);
    for (segment, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(primes) => ordered.push(primes),
            None => {
                warn!(segment, panicked, "segment worker did not report");
                return Err(SieveError::WorkerFailed { segment });
            }
        }
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::sieve_segment;
    use std::time::Duration;

    const BASE: [u64; 8] = [2, 3, 5, 7, 11, 13, 17, 19];

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_segment_size() {
        assert_eq!(segment_size(1), 1);
        assert_eq!(segment_size(16), 4);
        assert_eq!(segment_size(17), 5);
        assert_eq!(segment_size(400), 20);
        assert_eq!(segment_size(401), 21);
        assert_eq!(segment_size(u64::MAX), 1 << 32);
    }

    #[test]
    fn test_plan_segments_partitions_range() {
        let segments = plan_segments(18, 40, 5);
        let ranges: Vec<(u64, u64)> = segments.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(ranges, vec![(18, 22), (23, 27), (28, 32), (33, 37), (38, 40)]);
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.index, i);
        }
    }

    #[test]
    fn test_plan_segments_exact_fit() {
        let segments = plan_segments(1, 10, 5);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].end, 10);
    }

    #[test]
    fn test_plan_segments_empty_and_single() {
        assert!(plan_segments(20, 19, 5).is_empty());
        let single = plan_segments(20, 20, 5);
        assert_eq!(single, vec![Segment { index: 0, start: 20, end: 20 }]);
    }

    #[test]
    fn test_plan_segments_near_max() {
        let segments = plan_segments(u64::MAX - 9, u64::MAX, 4);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].end, u64::MAX);
    }

    #[test]
    fn test_dispatch_preserves_segment_order() {
        let segments = plan_segments(20, 400, 20);
        let results = dispatch(&segments, &BASE, workers(4), &sieve_segment).unwrap();
        assert_eq!(results.len(), segments.len());

        let merged: Vec<u64> = results.into_iter().flatten().collect();
        assert_eq!(merged.first(), Some(&23));
        assert_eq!(merged.last(), Some(&397));
        assert!(merged.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_dispatch_ignores_completion_order() {
        let segments = plan_segments(20, 400, 20);
        let expected = dispatch(&segments, &BASE, workers(1), &sieve_segment).unwrap();

        // Early segments finish last
        let slow_start = |segment: Segment, known: &[u64]| {
            if segment.index < 3 {
                thread::sleep(Duration::from_millis(30 * (3 - segment.index as u64)));
            }
            sieve_segment(segment, known)
        };
        let delayed = dispatch(&segments, &BASE, workers(8), &slow_start).unwrap();
        assert_eq!(delayed, expected);
    }

    #[test]
    fn test_dispatch_worker_panic_fails_round() {
        let segments = plan_segments(20, 200, 20);
        let failing = |segment: Segment, known: &[u64]| {
            if segment.index == 2 {
                panic!("worker failure");
            }
            sieve_segment(segment, known)
        };
        let result = dispatch(&segments, &BASE, workers(3), &failing);
        assert_eq!(result, Err(SieveError::WorkerFailed { segment: 2 }));
    }

    #[test]
    fn test_dispatch_no_segments() {
        let results = dispatch(&[], &BASE, workers(4), &sieve_segment).unwrap();
        assert!(results.is_empty());
    }
}
