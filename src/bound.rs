use crate::error::{Result, SieveError};

/// Smallest prime count for which the Rosser and Schoenfeld bound holds.
pub const MIN_BOUND_COUNT: usize = 6;

/// Upper bound guaranteed to be at least the prime at 0-indexed `index`.
///
/// Uses corollary 3.13 from Rosser and Schoenfeld, "Approximate formulas for
/// some functions of prime numbers" (1962): for the k-th prime (1-indexed)
/// and k >= 6,
///
/// ```text
/// p_k < k (ln k + ln ln k)
/// ```
///
/// The table is 0-indexed, so index `n` is the `n + 1`-th prime.
pub fn estimate_bound(index: usize) -> Result<u64> {
    let count = index
        .checked_add(1)
        .ok_or(SieveError::IndexTooLarge { index })?;
    debug_assert!(
        count >= MIN_BOUND_COUNT,
        "bound formula is only valid for k >= {MIN_BOUND_COUNT}"
    );

    let k = count as f64;
    let ln_k = k.ln();
    let bound = (k * (ln_k + ln_k.ln())).ceil();

    // 2^64 is exactly representable, anything at or above it does not fit.
    if !bound.is_finite() || bound >= u64::MAX as f64 {
        return Err(SieveError::IndexTooLarge { index });
    }
    Ok(bound as u64)
}
