use thiserror::Error;

/// Failures surfaced by the sieve and the prime table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SieveError {
    #[error("prime index must not be negative (got {0})")]
    NegativeIndex(i64),

    #[error("index {index} is too large: its bound does not fit in 64 bits")]
    IndexTooLarge { index: usize },

    #[error("segment worker {segment} failed before returning its primes")]
    WorkerFailed { segment: usize },
}

pub type Result<T> = std::result::Result<T, SieveError>;

/// Convert a signed index into a table index, rejecting negatives.
pub fn index_from_signed(n: i64) -> Result<usize> {
    if n < 0 {
        return Err(SieveError::NegativeIndex(n));
    }
    usize::try_from(n).map_err(|_| SieveError::IndexTooLarge { index: usize::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_from_signed() {
        assert_eq!(index_from_signed(0), Ok(0));
        assert_eq!(index_from_signed(99), Ok(99));
        assert_eq!(index_from_signed(-1), Err(SieveError::NegativeIndex(-1)));
        assert_eq!(
            index_from_signed(i64::MIN),
            Err(SieveError::NegativeIndex(i64::MIN))
        );
    }
}
