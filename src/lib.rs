//! Cached n-th prime lookup backed by a parallel segmented sieve.
//!
//! ```
//! use nthprime::PrimeCache;
//!
//! let mut cache = PrimeCache::new();
//! assert_eq!(cache.nth_prime(99), Ok(541));
//! assert_eq!(cache.nth_prime(0), Ok(2));
//! ```

pub mod bound;
pub mod cache;
pub mod error;
pub mod planner;
pub mod segment;

pub use cache::PrimeCache;
pub use error::{Result, SieveError, index_from_signed};
