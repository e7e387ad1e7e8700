//! A bounded-memory approximate frequency counter for string keys.
//!
//! [`Counter`] tracks estimated occurrence counts for the most frequent
//! keys in an unbounded stream while staying within a fixed bucket
//! budget: once the table fills past 75% occupancy, an in-place prune
//! evicts the least-frequent entries rather than growing. A HyperLogLog
//! register bank, fed by the same hash used for bucket placement,
//! reports approximate distinct-key cardinality even for keys prune has
//! already discarded.
//!
//! ```
//! use boundfreq::Counter;
//!
//! let mut counter = Counter::new(16).unwrap();
//! counter.increment("a", 1).unwrap();
//! counter.increment("a", 1).unwrap();
//! counter.increment("b", 1).unwrap();
//!
//! assert_eq!(counter.get("a").unwrap(), 2);
//! assert_eq!(counter.get("z").unwrap(), 0);
//! assert_eq!(counter.total(), 3);
//! ```

mod counter;
pub mod error;
mod hash;
mod histogram;
mod hll;
mod iter;
mod prune;
mod serialization;
mod table;
mod update;

pub use counter::Counter;
pub use iter::{Items, Keys};
pub use serialization::SerializedState;
pub use update::UpdateSource;
