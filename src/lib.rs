//! Consistent hashing with bounded loads.
//!
//! Keys are assigned to cluster members over a ring of hashed replica
//! positions, so membership changes remap only a small fraction of the
//! key space. On top of the classic ring lookup, placement is load
//! bounded: a member whose in-flight load exceeds a configured multiple
//! of the mean is skipped, and the key is routed to the next eligible
//! member clockwise. Placement and load accounting are decoupled, so a
//! caller commits to an assignment only by bracketing the unit of work
//! with load updates.
//!
//! ```
//! use bounded_ring::Ring;
//!
//! let ring = Ring::new();
//! ring.add("node1.db.example.com".to_string());
//! ring.add("node2.db.example.com".to_string());
//! ring.add("node3.db.example.com".to_string());
//!
//! let member = ring.locate("user-42")?;
//! ring.incr_load(&member)?;
//! // ... do the unit of work against the member ...
//! ring.decr_load(&member)?;
//! # Ok::<(), bounded_ring::RingError>(())
//! ```
//!
//! A single ring instance is meant to be shared: routing and load
//! accounting run under a read lock, membership changes take the write
//! lock, and load counters are per-member atomics.

mod config;
mod error;
mod hash;
mod member;
mod ring;

pub use {
    config::{DEFAULT_LOAD_FACTOR, DEFAULT_REPLICA_COUNT, RingBuilder},
    error::{RingError, RingResult},
    hash::{DefaultBuildHasher, DefaultHasher},
    member::Member,
    ring::{Ring, RingPosition},
};
