use std::{fmt, hash::Hash};

/// Member of the cluster that keys are routed to.
///
/// The ring never inspects a member beyond two capabilities: a stable,
/// deterministic string form (the hashing input for its replica
/// positions) and equality. Anything satisfying the bounds is a member,
/// so `String`, `&str` and custom identity types work unchanged.
pub trait Member: Clone + Eq + Hash + fmt::Display {}

/// Blanket implementation of `Member` for all types that implement the
/// necessary traits.
impl<T> Member for T where T: Clone + Eq + Hash + fmt::Display {}

/// Label hashed to place one replica of a member on the ring.
pub(crate) fn replica_label<M: Member>(member: &M, replica: usize) -> String {
    format!("{replica}-{member}")
}
