use {
    crate::{
        error::{RingError, RingResult},
        hash::DefaultBuildHasher,
        member::Member,
        ring::Ring,
    },
    std::hash::BuildHasher,
};

/// Replica (virtual node) count used when left unset or set to zero.
pub const DEFAULT_REPLICA_COUNT: usize = 20;

/// Load factor used when left unset or set to zero.
pub const DEFAULT_LOAD_FACTOR: f64 = 1.5;

/// Fully resolved ring configuration.
///
/// Produced once by [`RingBuilder::build`]; the ring never re-reads or
/// mutates its tunables afterwards.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Config {
    pub(crate) replica_count: usize,
    pub(crate) load_factor: f64,
}

/// Ring builder.
///
/// Knobs left unset (or set to zero, which counts as unset) resolve to
/// their defaults at [`build`](Self::build) time.
pub struct RingBuilder<H: BuildHasher = DefaultBuildHasher> {
    replica_count: Option<usize>,
    load_factor: Option<f64>,
    build_hasher: H,
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RingBuilder {
    /// Creates a new ring builder.
    pub fn new() -> Self {
        Self::with_build_hasher(DefaultBuildHasher::default())
    }
}

impl<H: BuildHasher> RingBuilder<H> {
    /// Creates a new ring builder with the given hasher.
    ///
    /// The hasher places both member replicas and lookup keys, so every
    /// party routing against the same ring must use the same hasher.
    pub fn with_build_hasher(build_hasher: H) -> Self {
        Self {
            replica_count: None,
            load_factor: None,
            build_hasher,
        }
    }

    /// Number of replica positions placed on the ring per member.
    ///
    /// More replicas smooth out the key distribution at the cost of a
    /// larger ring. Defaults to [`DEFAULT_REPLICA_COUNT`].
    pub fn replica_count(mut self, replica_count: usize) -> Self {
        self.replica_count = Some(replica_count);
        self
    }

    /// Permitted multiplier over the mean load before a member stops
    /// receiving placements.
    ///
    /// Must be greater than `1.0`. Defaults to [`DEFAULT_LOAD_FACTOR`].
    pub fn load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = Some(load_factor);
        self
    }

    /// Transform the builder into one with a different hasher.
    pub fn build_hasher<H2: BuildHasher>(self, build_hasher: H2) -> RingBuilder<H2> {
        RingBuilder {
            replica_count: self.replica_count,
            load_factor: self.load_factor,
            build_hasher,
        }
    }

    /// Resolves defaults, validates the configuration and builds the ring.
    ///
    /// A resolved load factor at or below `1.0` is rejected: the bounded
    /// placement search terminates only because members are allowed some
    /// slack above the mean load.
    pub fn build<M: Member>(self) -> RingResult<Ring<M, H>> {
        let replica_count = match self.replica_count {
            None | Some(0) => DEFAULT_REPLICA_COUNT,
            Some(count) => count,
        };
        let load_factor = match self.load_factor {
            None => DEFAULT_LOAD_FACTOR,
            Some(factor) if factor == 0.0 => DEFAULT_LOAD_FACTOR,
            Some(factor) => factor,
        };

        if load_factor <= 1.0 {
            return Err(RingError::InvalidLoadFactor(load_factor));
        }

        Ok(Ring::with_config(
            Config {
                replica_count,
                load_factor,
            },
            self.build_hasher,
        ))
    }
}
