use {
    crate::{
        config::{Config, DEFAULT_LOAD_FACTOR, DEFAULT_REPLICA_COUNT, RingBuilder},
        error::{RingError, RingResult},
        hash::DefaultBuildHasher,
        member::{Member, replica_label},
    },
    parking_lot::RwLock,
    std::{
        collections::{BTreeMap, HashMap},
        fmt,
        hash::{BuildHasher, Hash},
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
    },
    tracing::debug,
};

/// Position on the ring.
pub type RingPosition = u64;

/// Mutable ring state, guarded by the engine's read-write lock.
///
/// Membership mutation takes the write guard and keeps all three
/// structures in step. Load counters are shared atomics, so a read guard
/// is enough to update a member's load.
struct RingState<M: Member> {
    /// Replica positions mapped to their members, in clockwise order.
    positions: BTreeMap<RingPosition, M>,

    /// Members in first-insertion order.
    order: Vec<M>,

    /// Per-member load counters. The key set is the membership set.
    loads: HashMap<M, Arc<AtomicU64>>,
}

/// Consistent hash ring with bounded loads.
///
/// Members are projected onto the ring at [`replica_count`] hashed
/// positions each, and keys are routed clockwise to the nearest member
/// whose in-flight load sits below the admission threshold. Routing
/// ([`locate`]) and load accounting ([`incr_load`], [`decr_load`]) run
/// concurrently under a shared read lock; membership changes take the
/// write lock.
///
/// [`replica_count`]: Self::replica_count
/// [`locate`]: Self::locate
/// [`incr_load`]: Self::incr_load
/// [`decr_load`]: Self::decr_load
pub struct Ring<M: Member, H: BuildHasher = DefaultBuildHasher> {
    state: RwLock<RingState<M>>,
    build_hasher: H,
    config: Config,
}

impl<M: Member> Default for Ring<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Member> Ring<M> {
    /// Creates an empty ring with the default configuration.
    pub fn new() -> Self {
        Self::with_config(
            Config {
                replica_count: DEFAULT_REPLICA_COUNT,
                load_factor: DEFAULT_LOAD_FACTOR,
            },
            DefaultBuildHasher::default(),
        )
    }

    /// Starts building a ring with custom configuration.
    pub fn builder() -> RingBuilder {
        RingBuilder::new()
    }
}

impl<M: Member, H: BuildHasher> Ring<M, H> {
    pub(crate) fn with_config(config: Config, build_hasher: H) -> Self {
        Self {
            state: RwLock::new(RingState {
                positions: BTreeMap::new(),
                order: Vec::new(),
                loads: HashMap::new(),
            }),
            build_hasher,
            config,
        }
    }

    /// Number of replica positions placed on the ring per member.
    pub fn replica_count(&self) -> usize {
        self.config.replica_count
    }

    /// Permitted multiplier over the mean load.
    pub fn load_factor(&self) -> f64 {
        self.config.load_factor
    }

    /// Adds a member to the ring.
    ///
    /// Places [`replica_count`](Self::replica_count) replica positions for
    /// the member and starts its load counter at zero. Adding a member
    /// that is already present is a no-op. Should two replica labels ever
    /// hash to the same position, the later insertion keeps the slot.
    pub fn add(&self, member: M) {
        let mut state = self.state.write();
        if state.loads.contains_key(&member) {
            return;
        }

        for replica in 0..self.config.replica_count {
            let position = self.build_hasher.hash_one(replica_label(&member, replica));
            state.positions.insert(position, member.clone());
        }

        debug!(member = %member, replicas = self.config.replica_count, "added member to ring");
        state.order.push(member.clone());
        state.loads.insert(member, Arc::new(AtomicU64::new(0)));
    }

    /// Removes a member and its replica positions from the ring.
    ///
    /// Removing an unknown member is a no-op. Only positions still owned
    /// by the member are deleted, so a slot lost to a position collision
    /// stays with its current owner.
    pub fn remove(&self, member: &M) {
        let mut state = self.state.write();
        if state.loads.remove(member).is_none() {
            return;
        }

        for replica in 0..self.config.replica_count {
            let position = self.build_hasher.hash_one(replica_label(member, replica));
            if state.positions.get(&position) == Some(member) {
                state.positions.remove(&position);
            }
        }

        state.order.retain(|m| m != member);
        debug!(member = %member, "removed member from ring");
    }

    /// Returns the member that should serve the given key.
    ///
    /// Walks clockwise from the key's position and returns the first
    /// member whose load is below [`average_load`](Self::average_load),
    /// re-testing each distinct member at most once. With a load factor
    /// above `1.0` not every member can sit over the threshold at once,
    /// so the walk finds an eligible member before running out of ring;
    /// a full traversal without one is reported as
    /// [`RingError::NoEligibleMember`].
    ///
    /// Placement does not commit load. Callers bracket the unit of work
    /// with [`incr_load`](Self::incr_load) and
    /// [`decr_load`](Self::decr_load), or abandon the result without
    /// committing.
    pub fn locate<K: Hash + ?Sized>(&self, key: &K) -> RingResult<M> {
        let state = self.state.read();
        if state.positions.is_empty() {
            return Err(RingError::EmptyRing);
        }

        let threshold = Self::threshold(&state, self.config.load_factor);
        let position = self.build_hasher.hash_one(key);
        let mut rejected: Vec<&M> = Vec::new();

        for (_, member) in clockwise(&state.positions, position) {
            if rejected.contains(&member) {
                continue;
            }
            let load = state.loads[member].load(Ordering::Relaxed);
            if (load as f64) < threshold {
                return Ok(member.clone());
            }
            rejected.push(member);
        }

        // Unreachable with a validated load factor, unless concurrent
        // load updates pushed every member over the threshold mid-walk.
        Err(RingError::NoEligibleMember)
    }

    /// Returns the `n` distinct members closest clockwise to the key.
    ///
    /// The first entry is the member owning the key's position, followed
    /// by the next distinct members along the ring; callers use the tail
    /// as replica destinations. Load bounds are not consulted here: this
    /// enumerates owners, it does not place work.
    pub fn closest_n<K: Hash + ?Sized>(&self, key: &K, n: usize) -> RingResult<Vec<M>> {
        let state = self.state.read();
        if state.positions.is_empty() {
            return Err(RingError::EmptyRing);
        }
        if state.loads.len() < n {
            return Err(RingError::NotEnoughMembers(n));
        }

        let position = self.build_hasher.hash_one(key);
        let mut closest: Vec<M> = Vec::with_capacity(n);

        for (_, member) in clockwise(&state.positions, position) {
            if !closest.contains(member) {
                closest.push(member.clone());
                if closest.len() == n {
                    break;
                }
            }
        }

        Ok(closest)
    }

    /// Increments the member's load counter, returning the new value.
    pub fn incr_load(&self, member: &M) -> RingResult<u64> {
        let state = self.state.read();
        let counter = Self::counter(&state, member)?;

        Ok(counter.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Decrements the member's load counter, returning the new value.
    ///
    /// The counter floors at zero: decrementing an idle member leaves it
    /// at zero rather than wrapping.
    pub fn decr_load(&self, member: &M) -> RingResult<u64> {
        let state = self.state.read();
        let counter = Self::counter(&state, member)?;

        let load = counter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |load| {
                load.checked_sub(1)
            })
            .map(|previous| previous - 1)
            .unwrap_or_default();
        Ok(load)
    }

    /// Returns the member's current load.
    pub fn load(&self, member: &M) -> RingResult<u64> {
        let state = self.state.read();
        let counter = Self::counter(&state, member)?;

        Ok(counter.load(Ordering::Relaxed))
    }

    /// Snapshot of every member's current load.
    ///
    /// Counters keep moving while the snapshot is taken, so the values
    /// are approximate under concurrent load updates.
    pub fn load_distribution(&self) -> HashMap<M, u64> {
        let state = self.state.read();
        state
            .loads
            .iter()
            .map(|(member, counter)| (member.clone(), counter.load(Ordering::Relaxed)))
            .collect()
    }

    /// Admission threshold for placement.
    ///
    /// Zero when the ring has no members. Otherwise the mean load scaled
    /// by the load factor and rounded up, with one unit of headroom in
    /// the total so that an idle ring still admits placements.
    pub fn average_load(&self) -> f64 {
        let state = self.state.read();
        Self::threshold(&state, self.config.load_factor)
    }

    /// Members in the order they were first added.
    pub fn members(&self) -> Vec<M> {
        self.state.read().order.clone()
    }

    /// Number of distinct members.
    pub fn len(&self) -> usize {
        self.state.read().loads.len()
    }

    /// Returns `true` if no members have been added.
    pub fn is_empty(&self) -> bool {
        self.state.read().loads.is_empty()
    }

    fn threshold(state: &RingState<M>, load_factor: f64) -> f64 {
        if state.loads.is_empty() {
            return 0.0;
        }

        let total: u64 = state
            .loads
            .values()
            .map(|counter| counter.load(Ordering::Relaxed))
            .sum();
        ((total + 1) as f64 / state.loads.len() as f64 * load_factor).ceil()
    }

    fn counter<'a>(state: &'a RingState<M>, member: &M) -> RingResult<&'a Arc<AtomicU64>> {
        state
            .loads
            .get(member)
            .ok_or_else(|| RingError::MemberNotFound(member.to_string()))
    }
}

impl<M: Member + fmt::Debug, H: BuildHasher> fmt::Debug for Ring<M, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Ring")
            .field("members", &state.order)
            .field("positions", &state.positions.len())
            .field("replica_count", &self.config.replica_count)
            .field("load_factor", &self.config.load_factor)
            .finish_non_exhaustive()
    }
}

/// Clockwise walk over ring positions starting at `start`.
///
/// Positions wrap around: once the top of the position space is reached,
/// the walk continues from the smallest position.
fn clockwise<M: Member>(
    positions: &BTreeMap<RingPosition, M>,
    start: RingPosition,
) -> impl Iterator<Item = (&RingPosition, &M)> {
    positions.range(start..).chain(positions.range(..start))
}
