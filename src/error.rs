#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RingError {
    /// Ring has no members to route to
    #[error("Hash ring is empty")]
    EmptyRing,

    /// Load accounting on a member that is not part of the ring
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    /// More closest members requested than the ring holds
    #[error("Not enough members for the requested set: {0}")]
    NotEnoughMembers(usize),

    /// Load factor leaves no slack above the mean load
    #[error("Load factor must be greater than 1.0, got {0}")]
    InvalidLoadFactor(f64),

    /// Bounded search traversed the whole ring without an eligible member
    #[error("No member is eligible below the load threshold")]
    NoEligibleMember,
}

pub type RingResult<T> = Result<T, RingError>;
